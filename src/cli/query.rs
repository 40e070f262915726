//! Summary and actor listing commands

use anyhow::Result;

use super::output::Output;
use super::session::Session;
use crate::domain::{summarize, today, LOW_STOCK_THRESHOLD};
use crate::storage::Project;

/// Shows the dashboard counts
pub fn status(output: &Output, actor: Option<&str>) -> Result<()> {
    let session = Session::open(actor, output)?;
    let summary = summarize(session.inventory.records(), today());

    if output.is_json() {
        output.data(&summary);
        return Ok(());
    }

    println!("Inventory status");
    println!();
    println!("  Total:            {}", summary.total);
    println!("  Expired:          {}", summary.expired);
    println!("  Expiring (90d):   {}", summary.expiring_soon);
    println!("  Low stock (<={}): {}", LOW_STOCK_THRESHOLD, summary.low_stock);

    Ok(())
}

/// Lists the configured actors with their roles
pub fn actors(output: &Output, actor: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let config = project.config();
    let registry = &config.project.actors;
    let current = config.resolve_actor(actor)?;

    if output.is_json() {
        let items: Vec<_> = registry
            .actors
            .iter()
            .map(|a| {
                serde_json::json!({
                    "id": a.id,
                    "name": a.name,
                    "role": registry.role(&a.id),
                    "current": a.id == current.id,
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    println!("  {:<24} {:<24} ROLE", "ID", "NAME");
    println!("{}", "-".repeat(64));
    for a in &registry.actors {
        let marker = if a.id == current.id { "*" } else { " " };
        println!(
            "{} {:<24} {:<24} {}",
            marker,
            a.id,
            a.name,
            registry.role(&a.id).label()
        );
    }

    Ok(())
}
