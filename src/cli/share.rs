//! Share, import, backup and restore commands

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use super::session::{confirm, Session};
use crate::share::{build_share_link, ShareLink, StagedImport};
use crate::storage::{read_backup, write_backup};

pub fn share(output: &Output, actor: Option<&str>, base_url: Option<&str>, plain: bool) -> Result<()> {
    let session = Session::open(actor, output)?;
    let share_config = &session.project.config().project.share;

    let base_url = base_url.unwrap_or(&share_config.base_url);
    let compressed = share_config.compress && !plain;
    output.verbose_ctx("share", &format!("Base URL {}, compressed={}", base_url, compressed));

    let url = build_share_link(base_url, session.inventory.records(), compressed)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "url": url.as_str(),
            "records": session.inventory.len(),
            "compressed": compressed,
        }));
    } else {
        println!("{}", url);
    }

    Ok(())
}

pub fn import(output: &Output, actor: Option<&str>, input: &str, compressed: bool, assume_yes: bool) -> Result<()> {
    let mut session = Session::open(actor, output)?;

    let link = ShareLink::parse(input, compressed)?;
    output.verbose_ctx(
        "import",
        &format!("Transport of {} chars, compressed={}", link.data.len(), link.compressed),
    );

    let staged = StagedImport::from_link(&link).context("Could not read shared inventory")?;
    apply_staged(output, &mut session, staged, assume_yes)
}

pub fn backup(output: &Output, actor: Option<&str>, path: &Path) -> Result<()> {
    let session = Session::open(actor, output)?;

    write_backup(path, session.inventory.records())?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "records": session.inventory.len(),
        }));
    } else {
        output.success(&format!(
            "Backed up {} record(s) to {}",
            session.inventory.len(),
            path.display()
        ));
    }

    Ok(())
}

pub fn restore(output: &Output, actor: Option<&str>, path: &Path, assume_yes: bool) -> Result<()> {
    let mut session = Session::open(actor, output)?;

    let staged = StagedImport::new(read_backup(path)?);
    apply_staged(output, &mut session, staged, assume_yes)
}

/// Asks before replacing the inventory with `staged`
fn apply_staged(output: &Output, session: &mut Session, staged: StagedImport, assume_yes: bool) -> Result<()> {
    let prompt = format!(
        "Replace the current inventory ({} record(s)) with {} imported record(s)?",
        session.inventory.len(),
        staged.len()
    );

    if !confirm(&prompt, assume_yes)? {
        staged.discard();
        if output.is_json() {
            output.data(&serde_json::json!({ "imported": false }));
        } else {
            output.success("Import cancelled. Inventory unchanged.");
        }
        return Ok(());
    }

    let report = staged.confirm(&mut session.inventory);
    session.save(output);

    if report.duplicates > 0 {
        tracing::warn!(duplicates = report.duplicates, "dropped records with repeated IDs");
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "imported": true,
            "records": report.imported,
            "replaced": report.replaced,
            "duplicates": report.duplicates,
        }));
    } else {
        output.success(&format!(
            "Imported {} record(s), replacing {}",
            report.imported, report.replaced
        ));
        if report.duplicates > 0 {
            println!("Skipped {} record(s) with repeated IDs", report.duplicates);
        }
    }

    Ok(())
}
