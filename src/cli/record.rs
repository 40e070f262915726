//! Record CLI commands

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::output::Output;
use super::report::format_pmc;
use super::session::{confirm, Session};
use super::suggest_cmd;
use crate::domain::{
    format_display_date, parse_date_input, search, today, ExpiryStatus, Record, RecordFields,
    RecordPatch,
};
use crate::suggest;

/// Record fields shared by `add` and `edit`.
///
/// For `edit`, an empty value clears an optional field.
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Active ingredient
    #[arg(long)]
    pub ingredient: Option<String>,

    /// Manufacturer
    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Presentation (e.g. "500mg, 20 tablets")
    #[arg(long)]
    pub presentation: Option<String>,

    /// Therapeutic class
    #[arg(long)]
    pub class: Option<String>,

    /// Mechanism of action
    #[arg(long)]
    pub mechanism: Option<String>,

    /// Barcode
    #[arg(long)]
    pub barcode: Option<String>,

    /// Office (storage location) number
    #[arg(long)]
    pub office: Option<String>,

    /// Units in stock
    #[arg(long, short)]
    pub quantity: Option<u32>,

    /// Unit consumer price, e.g. 12.34 or 12,34
    #[arg(long, value_parser = parse_price_arg)]
    pub pmc: Option<f64>,

    /// Expiration date: DD/MM/YYYY, MM/YYYY (end of month) or YYYY-MM-DD
    #[arg(long)]
    pub expires: Option<String>,
}

impl FieldArgs {
    fn into_fields(self, name: String) -> Result<RecordFields> {
        let expiration_date = match self.expires.as_deref() {
            Some(input) => parse_date_input(input)?,
            None => None,
        };

        Ok(RecordFields {
            name,
            active_ingredient: self.ingredient,
            manufacturer: self.manufacturer,
            presentation: self.presentation,
            class: self.class,
            mechanism_of_action: self.mechanism,
            barcode: self.barcode,
            office_number: self.office,
            quantity: self.quantity,
            pmc: self.pmc,
            expiration_date,
        })
    }

    fn into_patch(self, name: Option<String>) -> Result<RecordPatch> {
        let expiration_date = match self.expires.as_deref() {
            Some(input) => Some(parse_date_input(input)?),
            None => None,
        };

        Ok(RecordPatch {
            name,
            active_ingredient: self.ingredient.map(Some),
            manufacturer: self.manufacturer.map(Some),
            presentation: self.presentation.map(Some),
            class: self.class.map(Some),
            mechanism_of_action: self.mechanism.map(Some),
            barcode: self.barcode.map(Some),
            office_number: self.office.map(Some),
            quantity: self.quantity,
            pmc: self.pmc,
            expiration_date,
        })
    }
}

fn parse_price_arg(value: &str) -> Result<f64, String> {
    value
        .trim()
        .trim_start_matches("R$")
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| format!("invalid price '{}'", value))
}

/// A record as shown to the user, with its expiration bucket
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a Record,
    status: ExpiryStatus,
    status_label: &'static str,
}

impl<'a> RecordView<'a> {
    fn new(record: &'a Record) -> Self {
        let status = record.status(today());
        Self {
            record,
            status,
            status_label: status.label(),
        }
    }
}

pub fn add(output: &Output, actor: Option<&str>, name: String, fields: FieldArgs, use_suggestions: bool) -> Result<()> {
    let mut session = Session::open(actor, output)?;
    let mut fields = fields.into_fields(name)?;

    if use_suggestions {
        match suggest_cmd::load_suggester(&session.project) {
            Ok(suggester) => {
                let filled = suggest::enrich(&suggester, &mut fields);
                output.verbose_ctx("add", &format!("Suggestions filled {} field(s)", filled));
            }
            Err(e) => {
                tracing::warn!(error = %e, "suggestions unavailable");
                output.error(&format!("Suggestions unavailable: {}", e));
            }
        }
    }

    let record = session.inventory.create(&session.actor, fields)?.clone();
    session.save(output);

    if output.is_json() {
        output.data(&RecordView::new(&record));
    } else {
        output.success(&format!("Added {} ({})", record.name, record.id));
    }

    Ok(())
}

pub fn edit(output: &Output, actor: Option<&str>, id: &str, name: Option<String>, fields: FieldArgs) -> Result<()> {
    let mut session = Session::open(actor, output)?;
    let id = session.require_record(id)?;

    let patch = fields.into_patch(name)?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one field to update.");
    }

    if !session.inventory.update(&session.actor, &id, patch)? {
        anyhow::bail!("Permission denied: {} may not modify {}", session.actor.id, id);
    }
    session.save(output);

    if let Some(record) = session.inventory.get(&id) {
        if output.is_json() {
            output.data(&RecordView::new(record));
        } else {
            output.success(&format!("Updated {} ({})", record.name, record.id));
        }
    }

    Ok(())
}

pub fn remove(output: &Output, actor: Option<&str>, id: &str, yes: bool) -> Result<()> {
    let mut session = Session::open(actor, output)?;
    let id = session.require_record(id)?;

    let name = match session.inventory.get(&id) {
        Some(record) if session.inventory.can_mutate(&session.actor, record) => record.name.clone(),
        _ => anyhow::bail!("Permission denied: {} may not remove {}", session.actor.id, id),
    };

    let prompt = format!("Remove {} ({})? This cannot be undone.", name, id);
    if !confirm(&prompt, yes)? {
        if output.is_json() {
            output.data(&serde_json::json!({ "removed": null }));
        } else {
            println!("Remove cancelled. Inventory unchanged.");
        }
        return Ok(());
    }

    let Some(record) = session.inventory.delete(&session.actor, &id) else {
        anyhow::bail!("Permission denied: {} may not remove {}", session.actor.id, id);
    };
    session.save(output);

    if output.is_json() {
        output.data(&serde_json::json!({ "removed": record.id }));
    } else {
        output.success(&format!("Removed {} ({})", record.name, record.id));
    }

    Ok(())
}

pub fn show(output: &Output, actor: Option<&str>, id: &str) -> Result<()> {
    let session = Session::open(actor, output)?;
    let id = session.require_record(id)?;
    let Some(record) = session.inventory.get(&id) else {
        anyhow::bail!("Record not found: {}", id);
    };

    let actors = session.inventory.actors();
    let editable = session.inventory.can_mutate(&session.actor, record);
    let view = RecordView::new(record);

    if output.is_json() {
        output.data(&serde_json::json!({
            "record": view,
            "ownerName": actors.display_name(&record.owner_id),
            "editable": editable,
        }));
        return Ok(());
    }

    println!("{} ({})", record.name, record.id);
    println!();
    println!("Owner:             {} ({})", actors.display_name(&record.owner_id), record.owner_id);
    println!("Status:            {}", view.status_label);
    println!(
        "Expires:           {}",
        record
            .expiration_date
            .map(format_display_date)
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Quantity:          {}", record.quantity);
    println!("PMC:               {}", format_pmc(record.pmc));

    let optional = [
        ("Active ingredient", &record.active_ingredient),
        ("Manufacturer", &record.manufacturer),
        ("Presentation", &record.presentation),
        ("Class", &record.class),
        ("Barcode", &record.barcode),
        ("Office", &record.office_number),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            println!("{:<18} {}", format!("{}:", label), value);
        }
    }

    if let Some(mechanism) = &record.mechanism_of_action {
        println!();
        println!("Mechanism of action:");
        println!("  {}", mechanism);
    }

    println!();
    println!("Editable by {}:    {}", session.actor.id, if editable { "yes" } else { "no" });

    Ok(())
}

pub fn list(output: &Output, actor: Option<&str>, term: Option<&str>) -> Result<()> {
    let session = Session::open(actor, output)?;
    let results = search(session.inventory.records(), term.unwrap_or(""));
    output.verbose_ctx("list", &format!("{} of {} records match", results.len(), session.inventory.len()));

    if output.is_json() {
        let items: Vec<_> = results.iter().map(RecordView::new).collect();
        output.data(&items);
        return Ok(());
    }

    if results.is_empty() {
        match term {
            Some(term) => println!("No records match '{}'", term),
            None => println!("No records yet. Add one with 'medstock add <name>'."),
        }
        return Ok(());
    }

    println!("{:<16} {:<28} {:>5} {:<12} STATUS", "ID", "NAME", "QTY", "EXPIRES");
    println!("{}", "-".repeat(72));

    for record in &results {
        let expires = record
            .expiration_date
            .map(format_display_date)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:<28} {:>5} {:<12} {}",
            record.id,
            truncate(&record.name, 28),
            record.quantity,
            expires,
            record.status(today()).label()
        );
    }

    output.blank();
    println!("{} record(s)", results.len());

    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
