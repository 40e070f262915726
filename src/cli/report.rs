//! Printable inventory report
//!
//! Renders the inventory as a Markdown table with user-chosen columns.

use anyhow::Result;
use chrono::NaiveDate;

use super::output::Output;
use super::session::Session;
use crate::domain::{format_display_date, sort_by_expiration, today, ExpiryStatus, Record};

/// A column that can appear in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportColumn {
    #[value(name = "name")]
    Name,
    #[value(name = "activeIngredient")]
    ActiveIngredient,
    #[value(name = "manufacturer")]
    Manufacturer,
    #[value(name = "presentation")]
    Presentation,
    #[value(name = "class")]
    Class,
    #[value(name = "mechanismOfAction")]
    MechanismOfAction,
    #[value(name = "quantity")]
    Quantity,
    #[value(name = "expirationDate")]
    ExpirationDate,
    #[value(name = "pmc")]
    Pmc,
    #[value(name = "status")]
    Status,
    #[value(name = "barcode")]
    Barcode,
    #[value(name = "officeNumber")]
    OfficeNumber,
}

/// Columns used when none are requested
pub const DEFAULT_COLUMNS: [ReportColumn; 4] = [
    ReportColumn::Name,
    ReportColumn::Quantity,
    ReportColumn::ExpirationDate,
    ReportColumn::Status,
];

impl ReportColumn {
    pub fn header(&self) -> &'static str {
        match self {
            ReportColumn::Name => "Name",
            ReportColumn::ActiveIngredient => "Active Ingredient",
            ReportColumn::Manufacturer => "Manufacturer",
            ReportColumn::Presentation => "Presentation",
            ReportColumn::Class => "Class",
            ReportColumn::MechanismOfAction => "Mechanism of Action",
            ReportColumn::Quantity => "Quantity",
            ReportColumn::ExpirationDate => "Expiration",
            ReportColumn::Pmc => "PMC",
            ReportColumn::Status => "Status",
            ReportColumn::Barcode => "Barcode",
            ReportColumn::OfficeNumber => "Office",
        }
    }

    fn cell(&self, record: &Record, today: NaiveDate) -> String {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        match self {
            ReportColumn::Name => record.name.clone(),
            ReportColumn::ActiveIngredient => text(&record.active_ingredient),
            ReportColumn::Manufacturer => text(&record.manufacturer),
            ReportColumn::Presentation => text(&record.presentation),
            ReportColumn::Class => text(&record.class),
            ReportColumn::MechanismOfAction => text(&record.mechanism_of_action),
            ReportColumn::Quantity => record.quantity.to_string(),
            ReportColumn::ExpirationDate => record
                .expiration_date
                .map(format_display_date)
                .unwrap_or_else(|| "-".to_string()),
            ReportColumn::Pmc => format_pmc(record.pmc),
            ReportColumn::Status => match record.status(today) {
                ExpiryStatus::Unset => "N/A".to_string(),
                status => status.label().to_string(),
            },
            ReportColumn::Barcode => text(&record.barcode),
            ReportColumn::OfficeNumber => text(&record.office_number),
        }
    }
}

/// Formats a price as `R$ 1.234,56`; zero renders as `-`
pub fn format_pmc(pmc: f64) -> String {
    if pmc <= 0.0 || !pmc.is_finite() {
        return "-".to_string();
    }

    let fixed = format!("{:.2}", pmc);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    format!("R$ {},{}", grouped, frac_part)
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Renders the report as Markdown, rows ordered by expiration date
pub fn render_report(records: &[Record], columns: &[ReportColumn], today: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str("# Inventory Report\n\n");
    out.push_str(&format!("Generated {}\n\n", format_display_date(today)));

    if records.is_empty() {
        out.push_str("No medications in inventory.\n");
        return out;
    }

    let columns = if columns.is_empty() {
        &DEFAULT_COLUMNS[..]
    } else {
        columns
    };

    let mut rows = records.to_vec();
    sort_by_expiration(&mut rows);

    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(columns.len())));

    for record in &rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| escape_cell(&c.cell(record, today)))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    out.push_str(&format!("\n{} record(s)\n", rows.len()));
    out
}

pub fn run(output: &Output, actor: Option<&str>, columns: &[ReportColumn]) -> Result<()> {
    let session = Session::open(actor, output)?;
    output.verbose_ctx("report", &format!("Columns: {:?}", columns));

    let report = render_report(session.inventory.records(), columns, today());

    if output.is_json() {
        output.data(&serde_json::json!({ "report": report }));
    } else {
        print!("{}", report);
    }

    Ok(())
}
