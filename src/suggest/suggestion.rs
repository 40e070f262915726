//! Suggested record fields and parsing of plugin answers
//!
//! Plugin output is untrusted. Everything here is lenient: unusable values
//! become "no suggestion" instead of errors.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{lenient, normalize_text, RecordFields};

/// A partial record proposed by a plugin
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Suggestion {
    #[serde(deserialize_with = "lenient::optional_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub active_ingredient: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub manufacturer: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub presentation: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub class: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub mechanism_of_action: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub barcode: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub office_number: Option<String>,
    #[serde(deserialize_with = "positive_quantity")]
    pub quantity: Option<u32>,
    #[serde(deserialize_with = "positive_price")]
    pub pmc: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_date")]
    pub expiration_date: Option<NaiveDate>,
}

impl Suggestion {
    /// Returns true if the suggestion carries no value at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copies suggested values into `fields`, only where `fields` is empty.
    ///
    /// Returns the number of fields filled.
    pub fn fill_empty(&self, fields: &mut RecordFields) -> usize {
        let mut filled = 0;

        if fields.name.trim().is_empty() {
            if let Some(name) = &self.name {
                fields.name = name.clone();
                filled += 1;
            }
        }

        for (target, suggested) in [
            (&mut fields.active_ingredient, &self.active_ingredient),
            (&mut fields.manufacturer, &self.manufacturer),
            (&mut fields.presentation, &self.presentation),
            (&mut fields.class, &self.class),
            (&mut fields.mechanism_of_action, &self.mechanism_of_action),
            (&mut fields.barcode, &self.barcode),
            (&mut fields.office_number, &self.office_number),
        ] {
            if normalize_text(target.clone()).is_none() && suggested.is_some() {
                *target = suggested.clone();
                filled += 1;
            }
        }

        if fields.quantity.is_none() && self.quantity.is_some() {
            fields.quantity = self.quantity;
            filled += 1;
        }
        if is_unpriced(fields.pmc) && self.pmc.is_some() {
            fields.pmc = self.pmc;
            filled += 1;
        }
        if fields.expiration_date.is_none() && self.expiration_date.is_some() {
            fields.expiration_date = self.expiration_date;
            filled += 1;
        }

        filled
    }

    /// Converts an extracted suggestion into creation fields.
    ///
    /// Suggestions without a name cannot become records.
    pub fn into_fields(self) -> Option<RecordFields> {
        let name = self.name.clone()?;
        let mut fields = RecordFields::named(name);
        self.fill_empty(&mut fields);
        Some(fields)
    }
}

/// A zero price counts as "not set"
pub(crate) fn is_unpriced(pmc: Option<f64>) -> bool {
    pmc.map_or(true, |p| p <= 0.0)
}

fn positive_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient::optional_number(deserializer).unwrap_or(None);
    Ok(value
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.floor().min(u32::MAX as f64) as u32))
}

fn positive_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(sanitize_price(
        lenient::optional_number(deserializer).unwrap_or(None),
    ))
}

/// A price of zero, below zero or not finite is no suggestion
pub fn sanitize_price(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Removes a surrounding markdown code fence, if any
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "text", ...) on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Reads an extraction answer: `{"medications": [...]}` or a bare array.
///
/// Any other shape is an empty result. Entries that do not parse, or carry
/// no value, are skipped.
pub fn parse_extraction(data: Value) -> Vec<Suggestion> {
    let data = match data {
        Value::String(text) => match serde_json::from_str(strip_code_fences(&text)) {
            Ok(value) => value,
            Err(_) => return Vec::new(),
        },
        other => other,
    };

    let items = match data {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("medications") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Suggestion>(item) {
            Ok(suggestion) => Some(suggestion),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable extracted medication");
                None
            }
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Reads a price answer: a number, a numeric string, or `{"pmc": ...}`
pub fn parse_price(data: Value) -> Option<f64> {
    match data {
        Value::Number(n) => sanitize_price(n.as_f64()),
        Value::String(s) => {
            let cleaned = strip_code_fences(&s)
                .trim_start_matches("R$")
                .trim()
                .replace(',', ".");
            sanitize_price(cleaned.parse().ok())
        }
        Value::Object(mut map) => map.remove("pmc").and_then(parse_price),
        _ => None,
    }
}

/// Reads a text answer: a string, or an object holding the text under `key`
pub fn parse_text(data: Value, key: &str) -> Option<String> {
    match data {
        Value::String(s) => normalize_text(Some(strip_code_fences(&s).to_string())),
        Value::Object(mut map) => map.remove(key).and_then(|v| parse_text(v, key)),
        _ => None,
    }
}

/// Reads a details answer: an object with record fields
pub fn parse_details(data: Value) -> Option<Suggestion> {
    let data = match data {
        Value::String(text) => serde_json::from_str(strip_code_fences(&text)).ok()?,
        other => other,
    };
    serde_json::from_value::<Suggestion>(data)
        .ok()
        .filter(|s| !s.is_empty())
}
