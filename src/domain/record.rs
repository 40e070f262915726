//! Record domain model
//!
//! A record is one medication line in the inventory. Records are created by
//! an actor (who becomes the owner) and changed through [`RecordPatch`]es.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::expiry::{classify, ExpiryStatus};
use super::id::RecordId;

/// Quantity assigned when none is given at creation
pub const DEFAULT_QUANTITY: u32 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Invalid date '{0}': expected DD/MM/YYYY, MM/YYYY or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
}

/// An inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier, immutable
    pub id: RecordId,

    /// Actor that created the record, immutable
    #[serde(rename = "userId")]
    pub owner_id: String,

    #[serde(deserialize_with = "de::required_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_text")]
    pub active_ingredient: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_text")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_text")]
    pub presentation: Option<String>,

    /// Therapeutic class
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_text")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_text")]
    pub mechanism_of_action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_text")]
    pub barcode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_text")]
    pub office_number: Option<String>,

    #[serde(default, deserialize_with = "de::quantity")]
    pub quantity: u32,

    /// Unit consumer price
    #[serde(default, deserialize_with = "de::price")]
    pub pmc: f64,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::optional_date")]
    pub expiration_date: Option<NaiveDate>,
}

/// Input for creating a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    pub name: String,
    pub active_ingredient: Option<String>,
    pub manufacturer: Option<String>,
    pub presentation: Option<String>,
    pub class: Option<String>,
    pub mechanism_of_action: Option<String>,
    pub barcode: Option<String>,
    pub office_number: Option<String>,
    pub quantity: Option<u32>,
    pub pmc: Option<f64>,
    pub expiration_date: Option<NaiveDate>,
}

impl RecordFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A partial update.
///
/// Every `Some` overrides the stored value, including empty values: an inner
/// `None` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub active_ingredient: Option<Option<String>>,
    pub manufacturer: Option<Option<String>>,
    pub presentation: Option<Option<String>>,
    pub class: Option<Option<String>>,
    pub mechanism_of_action: Option<Option<String>>,
    pub barcode: Option<Option<String>>,
    pub office_number: Option<Option<String>>,
    pub quantity: Option<u32>,
    pub pmc: Option<f64>,
    pub expiration_date: Option<Option<NaiveDate>>,
}

impl RecordPatch {
    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the patch without applying it
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
        }
        if let Some(pmc) = self.pmc {
            validate_price(pmc)?;
        }
        Ok(())
    }
}

impl Record {
    /// Builds a record owned by `owner_id`
    pub fn new(
        id: RecordId,
        owner_id: impl Into<String>,
        fields: RecordFields,
    ) -> Result<Self, ValidationError> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let pmc = fields.pmc.unwrap_or(0.0);
        validate_price(pmc)?;

        Ok(Self {
            id,
            owner_id: owner_id.into(),
            name: name.to_string(),
            active_ingredient: normalize_text(fields.active_ingredient),
            manufacturer: normalize_text(fields.manufacturer),
            presentation: normalize_text(fields.presentation),
            class: normalize_text(fields.class),
            mechanism_of_action: normalize_text(fields.mechanism_of_action),
            barcode: normalize_text(fields.barcode),
            office_number: normalize_text(fields.office_number),
            quantity: fields.quantity.unwrap_or(DEFAULT_QUANTITY),
            pmc,
            expiration_date: fields.expiration_date,
        })
    }

    /// Merges a patch into this record. `id` and `owner_id` never change.
    ///
    /// The patch is validated first; on error nothing is modified.
    pub fn apply_patch(&mut self, patch: RecordPatch) -> Result<(), ValidationError> {
        patch.validate()?;

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(v) = patch.active_ingredient {
            self.active_ingredient = normalize_text(v);
        }
        if let Some(v) = patch.manufacturer {
            self.manufacturer = normalize_text(v);
        }
        if let Some(v) = patch.presentation {
            self.presentation = normalize_text(v);
        }
        if let Some(v) = patch.class {
            self.class = normalize_text(v);
        }
        if let Some(v) = patch.mechanism_of_action {
            self.mechanism_of_action = normalize_text(v);
        }
        if let Some(v) = patch.barcode {
            self.barcode = normalize_text(v);
        }
        if let Some(v) = patch.office_number {
            self.office_number = normalize_text(v);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(pmc) = patch.pmc {
            self.pmc = pmc;
        }
        if let Some(date) = patch.expiration_date {
            self.expiration_date = date;
        }
        Ok(())
    }

    /// Expiration bucket as of `today`
    pub fn status(&self, today: NaiveDate) -> ExpiryStatus {
        classify(self.expiration_date, today)
    }

    /// Fields considered by free-text search
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(
            [
                &self.active_ingredient,
                &self.manufacturer,
                &self.presentation,
                &self.class,
                &self.barcode,
                &self.office_number,
            ]
            .into_iter()
            .filter_map(|f| f.as_deref()),
        )
    }
}

/// Empty or whitespace-only text is treated as absent
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn validate_price(pmc: f64) -> Result<(), ValidationError> {
    if pmc.is_finite() && pmc >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidPrice(pmc))
    }
}

/// Lenient deserializers for data coming from outside
pub(crate) mod de {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::normalize_text;
    use crate::domain::expiry::parse_iso_date;

    pub fn required_name<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(D::Error::custom("record name cannot be empty"));
        }
        Ok(trimmed.to_string())
    }

    pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(normalize_text(Some(s))),
            // Barcodes and office numbers sometimes arrive as numbers
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(D::Error::custom(format!(
                "expected text, got {}",
                other
            ))),
        }
    }

    pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = number(Value::deserialize(deserializer)?).map_err(D::Error::custom)?;
        Ok(match value {
            Some(v) if v.is_finite() && v > 0.0 => v.floor().min(u32::MAX as f64) as u32,
            _ => 0,
        })
    }

    pub fn price<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = number(Value::deserialize(deserializer)?).map_err(D::Error::custom)?;
        Ok(match value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 0.0,
        })
    }

    pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        number(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => parse_iso_date(&s),
            _ => None,
        })
    }

    fn number(value: Value) -> Result<Option<f64>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("expected a number, got '{}'", s)),
            other => Err(format!("expected a number, got {}", other)),
        }
    }
}
