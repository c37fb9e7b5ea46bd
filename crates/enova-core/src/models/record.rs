//! Field records extracted from certificate tables.

use serde::{Deserialize, Serialize};

/// Shape of a table cell value, decided by the classification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueShape {
    /// Dash or empty marker.
    Empty,
    /// Date-shaped text, kept verbatim.
    Date { text: String },
    /// A bare number such as `36,5`.
    Number { value: f64 },
    /// A number followed by a unit such as `0,18 W/(m²·K)`.
    Quantity { value: f64, unit: String },
    /// Anything else, kept verbatim.
    Text { text: String },
}

impl ValueShape {
    /// Numeric part of the value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number { value } | Self::Quantity { value, .. } => Some(*value),
            Self::Empty | Self::Date { .. } | Self::Text { .. } => None,
        }
    }

    /// Textual remainder: the unit of a quantity, or the whole text of a date or text cell.
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::Quantity { unit, .. } => Some(unit),
            Self::Date { text } | Self::Text { text } => Some(text),
            Self::Empty | Self::Number { .. } => None,
        }
    }
}

/// One extracted (name, value, unit) entry of a certificate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Left-hand label of the row.
    pub name: String,

    /// Numeric quantity, when the cell was a number or a number with a unit.
    pub value: Option<f64>,

    /// Unit string, or the full cell text for dates and plain text.
    pub unit: Option<String>,
}

impl FieldRecord {
    pub fn new(name: impl Into<String>, value: Option<f64>, unit: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
        }
    }

    /// Build a record from a classified cell value.
    pub fn from_shape(name: impl Into<String>, shape: &ValueShape) -> Self {
        Self::new(name, shape.value(), shape.unit().map(str::to_string))
    }
}

/// All field records parsed from one certificate text, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Constant document label.
    pub title: String,

    /// Records in order of first appearance; duplicate names are kept.
    pub records: Vec<FieldRecord>,
}

impl ParsedDocument {
    pub fn new(title: impl Into<String>, records: Vec<FieldRecord>) -> Self {
        Self {
            title: title.into(),
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by exact name. A later duplicate shadows earlier ones.
    pub fn get(&self, name: &str) -> Option<&FieldRecord> {
        self.records.iter().rev().find(|r| r.name == name)
    }

    /// Numeric value of the named record.
    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|r| r.value)
    }

    /// Unit (or text) of the named record.
    pub fn unit_of(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|r| r.unit.as_deref())
    }
}
