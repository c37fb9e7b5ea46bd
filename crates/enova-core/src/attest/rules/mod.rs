//! Priority-ordered classification rules for certificate cell values.
//!
//! Dates must be checked before numbers, otherwise `18.06.2025` would be read
//! as a number with a unit. The first rule that accepts a cell decides its shape.

pub mod dates;
pub mod numbers;
pub mod patterns;

pub use dates::{is_date, parse_certificate_date};
pub use numbers::{contains_number_with_unit, parse_pure_number, split_number_and_unit};
pub use patterns::*;

use crate::models::record::ValueShape;

/// A single cell classification rule.
pub trait ValueRule {
    /// Short rule name used in trace output.
    fn name(&self) -> &'static str;

    /// Classify the cell, or decline so the next rule can try.
    fn classify(&self, value: &str) -> Option<ValueShape>;
}

/// Dash or empty cell.
pub struct DashRule;

impl ValueRule for DashRule {
    fn name(&self) -> &'static str {
        "dash"
    }

    fn classify(&self, value: &str) -> Option<ValueShape> {
        (value.is_empty() || value == DASH_MARKER).then_some(ValueShape::Empty)
    }
}

/// Date-shaped cell, kept as text.
pub struct DateRule;

impl ValueRule for DateRule {
    fn name(&self) -> &'static str {
        "date"
    }

    fn classify(&self, value: &str) -> Option<ValueShape> {
        is_date(value).then(|| ValueShape::Date {
            text: value.to_string(),
        })
    }
}

/// Cell that is only a number.
pub struct NumberRule;

impl ValueRule for NumberRule {
    fn name(&self) -> &'static str {
        "number"
    }

    fn classify(&self, value: &str) -> Option<ValueShape> {
        parse_pure_number(value).map(|value| ValueShape::Number { value })
    }
}

/// Number followed by a unit. Degrades to text when the number does not parse.
pub struct QuantityRule;

impl ValueRule for QuantityRule {
    fn name(&self) -> &'static str {
        "quantity"
    }

    fn classify(&self, value: &str) -> Option<ValueShape> {
        if !contains_number_with_unit(value) {
            return None;
        }

        Some(match split_number_and_unit(value) {
            (Some(number), unit) => ValueShape::Quantity {
                value: number,
                unit,
            },
            (None, text) => ValueShape::Text { text },
        })
    }
}

/// Catch-all plain text.
pub struct TextRule;

impl ValueRule for TextRule {
    fn name(&self) -> &'static str {
        "text"
    }

    fn classify(&self, value: &str) -> Option<ValueShape> {
        Some(ValueShape::Text {
            text: value.to_string(),
        })
    }
}

/// Rules in priority order.
pub static VALUE_RULES: [&(dyn ValueRule + Sync); 5] =
    [&DashRule, &DateRule, &NumberRule, &QuantityRule, &TextRule];

/// Classify a raw cell value using [`VALUE_RULES`].
pub fn classify_value(value: &str) -> ValueShape {
    for rule in VALUE_RULES {
        if let Some(shape) = rule.classify(value) {
            tracing::trace!("{:?} classified by {} rule", value, rule.name());
            return shape;
        }
    }

    ValueShape::Text {
        text: value.to_string(),
    }
}
