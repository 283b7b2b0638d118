//! Raw record to canonical deal conversion
//!
//! Everything here is best-effort: a field that cannot be read is defaulted
//! (empty text, `0.0` amount) and reported as a [`FieldDiagnostic`] instead of
//! failing the run.

use serde_json::Value;
use shared::{Deal, RemoteDealSummary};

use crate::types::FieldDiagnostic;

/// Where a deal's currency comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CurrencySource {
    Column(usize),
    Constant(String),
}

/// Positional column layout of a local record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    /// Columns joined with a single space to form the title
    pub title: Vec<usize>,
    pub currency: CurrencySource,
    pub value: usize,
    pub value_multiplier: f64,
    pub status: usize,
}

impl FieldMapping {
    /// Deal export layout: title, currency, value, status.
    ///
    /// Amounts are taken as-is. The legacy export job doubled them; pass
    /// `--value-multiplier 2` (or [`FieldMapping::with_value_multiplier`])
    /// to reproduce that.
    pub fn export() -> Self {
        Self {
            title: vec![0],
            currency: CurrencySource::Column(1),
            value: 2,
            value_multiplier: 1.0,
            status: 3,
        }
    }

    /// Contact sheet layout: first and last name form the title, status in
    /// column 5, amount in column 8, one currency for the whole file
    pub fn contacts(currency: impl Into<String>) -> Self {
        Self {
            title: vec![1, 2],
            currency: CurrencySource::Constant(currency.into()),
            value: 8,
            value_multiplier: 1.0,
            status: 5,
        }
    }

    pub fn with_value_multiplier(mut self, multiplier: f64) -> Self {
        self.value_multiplier = multiplier;
        self
    }

    /// Name of the deal field read from `column`, if any
    pub fn field_for_column(&self, column: usize) -> Option<&'static str> {
        if self.title.contains(&column) {
            Some("title")
        } else if self.currency == CurrencySource::Column(column) {
            Some("currency")
        } else if self.value == column {
            Some("value")
        } else if self.status == column {
            Some("status")
        } else {
            None
        }
    }

    /// Convert one data row into a deal, collecting diagnostics for every
    /// field that had to be defaulted
    pub fn normalize_row<S: AsRef<str>>(&self, row: usize, fields: &[S]) -> (Deal, Vec<FieldDiagnostic>) {
        let mut diagnostics = Vec::new();

        let mut parts = Vec::with_capacity(self.title.len());
        for &column in &self.title {
            match fields.get(column) {
                Some(part) => {
                    let part = part.as_ref().trim();
                    if !part.is_empty() {
                        parts.push(part);
                    }
                }
                None => diagnostics.push(missing(row, "title", column)),
            }
        }
        let title = parts.join(" ");

        let currency = match &self.currency {
            CurrencySource::Constant(code) => code.clone(),
            CurrencySource::Column(column) => text_field(fields, row, "currency", *column, &mut diagnostics),
        };

        let status = text_field(fields, row, "status", self.status, &mut diagnostics);

        let value = match fields.get(self.value) {
            Some(raw) => match parse_amount(raw.as_ref()) {
                Ok(amount) => amount * self.value_multiplier,
                Err(reason) => {
                    diagnostics.push(FieldDiagnostic {
                        row,
                        field: "value",
                        raw: Some(raw.as_ref().to_string()),
                        reason,
                    });
                    0.0
                }
            },
            None => {
                diagnostics.push(missing(row, "value", self.value));
                0.0
            }
        };

        (Deal { title, currency, value, status }, diagnostics)
    }
}

fn text_field<S: AsRef<str>>(
    fields: &[S],
    row: usize,
    field: &'static str,
    column: usize,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> String {
    match fields.get(column) {
        Some(text) => text.as_ref().trim().to_string(),
        None => {
            diagnostics.push(missing(row, field, column));
            String::new()
        }
    }
}

fn missing(row: usize, field: &'static str, column: usize) -> FieldDiagnostic {
    FieldDiagnostic {
        row,
        field,
        raw: None,
        reason: format!("column {column} missing"),
    }
}

/// Parse a monetary amount, rejecting empty and non-finite input
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        Ok(_) => Err("non-finite value".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Project one entry of the CRM listing onto a remote summary.
///
/// The title is trimmed like local text fields. `value` may arrive as a
/// number, a numeric string or null.
pub fn normalize_remote_entry(entry: &Value) -> RemoteDealSummary {
    let title = entry
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let value = match entry.get("value") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_amount(s).unwrap_or(0.0),
        _ => 0.0,
    };

    RemoteDealSummary { title, value }
}
