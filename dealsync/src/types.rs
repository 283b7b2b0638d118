//! Sync-specific data types

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use shared::{Deal, RunId};

/// How local deals are paired with remote ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// Index-aligned comparison, kept for parity with existing exports
    #[default]
    Positional,
    /// Title-keyed comparison, duplicates paired by occurrence
    Keyed,
}

/// How the update set is pushed to the CRM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One batch at a time, every write in a batch concurrent, barrier between batches
    #[default]
    Batched,
    /// Bounded pool of in-flight writes, no barrier
    Pooled,
}

/// A field the normalizer had to default instead of reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiagnostic {
    /// Zero-based data row (header excluded)
    pub row: usize,
    pub field: &'static str,
    pub raw: Option<String>,
    pub reason: String,
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(raw) => write!(f, "row {} field {} ({:?}): {}", self.row, self.field, raw, self.reason),
            None => write!(f, "row {} field {}: {}", self.row, self.field, self.reason),
        }
    }
}

/// Local deals with the diagnostics produced while normalizing them
#[derive(Debug, Clone, Default)]
pub struct LocalDataset {
    pub deals: Vec<Deal>,
    pub diagnostics: Vec<FieldDiagnostic>,
}

/// Output of reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub to_update: Vec<Deal>,
    /// Aligned local deals left out because their status is `deleted`
    pub skipped_deleted: usize,
    /// Aligned local deals that already match the CRM
    pub unchanged: usize,
}

/// Result of a single write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PushOutcome {
    Succeeded,
    Rejected { status: u16 },
    Transport { message: String },
}

impl PushOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PushOutcome::Succeeded)
    }
}

impl fmt::Display for PushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushOutcome::Succeeded => write!(f, "succeeded"),
            PushOutcome::Rejected { status } => write!(f, "rejected with HTTP {status}"),
            PushOutcome::Transport { message } => write!(f, "transport error: {message}"),
        }
    }
}

/// Outcome of one record in the update set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub title: String,
    pub batch: usize,
    pub outcome: PushOutcome,
}

/// Per-record outcomes, in update-set order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub records: Vec<DispatchRecord>,
    pub batches: usize,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchRecord> {
        self.records.iter().filter(|r| !r.outcome.is_success())
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

/// Summary of a complete run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub run_id: RunId,
    pub local_count: usize,
    pub remote_count: usize,
    pub update_count: usize,
    pub skipped_deleted: usize,
    pub diagnostics: Vec<FieldDiagnostic>,
    /// `None` for dry runs
    pub dispatch: Option<DispatchReport>,
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.dispatch.as_ref().map_or(true, DispatchReport::is_clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, outcome: PushOutcome) -> DispatchRecord {
        DispatchRecord { title: title.to_string(), batch: 0, outcome }
    }

    #[test]
    fn test_dispatch_report_counts() {
        let report = DispatchReport {
            records: vec![
                record("a", PushOutcome::Succeeded),
                record("b", PushOutcome::Rejected { status: 429 }),
                record("c", PushOutcome::Transport { message: "reset".into() }),
                record("d", PushOutcome::Succeeded),
            ],
            batches: 1,
        };

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 2);
        assert!(!report.is_clean());
        let failed: Vec<_> = report.failures().map(|r| r.title.as_str()).collect();
        assert_eq!(failed, vec!["b", "c"]);
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(DispatchReport::default().is_clean());
    }

    #[test]
    fn test_dry_run_report_is_clean() {
        let report = SyncReport {
            run_id: RunId::new(),
            local_count: 3,
            remote_count: 1,
            update_count: 2,
            skipped_deleted: 0,
            diagnostics: Vec::new(),
            dispatch: None,
            elapsed: Duration::from_millis(5),
        };
        assert!(report.is_clean());
    }

    #[test]
    fn test_push_outcome_serializes_tagged() {
        let json = serde_json::to_value(PushOutcome::Rejected { status: 500 }).unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "rejected", "status": 500 }));
    }

    #[test]
    fn test_diagnostic_display_includes_raw_text() {
        let diag = FieldDiagnostic {
            row: 4,
            field: "value",
            raw: Some("12,5".to_string()),
            reason: "invalid float literal".to_string(),
        };
        assert_eq!(diag.to_string(), "row 4 field value (\"12,5\"): invalid float literal");
    }
}
