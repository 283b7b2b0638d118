//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Status text that marks a local deal as deliberately excluded from sync
pub const DELETED_STATUS: &str = "deleted";

/// Unique identifier for a single sync run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> SharedResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidUuid { input: s.to_string() })
    }

    /// First eight hex digits, enough to tell runs apart in log output
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical deal record, serialized as-is into the CRM write body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub title: String,
    pub currency: String,
    pub value: f64,
    pub status: String,
}

impl Deal {
    pub fn new(
        title: impl Into<String>,
        currency: impl Into<String>,
        value: f64,
        status: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            currency: currency.into(),
            value,
            status: status.into(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == DELETED_STATUS
    }

    /// Whether the remote projection already carries this deal's title and value
    pub fn matches(&self, remote: &RemoteDealSummary) -> bool {
        self.title == remote.title && self.value == remote.value
    }
}

impl fmt::Display for Deal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {}, {})", self.title, self.value, self.currency, self.status)
    }
}

/// Minimal projection of a deal held by the CRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDealSummary {
    pub title: String,
    pub value: f64,
}

impl RemoteDealSummary {
    pub fn new(title: impl Into<String>, value: f64) -> Self {
        Self { title: title.into(), value }
    }
}
