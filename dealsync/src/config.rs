//! Runtime configuration from command line flags and environment

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use shared::logging::LogFormat;
use url::Url;

use crate::core::{DEFAULT_BATCH_SIZE, DispatchSettings, FieldMapping};
use crate::error::{SyncError, SyncResult};
use crate::services::DEFAULT_PAGE_LIMIT;
use crate::sync_impl::SyncOptions;
use crate::types::{DispatchMode, ReconcileMode};

/// Column layout of the local file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// title, currency, value, status
    #[default]
    Export,
    /// id, first name, last name, .., status (5), .., amount (8)
    Contacts,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "dealsync")]
#[command(about = "Push local deal changes to a Pipedrive CRM")]
#[command(args_override_self = true)]
pub struct SyncConfig {
    /// Local deal file (.csv or .csv.gz)
    #[arg(long, env = "DEALSYNC_INPUT")]
    pub input: PathBuf,

    /// CRM API root, e.g. https://acme.pipedrive.com/api/v1
    #[arg(long, env = "PIPEDRIVE_BASE_URL")]
    pub base_url: String,

    /// CRM API token
    #[arg(long, env = "PIPEDRIVE_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Column layout of the input file
    #[arg(long, env = "DEALSYNC_LAYOUT", value_enum, default_value_t = Layout::Export)]
    pub layout: Layout,

    /// Currency applied to every deal of the contacts layout
    #[arg(long, env = "DEALSYNC_CURRENCY", default_value = "EUR")]
    pub currency: String,

    /// Factor applied to every parsed local amount
    #[arg(long, env = "DEALSYNC_VALUE_MULTIPLIER", default_value_t = 1.0)]
    pub value_multiplier: f64,

    /// Writes per batch
    #[arg(long, env = "DEALSYNC_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Dispatch strategy
    #[arg(long, env = "DEALSYNC_DISPATCH", value_enum, default_value_t = DispatchMode::Batched)]
    pub dispatch: DispatchMode,

    /// Concurrent writes allowed by the pooled dispatcher
    #[arg(long, env = "DEALSYNC_MAX_IN_FLIGHT", default_value_t = DEFAULT_BATCH_SIZE)]
    pub max_in_flight: usize,

    /// How local deals are matched against the CRM listing
    #[arg(long, env = "DEALSYNC_RECONCILE", value_enum, default_value_t = ReconcileMode::Positional)]
    pub reconcile: ReconcileMode,

    /// Page size for the CRM listing
    #[arg(long, env = "DEALSYNC_PAGE_LIMIT", default_value_t = DEFAULT_PAGE_LIMIT)]
    pub page_limit: usize,

    /// Per-request timeout in seconds, 0 disables it
    #[arg(long, env = "DEALSYNC_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Reconcile and report without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with status 2 when any write failed
    #[arg(long)]
    pub strict: bool,

    /// Log level for dealsync targets
    #[arg(long, env = "DEALSYNC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (compact or json)
    #[arg(long, env = "DEALSYNC_LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,
}

impl SyncConfig {
    /// Reject settings that would make the run meaningless
    pub fn validate(&self) -> SyncResult<()> {
        if self.api_token.trim().is_empty() {
            return Err(SyncError::config("API token must not be empty"));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| SyncError::config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SyncError::config(format!("Base URL must be http(s), got {}", url.scheme())));
        }

        if self.batch_size == 0 {
            return Err(SyncError::config("Batch size must be at least 1"));
        }
        if self.dispatch == DispatchMode::Pooled && self.max_in_flight == 0 {
            return Err(SyncError::config("Max in-flight writes must be at least 1"));
        }
        if self.page_limit == 0 {
            return Err(SyncError::config("Page limit must be at least 1"));
        }
        if !self.value_multiplier.is_finite() {
            return Err(SyncError::config("Value multiplier must be a finite number"));
        }
        if self.layout == Layout::Contacts && self.currency.trim().is_empty() {
            return Err(SyncError::config("Contacts layout needs a currency"));
        }

        Ok(())
    }

    pub fn mapping(&self) -> FieldMapping {
        let mapping = match self.layout {
            Layout::Export => FieldMapping::export(),
            Layout::Contacts => FieldMapping::contacts(self.currency.trim()),
        };
        mapping.with_value_multiplier(self.value_multiplier)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            reconcile_mode: self.reconcile,
            dispatch: DispatchSettings {
                mode: self.dispatch,
                batch_size: self.batch_size,
                max_in_flight: self.max_in_flight,
            },
            dry_run: self.dry_run,
        }
    }
}
