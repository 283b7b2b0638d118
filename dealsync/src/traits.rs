//! Trait seams between the sync pipeline and its collaborators

use async_trait::async_trait;
use shared::{Deal, RemoteDealSummary};

use crate::error::SyncResult;
use crate::types::{LocalDataset, PushOutcome};

/// Producer of the authoritative local deals for a run
#[mockall::automock]
#[async_trait]
pub trait LocalDealSource: Send + Sync {
    /// Load and normalize every local deal, in source order.
    ///
    /// Failing to reach or decode the source is fatal for the run.
    async fn load_deals(&self) -> SyncResult<LocalDataset>;

    /// Human-readable description used in log lines
    fn describe(&self) -> String;
}

/// Remote CRM holding the current state of the deals
#[mockall::automock]
#[async_trait]
pub trait CrmClient: Send + Sync {
    /// List every deal the CRM knows about, in listing order
    async fn list_deals(&self) -> SyncResult<Vec<RemoteDealSummary>>;

    /// Write one deal. Never errors: the outcome carries any failure.
    async fn push_deal(&self, deal: &Deal) -> PushOutcome;
}
