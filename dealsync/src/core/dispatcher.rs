//! Batched, concurrency-bounded push of the update set to the CRM

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use shared::{Deal, RunId, run_debug, run_info, run_warn};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::traits::CrmClient;
use crate::types::{DispatchMode, DispatchRecord, DispatchReport, PushOutcome};

/// Writes per batch. Sized to stay under roughly 80 requests per second
/// against the Pipedrive API.
pub const DEFAULT_BATCH_SIZE: usize = 130;

/// Knobs controlling how the update set is pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub mode: DispatchMode,
    pub batch_size: usize,
    /// Only used by [`DispatchMode::Pooled`]
    pub max_in_flight: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Batched,
            batch_size: DEFAULT_BATCH_SIZE,
            max_in_flight: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Split the update set into consecutive batches of at most `batch_size`.
///
/// A zero batch size is treated as one.
pub fn partition(deals: Vec<Deal>, batch_size: usize) -> Vec<Vec<Deal>> {
    let size = batch_size.max(1);
    let mut batches = Vec::with_capacity(deals.len().div_ceil(size));
    let mut deals = deals.into_iter().peekable();
    while deals.peek().is_some() {
        batches.push(deals.by_ref().take(size).collect());
    }
    batches
}

/// Pushes an update set through a shared CRM client
pub struct Dispatcher<C>
where
    C: CrmClient + 'static,
{
    client: Arc<C>,
    settings: DispatchSettings,
    run_id: RunId,
}

impl<C> Dispatcher<C>
where
    C: CrmClient + 'static,
{
    pub fn new(client: Arc<C>, settings: DispatchSettings, run_id: RunId) -> Self {
        Self { client, settings, run_id }
    }

    pub fn settings(&self) -> DispatchSettings {
        self.settings
    }

    /// Push every deal once and report each outcome in update-set order
    pub async fn dispatch(&self, update_set: Vec<Deal>) -> DispatchReport {
        let started = Instant::now();
        let total = update_set.len();
        let batches = partition(update_set, self.settings.batch_size);
        let batch_count = batches.len();

        run_info!(
            self.run_id,
            "📤 Dispatching {} deal(s) in {} batch(es) ({:?} mode)",
            total,
            batch_count,
            self.settings.mode
        );

        let records = match self.settings.mode {
            DispatchMode::Batched => self.dispatch_batched(batches).await,
            DispatchMode::Pooled => self.dispatch_pooled(batches).await,
        };

        let report = DispatchReport { records, batches: batch_count };
        run_info!(
            self.run_id,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Dispatch finished in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        report
    }

    /// Batch k+1 is not started until every write of batch k has settled
    async fn dispatch_batched(&self, batches: Vec<Vec<Deal>>) -> Vec<DispatchRecord> {
        let mut records = Vec::new();

        for (index, batch) in batches.into_iter().enumerate() {
            let batch_started = Instant::now();
            run_debug!(self.run_id, batch = index, size = batch.len(), "Batch dispatched");

            let handles: Vec<JoinHandle<PushOutcome>> = batch
                .iter()
                .map(|deal| {
                    let client = Arc::clone(&self.client);
                    let deal = deal.clone();
                    tokio::spawn(async move { client.push_deal(&deal).await })
                })
                .collect();

            let outcomes = join_all(handles).await;
            for (deal, joined) in batch.into_iter().zip(outcomes) {
                records.push(self.settle(deal, index, joined));
            }

            run_debug!(
                self.run_id,
                batch = index,
                elapsed_ms = batch_started.elapsed().as_millis() as u64,
                "Batch settled"
            );
        }

        records
    }

    /// At most `max_in_flight` writes outstanding, no barrier between batches
    async fn dispatch_pooled(&self, batches: Vec<Vec<Deal>>) -> Vec<DispatchRecord> {
        let permits = Arc::new(Semaphore::new(self.settings.max_in_flight.max(1)));
        let mut pending = Vec::new();

        for (index, batch) in batches.into_iter().enumerate() {
            for deal in batch {
                let client = Arc::clone(&self.client);
                let permits = Arc::clone(&permits);
                let task_deal = deal.clone();
                let handle = tokio::spawn(async move {
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return PushOutcome::Transport {
                                message: "dispatch pool closed".to_string(),
                            }
                        }
                    };
                    client.push_deal(&task_deal).await
                });
                pending.push((deal, index, handle));
            }
        }

        let (meta, handles): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .map(|(deal, index, handle)| ((deal, index), handle))
            .unzip();
        let outcomes = join_all(handles).await;

        meta.into_iter()
            .zip(outcomes)
            .map(|((deal, index), joined)| self.settle(deal, index, joined))
            .collect()
    }

    fn settle(
        &self,
        deal: Deal,
        batch: usize,
        joined: Result<PushOutcome, tokio::task::JoinError>,
    ) -> DispatchRecord {
        let outcome = joined.unwrap_or_else(|e| PushOutcome::Transport {
            message: format!("write task failed: {e}"),
        });

        if outcome.is_success() {
            run_debug!(self.run_id, batch, title = %deal.title, "Deal written");
        } else {
            run_warn!(self.run_id, batch, title = %deal.title, "⚠️ Deal not written: {}", outcome);
        }

        DispatchRecord { title: deal.title, batch, outcome }
    }
}
