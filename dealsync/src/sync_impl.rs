//! Sync pipeline with dependency injection
//!
//! One run loads the local dataset, lists the CRM, reconciles the two and
//! pushes the difference. The same pipeline serves every source pairing;
//! sources are swapped through the [`LocalDealSource`] and [`CrmClient`]
//! traits.

use std::sync::Arc;
use std::time::Instant;

use shared::logging::{log_startup, log_success};
use shared::{RunId, run_debug, run_info, run_warn};

use crate::core::{DispatchSettings, Dispatcher, reconcile};
use crate::error::SyncResult;
use crate::traits::{CrmClient, LocalDealSource};
use crate::types::{ReconcileMode, SyncReport};

/// Behaviour switches for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOptions {
    pub reconcile_mode: ReconcileMode,
    pub dispatch: DispatchSettings,
    /// Reconcile and report without writing anything
    pub dry_run: bool,
}

/// Deal sync pipeline
pub struct DealSync<L, C>
where
    L: LocalDealSource,
    C: CrmClient + 'static,
{
    run_id: RunId,
    source: L,
    crm: Arc<C>,
    options: SyncOptions,
}

impl<L, C> DealSync<L, C>
where
    L: LocalDealSource,
    C: CrmClient + 'static,
{
    pub fn new(run_id: RunId, source: L, crm: C, options: SyncOptions) -> Self {
        Self {
            run_id,
            source,
            crm: Arc::new(crm),
            options,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Execute one run.
    ///
    /// Errors only when a source cannot be read; write failures end up in
    /// the returned report.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        let started = Instant::now();
        log_startup(&self.run_id, &format!("deal sync from {}", self.source.describe()));

        let local = self.source.load_deals().await?;
        for diagnostic in &local.diagnostics {
            run_warn!(self.run_id, "Defaulted field while reading local deals: {}", diagnostic);
        }
        run_info!(self.run_id, "📥 Loaded {} local deal(s)", local.deals.len());

        let remote = self.crm.list_deals().await?;
        run_info!(self.run_id, "📥 Listed {} remote deal(s)", remote.len());

        let reconciliation = reconcile(self.options.reconcile_mode, &local.deals, &remote);
        run_info!(
            self.run_id,
            unchanged = reconciliation.unchanged,
            skipped_deleted = reconciliation.skipped_deleted,
            "🔍 {} deal(s) need writing ({:?} reconciliation)",
            reconciliation.to_update.len(),
            self.options.reconcile_mode
        );

        let update_count = reconciliation.to_update.len();
        let dispatch = if self.options.dry_run {
            for deal in &reconciliation.to_update {
                run_debug!(self.run_id, "Would write {}", deal);
            }
            run_info!(self.run_id, "Dry run, nothing written");
            None
        } else {
            let dispatcher = Dispatcher::new(Arc::clone(&self.crm), self.options.dispatch, self.run_id);
            Some(dispatcher.dispatch(reconciliation.to_update).await)
        };

        let report = SyncReport {
            run_id: self.run_id,
            local_count: local.deals.len(),
            remote_count: remote.len(),
            update_count,
            skipped_deleted: reconciliation.skipped_deleted,
            diagnostics: local.diagnostics,
            dispatch,
            elapsed: started.elapsed(),
        };
        log_summary(&report);
        Ok(report)
    }
}

/// Exit status of a run that completed with every write accepted, or with
/// failed writes outside strict mode
pub const EXIT_OK: i32 = 0;

/// Exit status of a run that completed with failed writes under `--strict`
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Process exit status for a completed run. Fatal errors never produce a
/// report and exit with 1 from `main`.
pub fn exit_code(report: &SyncReport, strict: bool) -> i32 {
    if strict && !report.is_clean() {
        EXIT_PARTIAL_FAILURE
    } else {
        EXIT_OK
    }
}

/// Log the outcome of a run, one line per failed write
pub fn log_summary(report: &SyncReport) {
    let Some(dispatch) = &report.dispatch else {
        log_success(
            &report.run_id,
            &format!("Dry run finished: {} of {} local deal(s) would be written", report.update_count, report.local_count),
        );
        return;
    };

    for failure in dispatch.failures() {
        run_warn!(
            report.run_id,
            batch = failure.batch,
            "❌ {} was not written: {}",
            failure.title,
            failure.outcome
        );
    }

    let message = format!(
        "Sync finished in {:.2}s: {} written, {} failed, {} defaulted field(s)",
        report.elapsed.as_secs_f64(),
        dispatch.succeeded(),
        dispatch.failed(),
        report.diagnostics.len()
    );
    if dispatch.is_clean() {
        log_success(&report.run_id, &message);
    } else {
        run_warn!(report.run_id, "⚠️ {}", message);
    }
}
