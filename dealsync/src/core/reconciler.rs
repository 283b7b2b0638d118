//! Local-vs-remote comparison producing the ordered update set

use std::collections::HashMap;

use shared::{Deal, RemoteDealSummary};

use crate::types::{Reconciliation, ReconcileMode};

/// Compute the deals that must be written to the CRM.
///
/// Pure: the same inputs always give the same output.
pub fn reconcile(mode: ReconcileMode, local: &[Deal], remote: &[RemoteDealSummary]) -> Reconciliation {
    match mode {
        ReconcileMode::Positional => reconcile_positional(local, remote),
        ReconcileMode::Keyed => reconcile_keyed(local, remote),
    }
}

/// Index-aligned diff.
///
/// Only correct while both sides enumerate the same deals in the same
/// order. Local deals past the end of the remote listing are always sent,
/// whatever their status.
pub fn reconcile_positional(local: &[Deal], remote: &[RemoteDealSummary]) -> Reconciliation {
    let aligned = local.len().min(remote.len());
    let mut result = Reconciliation::default();

    for (deal, summary) in local.iter().zip(remote.iter()) {
        if deal.matches(summary) {
            result.unchanged += 1;
        } else if deal.is_deleted() {
            result.skipped_deleted += 1;
        } else {
            result.to_update.push(deal.clone());
        }
    }

    result.to_update.extend_from_slice(&local[aligned..]);
    result
}

/// Title-keyed diff.
///
/// The k-th local deal titled T is compared with the k-th remote entry
/// titled T; with no such entry the deal is new. Output keeps local order.
pub fn reconcile_keyed(local: &[Deal], remote: &[RemoteDealSummary]) -> Reconciliation {
    let mut remote_by_title: HashMap<&str, Vec<f64>> = HashMap::new();
    for summary in remote {
        remote_by_title.entry(summary.title.as_str()).or_default().push(summary.value);
    }

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut result = Reconciliation::default();

    for deal in local {
        let occurrence = occurrences.entry(deal.title.as_str()).or_insert(0);
        let paired = remote_by_title
            .get(deal.title.as_str())
            .and_then(|values| values.get(*occurrence))
            .copied();
        *occurrence += 1;

        if paired == Some(deal.value) {
            result.unchanged += 1;
        } else if deal.is_deleted() {
            result.skipped_deleted += 1;
        } else {
            result.to_update.push(deal.clone());
        }
    }

    result
}
