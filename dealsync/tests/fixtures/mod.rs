//! Test fixtures: local export files and CRM listing bodies

#![allow(dead_code)] // Not every test binary uses every fixture

use serde_json::{Value, json};
use shared::{Deal, RemoteDealSummary};
use std::path::PathBuf;
use tempfile::TempDir;

/// Write deals as an export-layout CSV with a header row
pub fn write_export(dir: &TempDir, deals: &[Deal]) -> PathBuf {
    let path = dir.path().join("deals.csv");
    let mut body = String::from("title,currency,value,status\n");
    for deal in deals {
        body.push_str(&format!("{},{},{},{}\n", deal.title, deal.currency, deal.value, deal.status));
    }
    std::fs::write(&path, body).expect("fixture file should be writable");
    path
}

/// Single-page listing envelope for the given remote deals
pub fn listing(remote: &[RemoteDealSummary]) -> Value {
    let data: Vec<Value> = remote
        .iter()
        .enumerate()
        .map(|(i, r)| json!({ "id": i + 1, "title": r.title, "value": r.value, "currency": "EUR", "status": "open" }))
        .collect();

    json!({
        "success": true,
        "data": data,
        "additional_data": {
            "pagination": { "start": 0, "limit": 500, "more_items_in_collection": false }
        }
    })
}

pub fn open_deal(title: &str, value: f64) -> Deal {
    Deal::new(title, "EUR", value, "open")
}

/// `count` open deals titled `deal-0`, `deal-1`, ...
pub fn open_deals(count: usize) -> Vec<Deal> {
    (0..count).map(|i| open_deal(&format!("deal-{i}"), (i + 1) as f64)).collect()
}
