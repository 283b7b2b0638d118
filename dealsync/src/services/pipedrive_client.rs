//! Pipedrive REST client: paginated deal listing and per-deal writes

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use shared::{Deal, RemoteDealSummary};
use tracing::{debug, warn};
use url::Url;

use crate::core::normalize_remote_entry;
use crate::error::{SyncError, SyncResult};
use crate::traits::CrmClient;
use crate::types::PushOutcome;

/// Page size requested from the listing endpoint
pub const DEFAULT_PAGE_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
struct ListingEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Vec<Value>>,
    #[serde(default)]
    additional_data: Option<AdditionalData>,
}

#[derive(Debug, Deserialize)]
struct AdditionalData {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    more_items_in_collection: bool,
    #[serde(default)]
    next_start: Option<u64>,
}

/// HTTP client for a Pipedrive company domain
pub struct PipedriveClient {
    http: reqwest::Client,
    deals_url: Url,
    api_token: String,
    page_limit: usize,
}

impl PipedriveClient {
    /// `base_url` is the API root, e.g. `https://acme.pipedrive.com/api/v1`
    pub fn new(base_url: &str, api_token: impl Into<String>, timeout: Option<Duration>) -> SyncResult<Self> {
        let mut base = Url::parse(base_url).map_err(|e| SyncError::config(format!("Invalid base URL {base_url}: {e}")))?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let deals_url = base
            .join("deals")
            .map_err(|e| SyncError::config(format!("Invalid base URL {base_url}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            deals_url,
            api_token: api_token.into(),
            page_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn deals_url(&self) -> &Url {
        &self.deals_url
    }

    /// Fetch one listing page. `None` means the body could not be used and
    /// paging should stop.
    async fn fetch_page(&self, start: u64) -> SyncResult<Option<ListingEnvelope>> {
        let response = self
            .http
            .get(self.deals_url.clone())
            .query(&[("api_token", self.api_token.as_str())])
            .query(&[("start", start), ("limit", self.page_limit as u64)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::remote(format!("deal listing returned HTTP {status}")));
        }

        let body = response.text().await?;
        match serde_json::from_str::<ListingEnvelope>(&body) {
            Ok(envelope) if envelope.success => Ok(Some(envelope)),
            Ok(_) => {
                warn!("Deal listing page at {} reported success=false, treating as end of listing", start);
                Ok(None)
            }
            Err(e) => {
                warn!("Deal listing page at {} could not be decoded ({}), treating as end of listing", start, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CrmClient for PipedriveClient {
    async fn list_deals(&self) -> SyncResult<Vec<RemoteDealSummary>> {
        let mut summaries = Vec::new();
        let mut start = 0u64;

        loop {
            let Some(envelope) = self.fetch_page(start).await? else {
                break;
            };

            let page = envelope.data.unwrap_or_default();
            let page_len = page.len() as u64;
            summaries.extend(page.iter().map(normalize_remote_entry));
            debug!("Fetched {} remote deal(s) starting at {}", page_len, start);

            let next = match envelope.additional_data.and_then(|a| a.pagination) {
                Some(p) if p.more_items_in_collection => p.next_start.unwrap_or(start + page_len),
                _ => break,
            };
            if next <= start {
                warn!("Deal listing pagination did not advance past {}, stopping", start);
                break;
            }
            start = next;
        }

        Ok(summaries)
    }

    async fn push_deal(&self, deal: &Deal) -> PushOutcome {
        let result = self
            .http
            .post(self.deals_url.clone())
            .query(&[("api_token", self.api_token.as_str())])
            .json(deal)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => PushOutcome::Succeeded,
            Ok(response) => PushOutcome::Rejected { status: response.status().as_u16() },
            Err(e) => PushOutcome::Transport { message: e.without_url().to_string() },
        }
    }
}
