//! Client for the DECODE REST API.
//!
//! Every request is synchronous and sequential; there are no retries and no
//! timeouts. A failed list page aborts the whole harvest, a failed detail
//! fetch only drops that record.
use log::{debug, error, info, warn};
use thiserror::Error;
use ureq::Agent;

use crate::config::Config;
use crate::record::{Detail, Page, Summary};

/// Errors while talking to the DECODE API. `ureq` reports non-2xx responses
/// as errors, so an HTTP error status lands in `Http` as well.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("malformed response body: {0}")]
    Body(#[from] std::io::Error),
}

/// Blocking client for the DECODE listing and detail endpoints.
pub struct DecodeClient {
    agent: Agent,
    base_url: String,
    page_size: u32,
    max_pages: u32,
}

impl DecodeClient {
    pub fn new(config: &Config) -> Self {
        DecodeClient { agent: ureq::agent(), base_url: config.base_url.clone(), page_size: config.page_size, max_pages: config.max_pages }
    }

    /// Fetch a single page of records from the list endpoint.
    pub fn fetch_page(&self, table: &str, page: u32, page_size: u32) -> Result<Page, FetchError> {
        let url = format!("{}/list/{}", self.base_url, table);
        let response = self.agent.get(&url).query("page", &page.to_string()).query("page_size", &page_size.to_string()).call()?;
        Ok(response.into_json()?)
    }

    /// Fetch all record summaries, page by page, concatenated in page order.
    /// Stops at the first empty page, or after `max_pages` pages at the latest.
    pub fn fetch_all_summaries(&self, table: &str) -> Result<Vec<Summary>, FetchError> {
        let mut summaries = Vec::new();
        for page in 1..=self.max_pages {
            info!("fetching page {page}");
            let batch = self.fetch_page(table, page, self.page_size)?;
            if batch.records.is_empty() {
                info!("page {page} is empty, stopping");
                break;
            }
            summaries.extend(batch.records);
        }
        Ok(summaries)
    }

    /// Fetch the detail view of a single record.
    pub fn fetch_detail(&self, table: &str, id: &str) -> Result<Detail, FetchError> {
        let url = format!("{}/view/{}/{}", self.base_url, table, id);
        Ok(self.agent.get(&url).call()?.into_json()?)
    }

    /// Fetch details for every summary that carries an id. A summary without
    /// an id and a failed detail fetch are both logged and skipped, so the
    /// returned sequence may be a subset of the input.
    pub fn fetch_all_details(&self, table: &str, summaries: &[Summary]) -> Vec<Detail> {
        let total = summaries.len();
        let mut details = Vec::new();
        for (index, summary) in summaries.iter().enumerate() {
            match summary.id() {
                Some(id) => {
                    debug!("fetching details for record {id} ({}/{total})", index + 1);
                    match self.fetch_detail(table, id) {
                        Ok(detail) => details.push(detail),
                        Err(e) => error!("error fetching record {id}: {e}"),
                    }
                }
                None => warn!("skipping record {} of {total} due to missing id", index + 1),
            }
        }
        details
    }
}
