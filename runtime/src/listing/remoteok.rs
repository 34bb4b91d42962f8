// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! RemoteOK public job board.
//!
//! The API returns a JSON array whose first element is a legal notice;
//! only objects carrying a `position` field are postings.

use super::http_client::HttpClient;
use super::{matches_keywords, passthrough, split_keywords, str_field, ListingSource};
use crate::model::{Listing, Platform};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

pub struct RemoteOkSource {
    url: String,
    http: HttpClient,
}

impl RemoteOkSource {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            http: HttpClient::new(timeout_ms),
        }
    }
}

#[async_trait]
impl ListingSource for RemoteOkSource {
    fn name(&self) -> &str {
        "RemoteOK"
    }

    async fn fetch(&self, keywords: &str) -> Result<Vec<Listing>> {
        let resp = self
            .http
            .get_json(&self.url, &[], None)
            .await
            .context("RemoteOK request failed")?;
        debug!(url = %resp.final_url, status = resp.status, "RemoteOK responded");
        let items = resp
            .body
            .as_array()
            .context("RemoteOK response is not an array")?;

        let terms = split_keywords(keywords);
        let listings: Vec<Listing> = items
            .iter()
            .filter_map(Value::as_object)
            .filter(|item| item.contains_key("position"))
            .filter(|item| matches_keywords(str_field(item, "position", ""), &terms))
            .map(|item| {
                let mut listing = Listing::new(
                    str_field(item, "position", "Unknown"),
                    str_field(item, "company", "Unknown"),
                    str_field(item, "url", ""),
                    Platform::RemoteOk,
                );
                listing.extra = passthrough(item, &["position", "company", "url"]);
                listing
            })
            .collect();

        debug!(total = items.len(), "RemoteOK items received");
        info!(matched = listings.len(), keywords, "RemoteOK listings");
        Ok(listings)
    }
}
