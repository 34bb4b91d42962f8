// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Airtable tracker table holding indirect listings.
//!
//! Each record's `Apply` field is an intermediate listing URL that must go
//! through URL resolution before a form can be filled. Records without it
//! are ignored. One page of `page_size` records is read per call.

use super::http_client::HttpClient;
use super::{matches_keywords, passthrough, split_keywords, str_field, ListingSource};
use crate::config::AirtableSettings;
use crate::model::{Listing, Platform};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

const APPLY_FIELD: &str = "Apply";
const TITLE_FIELD: &str = "Position Title";
const COMPANY_FIELD: &str = "Company";

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    fields: Map<String, Value>,
}

pub struct AirtableSource {
    settings: AirtableSettings,
    http: HttpClient,
}

impl AirtableSource {
    pub fn new(settings: AirtableSettings, timeout_ms: u64) -> Self {
        Self {
            settings,
            http: HttpClient::new(timeout_ms),
        }
    }

    fn records_url(&self) -> String {
        format!(
            "{}/v0/{}/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.base_id,
            self.settings.table_id
        )
    }
}

#[async_trait]
impl ListingSource for AirtableSource {
    fn name(&self) -> &str {
        "Airtable"
    }

    async fn fetch(&self, keywords: &str) -> Result<Vec<Listing>> {
        if self.settings.api_key.trim().is_empty() {
            bail!("Airtable API key missing; set AIRTABLE_API_KEY");
        }
        if self.settings.base_id.is_empty() || self.settings.table_id.is_empty() {
            bail!("Airtable base_id and table_id must be configured");
        }

        let query = [
            ("view", self.settings.view.clone()),
            ("pageSize", self.settings.page_size.to_string()),
        ];
        let resp = self
            .http
            .get_json(&self.records_url(), &query, Some(&self.settings.api_key))
            .await
            .context("Airtable request failed")?;
        debug!(url = %resp.final_url, status = resp.status, "Airtable responded");
        let page: RecordPage =
            serde_json::from_value(resp.body).context("unexpected Airtable response shape")?;

        let terms = split_keywords(keywords);
        let listings: Vec<Listing> = page
            .records
            .iter()
            .map(|r| &r.fields)
            .filter(|f| f.get(APPLY_FIELD).and_then(Value::as_str).is_some())
            .filter(|f| matches_keywords(str_field(f, TITLE_FIELD, ""), &terms))
            .map(|f| {
                let mut listing = Listing::new(
                    str_field(f, TITLE_FIELD, "Unknown"),
                    str_field(f, COMPANY_FIELD, "Unknown"),
                    str_field(f, APPLY_FIELD, ""),
                    Platform::Greenhouse,
                );
                listing.extra = passthrough(f, &[APPLY_FIELD, TITLE_FIELD, COMPANY_FIELD]);
                listing
            })
            .collect();

        info!(
            records = page.records.len(),
            matched = listings.len(),
            "Airtable listings"
        );
        Ok(listings)
    }
}
