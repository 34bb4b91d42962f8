// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run drivers.
//!
//! The orchestrator owns the configuration, the renderer, the listing
//! sources and the result log. It processes listings strictly one at a
//! time. Whatever happens inside an attempt, the attempt's context is
//! closed and exactly one record is logged before the next listing starts.

mod greenhouse;
mod linkedin;

pub use linkedin::{linkedin_message, search_url, LINKEDIN_FAILURE_MESSAGE};

use crate::config::AppConfig;
use crate::error::ApplyError;
use crate::flow::{FlowControls, FlowNavigator, FlowOptions};
use crate::journal::ResultLog;
use crate::listing::{AirtableSource, ListingSource, RemoteOkSource};
use crate::model::{ApplicationStatus, JobRecord, Listing};
use crate::renderer::{RenderContext, Renderer};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Notes attached to scraped listings.
pub const MANUAL_REVIEW_NOTES: &str = "Review for extra requirements";

pub fn scrape_message(processed: usize) -> String {
    format!("Processed {processed} jobs")
}

/// Counts for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    /// Listings received from the source.
    pub listings: usize,
    /// Attempts started (one logged record each).
    pub attempted: usize,
    pub applied: usize,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            ..Self::default()
        }
    }

    fn count(&mut self, record: &JobRecord) {
        self.attempted += 1;
        if record.status == ApplicationStatus::Applied {
            self.applied += 1;
        }
    }
}

pub struct Orchestrator {
    config: AppConfig,
    renderer: Arc<dyn Renderer>,
    log: Arc<dyn ResultLog>,
    board: Arc<dyn ListingSource>,
    tracker: Arc<dyn ListingSource>,
}

impl Orchestrator {
    /// Build with the sources named in `config`.
    pub fn new(config: AppConfig, renderer: Arc<dyn Renderer>, log: Arc<dyn ResultLog>) -> Self {
        let timeout = config.listing.request_timeout_ms;
        let board = Arc::new(RemoteOkSource::new(config.listing.remoteok_url.clone(), timeout));
        let tracker = Arc::new(AirtableSource::new(config.listing.airtable.clone(), timeout));
        Self {
            config,
            renderer,
            log,
            board,
            tracker,
        }
    }

    /// Replace the job board used by [`Orchestrator::scrape_and_log`].
    pub fn with_board(mut self, board: Arc<dyn ListingSource>) -> Self {
        self.board = board;
        self
    }

    /// Replace the tracker used by [`Orchestrator::apply_greenhouse`].
    pub fn with_tracker(mut self, tracker: Arc<dyn ListingSource>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Fetch board listings matching `keywords` and log each for manual review.
    pub async fn scrape_and_log(&self, keywords: &str) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        let span = info_span!("scrape", run_id = %summary.run_id, source = self.board.name());
        async {
            let listings = self.board.fetch(keywords).await?;
            summary.listings = listings.len();
            for listing in &listings {
                self.log
                    .append(&listing.record(ApplicationStatus::ManualReview, MANUAL_REVIEW_NOTES));
            }
            info!(logged = listings.len(), "listings logged for review");
            Ok::<_, anyhow::Error>(summary)
        }
        .instrument(span)
        .await
    }

    /// One complete attempt on a direct application URL.
    ///
    /// Opens a fresh context, navigates, drives the flow, closes the context
    /// and logs exactly one record, which is also returned.
    pub async fn run_attempt(&self, listing: &Listing, controls: &FlowControls) -> JobRecord {
        let span = info_span!(
            "attempt",
            title = %listing.title,
            company = %listing.company,
            url = %listing.apply_url
        );
        let record = async {
            match self.renderer.new_context().await {
                Ok(mut ctx) => {
                    let record = self.attempt_in(&mut *ctx, listing, controls).await;
                    if let Err(e) = ctx.close().await {
                        debug!("closing attempt context: {e:#}");
                    }
                    record
                }
                Err(e) => {
                    let err = ApplyError::classify(&e);
                    warn!("cannot open browser context: {err}");
                    listing.record(ApplicationStatus::Failed, err.to_string())
                }
            }
        }
        .instrument(span)
        .await;

        self.log.append(&record);
        record
    }

    async fn attempt_in(
        &self,
        ctx: &mut dyn RenderContext,
        listing: &Listing,
        controls: &FlowControls,
    ) -> JobRecord {
        match ctx
            .navigate(&listing.apply_url, self.config.timeouts.navigation_ms)
            .await
        {
            Ok(nav) => debug!(final_url = %nav.final_url, load_ms = nav.load_time_ms, "form loaded"),
            Err(e) => {
                let err = ApplyError::classify(&e);
                warn!("navigation failed: {err}");
                return listing.record(ApplicationStatus::Failed, err.to_string());
            }
        }
        self.drive(ctx, listing, controls).await
    }

    /// Drive the flow on a page that is already showing the form.
    pub(crate) async fn drive(
        &self,
        ctx: &mut dyn RenderContext,
        listing: &Listing,
        controls: &FlowControls,
    ) -> JobRecord {
        let navigator = FlowNavigator::new(
            &self.config.profile,
            controls,
            FlowOptions::from_config(&self.config),
        );
        let outcome = navigator.run(ctx).await;
        info!(
            state = ?outcome.state,
            steps = outcome.steps,
            filled = outcome.fields_filled,
            "attempt finished"
        );
        listing.record(outcome.status(), outcome.notes())
    }
}
