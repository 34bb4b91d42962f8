// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracker listings resolved to provider forms, then applied to.

use super::{Orchestrator, RunSummary};
use crate::flow::{FlowControls, UrlResolver};
use anyhow::{Context, Result};
use tracing::{debug, info, info_span, Instrument};

impl Orchestrator {
    /// Resolve each tracker listing and apply to the ones hosted by the
    /// configured provider, up to `max_applications` attempts.
    pub async fn apply_greenhouse(&self, keywords: &str) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        let span = info_span!("greenhouse", run_id = %summary.run_id, provider = %self.config.provider.name);

        async {
            let listings = self
                .tracker
                .fetch(keywords)
                .await
                .with_context(|| format!("{} listings unavailable", self.tracker.name()))?;
            summary.listings = listings.len();

            let resolver = UrlResolver::new(self.config.provider.clone(), self.config.timeouts.clone());
            let controls = FlowControls::greenhouse();

            for mut listing in listings {
                if summary.attempted >= self.config.flow.max_applications {
                    break;
                }
                let Some(form_url) = resolver.resolve(self.renderer.as_ref(), &listing.apply_url).await
                else {
                    debug!(title = %listing.title, url = %listing.apply_url, "not a provider form, next listing");
                    continue;
                };
                listing.apply_url = form_url;
                let record = self.run_attempt(&listing, &controls).await;
                summary.count(&record);
            }

            info!(
                listings = summary.listings,
                attempted = summary.attempted,
                applied = summary.applied,
                "provider run finished"
            );
            Ok::<_, anyhow::Error>(summary)
        }
        .instrument(span)
        .await
    }
}
