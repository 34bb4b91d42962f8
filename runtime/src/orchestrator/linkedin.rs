// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! LinkedIn Easy Apply run.
//!
//! One context serves the whole run: search per keyword, open each job
//! card in the side panel, and drive the Easy Apply modal. Cards without
//! Easy Apply are not attempts and leave no record.

use super::{Orchestrator, RunSummary};
use crate::error::ApplyError;
use crate::flow::FlowControls;
use crate::listing::split_keywords;
use crate::locate::Locator;
use crate::model::{ApplicationStatus, Listing, Platform};
use crate::renderer::{ControlQuery, RenderContext};
use anyhow::{Context, Result};
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

const CARD_SELECTOR: &str = ".job-card-container--clickable";
const TITLE_SELECTOR: &str = ".job-details-jobs-unified-top-card__job-title h1";
const COMPANY_SELECTOR: &str = ".job-details-jobs-unified-top-card__company-name a";

/// Recent (past 24h) Easy Apply postings only.
const SEARCH_FILTERS: [(&str, &str); 2] = [("f_TPR", "r86400"), ("f_AL", "true")];

pub const LINKEDIN_FAILURE_MESSAGE: &str = "Failed to complete LinkedIn auto-apply run.";

pub fn linkedin_message(applied: usize) -> String {
    format!("Auto-applied to {applied} Easy Apply jobs on LinkedIn.")
}

/// Search URL for one keyword.
pub fn search_url(base: &str, keyword: &str, location: &str) -> Result<Url> {
    let mut params = vec![("keywords", keyword), ("location", location)];
    params.extend(SEARCH_FILTERS);
    Url::parse_with_params(base, &params).with_context(|| format!("invalid LinkedIn search url: {base}"))
}

struct Panel {
    easy_apply: Locator,
    dismiss: Locator,
    discard: Locator,
    controls: FlowControls,
}

impl Panel {
    fn new() -> Self {
        Self {
            easy_apply: Locator::new(
                "easy apply",
                vec![
                    ControlQuery::css("button.jobs-apply-button"),
                    ControlQuery::button("Easy Apply"),
                ],
            ),
            dismiss: Locator::new("dismiss", vec![ControlQuery::css(".artdeco-modal__dismiss")]),
            discard: Locator::new("discard", vec![ControlQuery::button("Discard")]),
            controls: FlowControls::linkedin(),
        }
    }
}

impl Orchestrator {
    /// Apply through Easy Apply to recent postings matching `keywords`.
    pub async fn apply_linkedin(&self, keywords: &str) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        let span = info_span!("linkedin", run_id = %summary.run_id);

        async {
            let mut ctx = self
                .renderer
                .new_context()
                .await
                .context("cannot open browser context")?;
            let result = self.linkedin_search(&mut *ctx, keywords, &mut summary).await;
            if let Err(e) = ctx.close().await {
                debug!("closing LinkedIn context: {e:#}");
            }
            result?;
            info!(applied = summary.applied, attempted = summary.attempted, "LinkedIn run finished");
            Ok::<_, anyhow::Error>(summary)
        }
        .instrument(span)
        .await
    }

    async fn linkedin_search(
        &self,
        ctx: &mut dyn RenderContext,
        keywords: &str,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let panel = Panel::new();
        let settings = &self.config.linkedin;
        let mut terms = split_keywords(keywords);
        if terms.is_empty() {
            terms.push(String::new());
        }

        for term in &terms {
            if summary.applied >= self.config.flow.max_applications {
                break;
            }
            let url = search_url(&settings.search_url, term, &settings.location)?;
            if let Err(e) = ctx.navigate(url.as_str(), self.config.timeouts.navigation_ms).await {
                warn!(keyword = %term, "search navigation failed: {}", ApplyError::classify(&e));
                continue;
            }

            let mut index = 0;
            loop {
                if summary.applied >= self.config.flow.max_applications {
                    break;
                }
                // Re-query every time; the list re-renders as the panel changes.
                let cards = match ctx.query(&ControlQuery::css(CARD_SELECTOR)).await {
                    Ok(cards) => cards,
                    Err(e) => {
                        warn!(keyword = %term, "job cards unavailable: {e:#}");
                        break;
                    }
                };
                let Some(card) = cards.into_iter().nth(index) else {
                    break;
                };
                index += 1;

                self.close_modal(ctx, &panel).await;
                if let Err(e) = ctx.click(&card.handle).await {
                    debug!(card = index, "card not clickable: {e:#}");
                    continue;
                }
                let _ = ctx.wait_for_navigation(self.config.timeouts.probe_ms).await;

                self.try_card(ctx, &panel, summary).await;
            }
        }
        Ok(())
    }

    /// Attempt the job currently shown in the detail panel.
    async fn try_card(&self, ctx: &mut dyn RenderContext, panel: &Panel, summary: &mut RunSummary) {
        let title = first_text(ctx, TITLE_SELECTOR).await;
        let company = first_text(ctx, COMPANY_SELECTOR).await;
        let job_url = ctx.get_url().await.unwrap_or_default();
        let listing = Listing::new(title, company, job_url, Platform::LinkedIn);

        let Some(button) = panel
            .easy_apply
            .wait(ctx, self.config.timeouts.easy_apply_ms)
            .await
        else {
            debug!(title = %listing.title, company = %listing.company, "no Easy Apply");
            return;
        };
        info!(title = %listing.title, company = %listing.company, "Easy Apply found");

        let record = match ctx.click(&button.handle).await {
            Ok(()) => {
                let _ = ctx.wait_for_navigation(self.config.timeouts.probe_ms).await;
                self.drive(ctx, &listing, &panel.controls).await
            }
            Err(e) => {
                let err = ApplyError::ControlNotInteractable {
                    control: "easy apply".to_string(),
                    reason: format!("{e:#}"),
                };
                listing.record(ApplicationStatus::Failed, err.to_string())
            }
        };

        self.log.append(&record);
        summary.count(&record);
        if record.status != ApplicationStatus::Applied {
            self.close_modal(ctx, panel).await;
        }
    }

    /// Dismiss an open modal and discard the draft it leaves behind.
    async fn close_modal(&self, ctx: &mut dyn RenderContext, panel: &Panel) {
        let Some(dismiss) = panel.dismiss.find(ctx).await else {
            return;
        };
        if ctx.click(&dismiss.handle).await.is_err() {
            return;
        }
        if let Some(discard) = panel.discard.wait(ctx, 500).await {
            let _ = ctx.click(&discard.handle).await;
        }
    }
}

async fn first_text(ctx: &dyn RenderContext, selector: &str) -> String {
    ctx.query(&ControlQuery::css(selector))
        .await
        .ok()
        .and_then(|found| found.into_iter().next())
        .map(|el| el.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}
