// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Follow an intermediate listing page to the provider's application form.
//!
//! Resolution opens its own context, may collect more as hops open new
//! tabs, and closes every one of them before returning. A negative result
//! and a browser failure look the same to the caller: no URL.

use crate::config::{ProviderConfig, Timeouts};
use crate::error::ApplyError;
use crate::locate::Locator;
use crate::renderer::{ControlQuery, RenderContext, Renderer};
use anyhow::Result;
use tracing::{debug, info, warn};

/// Resolves indirect listings for one provider.
pub struct UrlResolver {
    provider: ProviderConfig,
    timeouts: Timeouts,
    apply_now: Locator,
    confirm: Locator,
}

impl UrlResolver {
    pub fn new(provider: ProviderConfig, timeouts: Timeouts) -> Self {
        Self {
            provider,
            timeouts,
            apply_now: Locator::new(
                "apply now",
                vec![
                    ControlQuery::button("Apply Now"),
                    ControlQuery::css("a[data-testid='apply-button']"),
                ],
            ),
            confirm: Locator::new(
                "continue to apply",
                vec![ControlQuery::button("No, continue to apply")],
            ),
        }
    }

    /// Resolve `listing_url`, returning the provider form URL if one is found.
    pub async fn resolve(&self, renderer: &dyn Renderer, listing_url: &str) -> Option<String> {
        let ctx = match renderer.new_context().await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(url = listing_url, "cannot open context for resolution: {e:#}");
                return None;
            }
        };
        let mut contexts = vec![ctx];

        let outcome = self.follow(&mut contexts, listing_url).await;

        for ctx in contexts {
            if let Err(e) = ctx.close().await {
                debug!("closing resolution context: {e:#}");
            }
        }

        match outcome {
            Ok(Some(url)) => {
                info!(provider = %self.provider.name, %url, "resolved application form");
                Some(url)
            }
            Ok(None) => {
                let err = ApplyError::UnresolvableForm(listing_url.to_string());
                info!(provider = %self.provider.name, "{err}");
                None
            }
            Err(e) => {
                warn!(url = listing_url, "resolution failed: {}", ApplyError::classify(&e));
                None
            }
        }
    }

    /// Walk the hops. The frontmost context is always the last element.
    async fn follow(
        &self,
        contexts: &mut Vec<Box<dyn RenderContext>>,
        listing_url: &str,
    ) -> Result<Option<String>> {
        let Some(first) = contexts.last_mut() else {
            return Ok(None);
        };
        let nav = first.navigate(listing_url, self.timeouts.navigation_ms).await?;
        debug!(final_url = %nav.final_url, load_ms = nav.load_time_ms, "listing page loaded");

        if self.form_present(&**first).await? {
            debug!("provider form already on the listing page");
            return Ok(Some(first.get_url().await?));
        }

        self.hop(contexts, &self.apply_now, self.timeouts.apply_button_ms).await?;
        self.hop(contexts, &self.confirm, self.timeouts.probe_ms).await?;

        let Some(front) = contexts.last() else {
            return Ok(None);
        };
        let candidate = front.get_url().await?;
        if self.provider.matches(&candidate) {
            Ok(Some(candidate))
        } else {
            debug!(%candidate, marker = %self.provider.domain_marker, "final url does not match provider");
            Ok(None)
        }
    }

    /// Click an optional control on the frontmost context and adopt any
    /// tab it opens.
    async fn hop(
        &self,
        contexts: &mut Vec<Box<dyn RenderContext>>,
        locator: &Locator,
        timeout_ms: u64,
    ) -> Result<()> {
        let Some(front) = contexts.last_mut() else {
            return Ok(());
        };
        let Some(control) = locator.wait(&**front, timeout_ms).await else {
            debug!(locator = locator.name, "{}", ApplyError::ControlNotFound(locator.name.to_string()));
            return Ok(());
        };
        front.click(&control.handle).await?;

        if let Some(popup) = front.wait_for_new_context(self.timeouts.popup_ms).await? {
            debug!(locator = locator.name, "control opened a new tab");
            contexts.push(popup);
        }
        if let Some(front) = contexts.last_mut() {
            front.wait_for_navigation(self.timeouts.navigation_ms).await?;
        }
        Ok(())
    }

    async fn form_present(&self, ctx: &dyn RenderContext) -> Result<bool> {
        let url = ctx.get_url().await?;
        if !self.provider.matches(&url) || self.provider.apply_path.is_empty() {
            return Ok(false);
        }
        let query = ControlQuery::css(format!("form[action*='{}']", self.provider.apply_path));
        Ok(!ctx.query(&query).await?.is_empty())
    }
}
