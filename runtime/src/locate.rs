// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Resolve a control by capability.
//!
//! A [`Locator`] names one capability ("submit", "next step", "Apply Now")
//! and carries the ordered alternative queries that may express it on
//! different sites. Resolution returns the first visible and enabled match.
//! Query failures and timeouts both mean "not present".

use crate::model::FoundElement;
use crate::renderer::{ControlQuery, RenderContext};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Poll interval for [`Locator::wait`].
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub name: &'static str,
    pub queries: Vec<ControlQuery>,
}

impl Locator {
    pub fn new(name: &'static str, queries: Vec<ControlQuery>) -> Self {
        Self { name, queries }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Single pass over the alternatives.
    pub async fn find(&self, ctx: &dyn RenderContext) -> Option<FoundElement> {
        for query in &self.queries {
            match ctx.query(query).await {
                Ok(found) => {
                    if let Some(el) = found.into_iter().find(FoundElement::is_actionable) {
                        debug!(locator = self.name, %query, handle = %el.handle, "resolved");
                        return Some(el);
                    }
                }
                Err(e) => {
                    debug!(locator = self.name, %query, "query failed: {e:#}");
                }
            }
        }
        None
    }

    /// Poll until a match appears or `timeout_ms` elapses.
    pub async fn wait(&self, ctx: &dyn RenderContext, timeout_ms: u64) -> Option<FoundElement> {
        if self.is_empty() {
            return None;
        }
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Some(el) = self.find(ctx).await {
                return Some(el);
            }
            let now = Instant::now();
            if now >= deadline {
                debug!(locator = self.name, timeout_ms, "not present");
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}
