// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser automation.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). The filler,
//! the flow navigator and the URL resolver are written against these
//! traits only.

pub mod chromium;
mod scripts;

use crate::model::{ElementRef, FoundElement, PageSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// One way of finding an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlQuery {
    /// A CSS selector.
    Css(String),
    /// A button, link or submit input whose text contains the given text
    /// (case-insensitive).
    Button(String),
    /// Any leaf element whose text contains the given text (case-insensitive).
    Text(String),
}

impl ControlQuery {
    pub fn css(s: impl Into<String>) -> Self {
        Self::Css(s.into())
    }

    pub fn button(s: impl Into<String>) -> Self {
        Self::Button(s.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl fmt::Display for ControlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::Button(s) => write!(f, "button={s}"),
            Self::Text(s) => write!(f, "text={s}"),
        }
    }
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently open contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab).
///
/// Element handles returned by `snapshot` and `query` are valid until the
/// next navigation.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Enumerate every fillable control on the page.
    async fn snapshot(&self) -> Result<PageSnapshot>;
    /// Find elements matching a query, in document order.
    async fn query(&self, query: &ControlQuery) -> Result<Vec<FoundElement>>;
    /// Replace the value of a text control.
    async fn fill(&self, element: &ElementRef, value: &str) -> Result<()>;
    /// Select the option with the given label.
    async fn select_option(&self, element: &ElementRef, label: &str) -> Result<()>;
    /// Check a checkbox or radio button.
    async fn check(&self, element: &ElementRef) -> Result<()>;
    /// Attach a local file to a file input.
    async fn set_files(&self, element: &ElementRef, path: &Path) -> Result<()>;
    /// Click an element.
    async fn click(&self, element: &ElementRef) -> Result<()>;
    /// Wait for any in-flight navigation to finish and the page to settle.
    async fn wait_for_navigation(&mut self, timeout_ms: u64) -> Result<()>;
    /// Wait for a tab opened by this one, returning it as a new context.
    async fn wait_for_new_context(&mut self, timeout_ms: u64)
        -> Result<Option<Box<dyn RenderContext>>>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A no-op renderer used when Chromium is unavailable.
///
/// Listing scrapes work without a browser; every browser-driven run fails
/// its attempts with a logged reason instead.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("browser not available: no Chromium renderer"))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn active_contexts(&self) -> usize {
        0
    }
}
