// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.

use super::{scripts, ControlQuery, NavigationResult, RenderContext, Renderer};
use crate::config::BrowserSettings;
use crate::error::ApplyError;
use crate::model::{ElementRef, FoundElement, PageSnapshot};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Poll interval while waiting for a new tab.
const POPUP_POLL: Duration = Duration::from_millis(200);

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. Configured path (config file or AUTOAPPLY_CHROMIUM_PATH)
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    // 2. ~/.autoapply/chromium/
    let local = crate::config::home_dir().join("chromium");
    let candidates = if cfg!(target_os = "macos") {
        vec![
            local.join("chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
            local.join("chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
        ]
    } else {
        vec![local.join("chrome-linux64/chrome"), local.join("chrome")]
    };
    if let Some(c) = candidates.into_iter().find(|c| c.exists()) {
        return Some(c);
    }

    // 3. System PATH
    for bin in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(bin) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Reply shape of the element operation scripts.
#[derive(Debug, Deserialize)]
struct ScriptReply {
    ok: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// State shared between the renderer and every context it hands out.
struct Shared {
    browser: tokio::sync::Mutex<Browser>,
    active_count: AtomicUsize,
    /// Target ids of tabs already owned by a context.
    owned_targets: Mutex<HashSet<String>>,
    settle: Duration,
}

impl Shared {
    fn own(&self, target: &str) -> bool {
        match self.owned_targets.lock() {
            Ok(mut set) => set.insert(target.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(target.to_string()),
        }
    }

    fn release(&self, target: &str) {
        match self.owned_targets.lock() {
            Ok(mut set) => set.remove(target),
            Err(poisoned) => poisoned.into_inner().remove(target),
        };
    }

    fn adopt(self: &Arc<Self>, page: Page) -> ChromiumContext {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        ChromiumContext {
            target: page.target_id().inner().clone(),
            page,
            shared: Arc::clone(self),
        }
    }
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    shared: Arc<Shared>,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance with the given settings.
    pub async fn launch(settings: &BrowserSettings, settle_ms: u64) -> Result<Self> {
        let chrome_path = find_chromium(settings.chromium_path.as_deref())
            .context("Chromium not found. Set browser.chromium_path or AUTOAPPLY_CHROMIUM_PATH.")?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-background-networking");
        if settings.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }
        if let Some(dir) = &settings.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        for arg in &settings.args {
            builder = builder.arg(arg.as_str());
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let shared = Arc::new(Shared {
            browser: tokio::sync::Mutex::new(browser),
            active_count: AtomicUsize::new(0),
            owned_targets: Mutex::new(HashSet::new()),
            settle: Duration::from_millis(settle_ms),
        });

        // The startup tab is never a popup.
        let startup = shared.browser.lock().await.pages().await;
        if let Ok(pages) = startup {
            for page in pages {
                shared.own(page.target_id().inner());
            }
        }

        Ok(Self { shared, handler })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .shared
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.shared.own(page.target_id().inner());
        Ok(Box::new(self.shared.adopt(page)))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.shared.browser.lock().await;
        let _ = browser.close().await;
        let _ = browser.wait().await;
        self.handler.abort();
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.shared.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    target: String,
    shared: Arc<Shared>,
}

impl ChromiumContext {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;
        let value: serde_json::Value = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))?;
        serde_json::from_value(value).context("unexpected JS result shape")
    }

    async fn run_op(&self, element: &ElementRef, script: String) -> Result<()> {
        let reply: ScriptReply = self.eval(&script).await?;
        if reply.ok {
            Ok(())
        } else {
            Err(ApplyError::ControlNotInteractable {
                control: element.to_string(),
                reason: reply.reason.unwrap_or_else(|| "unknown".to_string()),
            }
            .into())
        }
    }

    async fn current_url(&self) -> String {
        self.page
            .url()
            .await
            .ok()
            .flatten()
            .map(|u| u.to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                tokio::time::sleep(self.shared.settle).await;
                let final_url = match self.current_url().await {
                    u if u.is_empty() => url.to_string(),
                    u => u,
                };
                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => Err(ApplyError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()),
            Err(_) => Err(ApplyError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms,
            }
            .into()),
        }
    }

    async fn get_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn snapshot(&self) -> Result<PageSnapshot> {
        self.eval(&scripts::snapshot())
            .await
            .context("failed to enumerate controls")
    }

    async fn query(&self, query: &ControlQuery) -> Result<Vec<FoundElement>> {
        self.eval(&scripts::query(query))
            .await
            .with_context(|| format!("query failed: {query}"))
    }

    async fn fill(&self, element: &ElementRef, value: &str) -> Result<()> {
        self.run_op(element, scripts::fill(element, value)).await
    }

    async fn select_option(&self, element: &ElementRef, label: &str) -> Result<()> {
        self.run_op(element, scripts::select_option(element, label))
            .await
    }

    async fn check(&self, element: &ElementRef) -> Result<()> {
        self.run_op(element, scripts::check(element)).await
    }

    async fn set_files(&self, element: &ElementRef, path: &Path) -> Result<()> {
        let node = self
            .page
            .find_element(scripts::ref_selector(element))
            .await
            .map_err(|e| ApplyError::ControlNotInteractable {
                control: element.to_string(),
                reason: e.to_string(),
            })?;
        let params = SetFileInputFilesParams::builder()
            .files(vec![path.display().to_string()])
            .backend_node_id(node.backend_node_id)
            .build()
            .map_err(|e| anyhow::anyhow!("invalid file input params: {e}"))?;
        self.page
            .execute(params)
            .await
            .context("failed to attach file")?;
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.run_op(element, scripts::click(element)).await
    }

    async fn wait_for_navigation(&mut self, timeout_ms: u64) -> Result<()> {
        let result = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.page.wait_for_navigation(),
        )
        .await;
        match result {
            Ok(Ok(_)) => {
                tokio::time::sleep(self.shared.settle).await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => Err(ApplyError::NavigationTimeout {
                url: self.current_url().await,
                timeout_ms,
            }
            .into()),
        }
    }

    async fn wait_for_new_context(
        &mut self,
        timeout_ms: u64,
    ) -> Result<Option<Box<dyn RenderContext>>> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            let pages = self
                .shared
                .browser
                .lock()
                .await
                .pages()
                .await
                .context("failed to list tabs")?;
            for page in pages {
                if self.shared.own(page.target_id().inner()) {
                    debug!(opener = %self.target, "adopted new tab");
                    let _ = page.bring_to_front().await;
                    let mut ctx = self.shared.adopt(page);
                    let _ = ctx.wait_for_navigation(timeout_ms).await;
                    return Ok(Some(Box::new(ctx)));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POPUP_POLL).await;
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.shared.active_count.fetch_sub(1, Ordering::Relaxed);
        self.shared.release(&self.target);
        let _ = self.page.close().await;
        Ok(())
    }
}
