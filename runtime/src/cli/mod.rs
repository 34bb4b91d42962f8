// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the autoapply binary.

pub mod apply_cmd;
pub mod doctor;
pub mod output;
pub mod resolve_cmd;
pub mod scrape_cmd;
pub mod serve;

use crate::config::AppConfig;
use crate::journal::{JsonlResultLog, ResultLog};
use crate::orchestrator::Orchestrator;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{NoopRenderer, Renderer};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `autoapply=info`, or `debug` with
/// `--verbose`. Logs go to stderr so `--json` output on stdout stays clean.
pub fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose {
        "autoapply=debug,autoapply_runtime=debug"
    } else {
        "autoapply=info,autoapply_runtime=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Load configuration, logging where it came from.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let (config, source) = AppConfig::load(path)?;
    match source {
        Some(p) => info!(path = %p.display(), "configuration loaded"),
        None => info!("no configuration file found, using defaults"),
    }
    Ok(config)
}

/// Launch Chromium, or fall back to a renderer that refuses contexts.
pub async fn launch_renderer(config: &AppConfig) -> Arc<dyn Renderer> {
    match ChromiumRenderer::launch(&config.browser, config.timeouts.settle_ms).await {
        Ok(renderer) => {
            info!(headless = config.browser.headless, "Chromium renderer initialized");
            Arc::new(renderer)
        }
        Err(e) => {
            warn!("failed to launch Chromium: {e:#}");
            warn!("running without a browser; application runs will log failures");
            Arc::new(NoopRenderer)
        }
    }
}

/// Build an orchestrator writing to the configured JSONL log.
pub fn orchestrator(config: AppConfig, renderer: Arc<dyn Renderer>) -> Result<Orchestrator> {
    let log: Arc<dyn ResultLog> = Arc::new(JsonlResultLog::open(&config.log_path())?);
    Ok(Orchestrator::new(config, renderer, log))
}
