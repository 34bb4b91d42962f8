// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! `autoapply apply linkedin|greenhouse`: run an application pass once.

use crate::cli::output;
use crate::config::AppConfig;
use crate::orchestrator::{linkedin_message, RunSummary, LINKEDIN_FAILURE_MESSAGE};
use anyhow::Result;
use tracing::warn;

pub async fn run_linkedin(config: AppConfig, keywords: &str) -> Result<()> {
    let renderer = super::launch_renderer(&config).await;
    let orchestrator = super::orchestrator(config, renderer.clone())?;
    let result = orchestrator.apply_linkedin(keywords).await;
    let _ = renderer.shutdown().await;

    match result {
        Ok(summary) => report(&linkedin_message(summary.applied), &summary),
        Err(e) => {
            warn!("LinkedIn run failed: {e:#}");
            report(LINKEDIN_FAILURE_MESSAGE, &RunSummary::default());
        }
    }
    Ok(())
}

pub async fn run_greenhouse(config: AppConfig, keywords: &str) -> Result<()> {
    let provider = config.provider.name.clone();
    let renderer = super::launch_renderer(&config).await;
    let orchestrator = super::orchestrator(config, renderer.clone())?;
    let result = orchestrator.apply_greenhouse(keywords).await;
    let _ = renderer.shutdown().await;

    let summary = result?;
    report(
        &format!(
            "Applied to {} of {} resolved {provider} jobs.",
            summary.applied, summary.attempted
        ),
        &summary,
    );
    Ok(())
}

fn report(message: &str, summary: &RunSummary) {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "message": message,
            "summary": summary,
        }));
    } else if !output::is_quiet() {
        println!("  {message}");
    }
}
