// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! `autoapply scrape`: log matching board listings for manual review.

use crate::cli::output;
use crate::config::AppConfig;
use crate::orchestrator::scrape_message;
use crate::renderer::NoopRenderer;
use anyhow::Result;
use std::sync::Arc;

pub async fn run(config: AppConfig, keywords: &str) -> Result<()> {
    let orchestrator = super::orchestrator(config, Arc::new(NoopRenderer))?;
    let summary = orchestrator.scrape_and_log(keywords).await?;
    let message = scrape_message(summary.listings);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "message": message,
            "summary": summary,
        }));
    } else if !output::is_quiet() {
        println!("  {message}");
    }
    Ok(())
}
