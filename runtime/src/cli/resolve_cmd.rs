// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! `autoapply resolve <url>`: follow one listing to its provider form.

use crate::cli::output;
use crate::config::AppConfig;
use crate::flow::UrlResolver;
use anyhow::Result;

pub async fn run(config: AppConfig, url: &str) -> Result<()> {
    let renderer = super::launch_renderer(&config).await;
    let resolver = UrlResolver::new(config.provider.clone(), config.timeouts.clone());
    let resolved = resolver.resolve(renderer.as_ref(), url).await;
    let _ = renderer.shutdown().await;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "listing_url": url,
            "provider": config.provider.name,
            "resolved_url": resolved,
        }));
    } else if !output::is_quiet() {
        match &resolved {
            Some(form) => println!("  {} form: {form}", config.provider.name),
            None => println!("  No {} form found for {url}", config.provider.name),
        }
    }
    Ok(())
}
