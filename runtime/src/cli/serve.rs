// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! `autoapply serve`: run the REST API until interrupted.

use crate::cli::output::{self, Styled};
use crate::config::AppConfig;
use crate::rest::{self, ApiState};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub async fn run(config: AppConfig, host: &str, port: u16) -> Result<()> {
    let s = Styled::new();
    info!("starting autoapply v{}", env!("CARGO_PKG_VERSION"));

    let renderer = super::launch_renderer(&config).await;
    let log_path = config.log_path();
    let orchestrator = super::orchestrator(config, renderer.clone())?;
    let state = Arc::new(ApiState::new(orchestrator));

    if !output::is_quiet() {
        eprintln!(
            "  {} autoapply v{} serving on http://{host}:{port}",
            s.ok_sym(),
            env!("CARGO_PKG_VERSION")
        );
        eprintln!("  Results: {}", log_path.display());
    }

    let result = tokio::select! {
        r = rest::start(host, port, state) => r,
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
            Ok(())
        }
    };

    let _ = renderer.shutdown().await;
    if !output::is_quiet() {
        eprintln!("  {} autoapply stopped.", s.ok_sym());
    }
    result
}
