// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API.
//!
//! Each run endpoint takes a [`JobRequest`] and answers with a short status
//! message once the run has finished. Runs share one lock, so concurrent
//! requests are processed one after another. A run executes on its own
//! task and completes even if the client disconnects.

use crate::orchestrator::{
    linkedin_message, scrape_message, Orchestrator, LINKEDIN_FAILURE_MESSAGE,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Body of every run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Comma-separated keywords.
    pub keywords: String,
    /// remote, onsite or hybrid. Informational only.
    #[serde(default)]
    pub job_type: String,
}

pub struct ApiState {
    orchestrator: Orchestrator,
    run_lock: Mutex<()>,
}

impl ApiState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            run_lock: Mutex::new(()),
        }
    }
}

type Reply = (StatusCode, Json<Value>);

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/apply", post(handle_scrape))
        .route("/apply/linkedin", post(handle_linkedin))
        .route("/apply/greenhouse", post(handle_greenhouse))
        .layer(cors)
        .with_state(state)
}

/// Serve until the process is stopped.
pub async fn start(host: &str, port: u16, state: Arc<ApiState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("REST API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn message(status: StatusCode, text: impl Into<String>) -> Reply {
    (status, Json(json!({ "message": text.into() })))
}

/// Run `work` under the run lock on a spawned task.
async fn detached<T, F, Fut>(state: &Arc<ApiState>, work: F) -> Result<T, JoinError>
where
    F: FnOnce(Arc<ApiState>) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::spawn(async move {
        let _run = state.run_lock.lock().await;
        work(Arc::clone(&state)).await
    })
    .await
}

fn aborted(e: JoinError) -> Reply {
    warn!("run task aborted: {e}");
    message(StatusCode::INTERNAL_SERVER_ERROR, "Run aborted.")
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn handle_scrape(State(state): State<Arc<ApiState>>, Json(req): Json<JobRequest>) -> Reply {
    info!(keywords = %req.keywords, job_type = %req.job_type, "scrape requested");
    let run = detached(&state, move |state| async move {
        state.orchestrator.scrape_and_log(&req.keywords).await
    });
    match run.await {
        Err(e) => aborted(e),
        Ok(Ok(summary)) => message(StatusCode::OK, scrape_message(summary.listings)),
        Ok(Err(e)) => {
            warn!("scrape failed: {e:#}");
            message(StatusCode::BAD_GATEWAY, format!("Listing source unavailable: {e}"))
        }
    }
}

async fn handle_linkedin(State(state): State<Arc<ApiState>>, Json(req): Json<JobRequest>) -> Reply {
    info!(keywords = %req.keywords, job_type = %req.job_type, "LinkedIn run requested");
    let run = detached(&state, move |state| async move {
        state.orchestrator.apply_linkedin(&req.keywords).await
    });
    match run.await {
        Err(e) => aborted(e),
        Ok(Ok(summary)) => message(StatusCode::OK, linkedin_message(summary.applied)),
        Ok(Err(e)) => {
            warn!("LinkedIn run failed: {e:#}");
            message(StatusCode::OK, LINKEDIN_FAILURE_MESSAGE)
        }
    }
}

async fn handle_greenhouse(State(state): State<Arc<ApiState>>, Json(req): Json<JobRequest>) -> Reply {
    info!(keywords = %req.keywords, "provider run requested");
    let provider = state.orchestrator.config().provider.name.clone();
    let run = detached(&state, move |state| async move {
        state.orchestrator.apply_greenhouse(&req.keywords).await
    });
    match run.await {
        Err(e) => aborted(e),
        Ok(Ok(summary)) => message(
            StatusCode::OK,
            format!(
                "Applied to {} of {} resolved {provider} jobs.",
                summary.applied, summary.attempted
            ),
        ),
        Ok(Err(e)) => {
            warn!("provider run failed: {e:#}");
            message(StatusCode::BAD_GATEWAY, format!("{provider} run failed: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::journal::MemoryResultLog;
    use crate::renderer::NoopRenderer;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let orch = Orchestrator::new(
            AppConfig::default(),
            Arc::new(NoopRenderer),
            Arc::new(MemoryResultLog::new()),
        );
        router(Arc::new(ApiState::new(orch)))
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_linkedin_without_browser_reports_failure() {
        let req = Request::post("/apply/linkedin")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"keywords":"rust","job_type":"remote"}"#))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["message"], LINKEDIN_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_missing_keywords_is_rejected() {
        let req = Request::post("/apply")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"job_type":"remote"}"#))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
    }
}
