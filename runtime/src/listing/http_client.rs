// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Async HTTP client for listing APIs.
//!
//! Plain JSON over reqwest. Retries transport errors and 5xx responses with
//! exponential backoff and honours `Retry-After` on 429.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("autoapply/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 2;

/// JSON body of a successful response.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    /// Final URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub body: Value,
}

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// GET `url` and parse the body as JSON.
    ///
    /// `bearer` adds an `Authorization: Bearer` header. Non-2xx responses
    /// that survive the retries are errors.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<JsonResponse> {
        let mut retries = 0u32;

        loop {
            let mut builder = self
                .client
                .get(url)
                .query(query)
                .header(reqwest::header::ACCEPT, "application/json");
            if let Some(token) = bearer {
                builder = builder.bearer_auth(token);
            }

            match builder.send().await {
                Ok(r) => {
                    let status = r.status().as_u16();

                    if status >= 500 && retries < MAX_RETRIES {
                        retries += 1;
                        debug!(url, status, retries, "server error, retrying");
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }

                    if status == 429 && retries < MAX_RETRIES {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        debug!(url, retry_after, "rate limited");
                        tokio::time::sleep(Duration::from_secs(retry_after.min(10))).await;
                        continue;
                    }

                    if !r.status().is_success() {
                        bail!("GET {url} returned HTTP {status}");
                    }

                    let final_url = r.url().to_string();
                    let body = r
                        .json::<Value>()
                        .await
                        .with_context(|| format!("GET {url} returned invalid JSON"))?;
                    return Ok(JsonResponse {
                        final_url,
                        status,
                        body,
                    });
                }
                Err(e) => {
                    if retries < MAX_RETRIES {
                        retries += 1;
                        debug!(url, retries, "request failed, retrying: {e}");
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }
                    return Err(e).with_context(|| format!("GET {url} failed"));
                }
            }
        }
    }
}

fn backoff(retry: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(retry.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(500));
        assert_eq!(backoff(2), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_get_json_sends_bearer_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/items"))
            .and(query_param("pageSize", "10"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new(5_000);
        let resp = client
            .get_json(
                &format!("{}/v0/items", server.uri()),
                &[("pageSize", "10".to_string())],
                Some("secret"),
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["ok"], true);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(5_000);
        let err = client.get_json(&server.uri(), &[], None).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
