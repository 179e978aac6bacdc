//! Shared HTTP client for the bibliographic APIs

use crate::config::SourcesConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// reqwest client plus a request budget shared by every source built on it
#[derive(Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    limiter: Arc<DefaultDirectRateLimiter>,
    timeout: Duration,
}

impl SourceClient {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let timeout = config.timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            http,
            limiter: Arc::new(limiter),
            timeout,
        })
    }

    /// GET `url` as JSON. Non-2xx responses become `SourceUnavailable`.
    ///
    /// Waiting for the request budget is unbounded; the timeout starts once
    /// the budget admits the request and covers only the HTTP exchange.
    pub async fn get_json<T: DeserializeOwned>(&self, source_name: &str, url: &str) -> Result<T> {
        self.limiter.until_ready().await;

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.send(source_name, url))
            .await
            .unwrap_or_else(|_| {
                Err(AppError::Timeout {
                    source_name: source_name.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            });
        metrics::record_source_call(source_name, start.elapsed().as_secs_f64(), outcome.is_ok());
        outcome
    }

    async fn send<T: DeserializeOwned>(&self, source_name: &str, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.request_error(source_name, e))?;

        if !response.status().is_success() {
            return Err(AppError::source_unavailable(
                source_name,
                format!("API error {}", response.status()),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(source_name, e)
            } else {
                AppError::source_unavailable(source_name, format!("Failed to parse response: {}", e))
            }
        })
    }

    fn request_error(&self, source_name: &str, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::Timeout {
                source_name: source_name.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            AppError::source_unavailable(source_name, format!("Request failed: {}", error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json, Router};
    use futures::future::join_all;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_budget_wait_is_not_part_of_timeout() {
        let base = serve(Router::new().route(
            "/ping",
            get(|| async { Json(serde_json::json!({ "ok": true })) }),
        ))
        .await;
        let client = SourceClient::new(&SourcesConfig {
            timeout_secs: 1,
            requests_per_second: 1,
            ..Default::default()
        })
        .unwrap();

        let url = format!("{}/ping", base);
        let started = Instant::now();
        let results = join_all((0..3).map(|_| client.get_json::<serde_json::Value>("stub", &url))).await;

        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_slow_exchange_times_out() {
        let base = serve(Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(serde_json::json!({}))
            }),
        ))
        .await;
        let client = SourceClient::new(&SourcesConfig {
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();

        let err = client
            .get_json::<serde_json::Value>("stub", &format!("{}/slow", base))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout { .. }));
    }
}
