//! Retrying HTTP client shared by every network-facing Synodex component.
//!
//! All calls in this system are read-only lookups, so one uniform policy
//! covers annotator queries, normalizer lookups, and oracle calls alike:
//! up to 5 attempts, exponential backoff from a 100 ms factor, retrying on
//! transport errors and on the status codes the upstream services emit when
//! overloaded or rate-capped.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use tracing::warn;

use crate::error::{Result, SynodexError};

/// Bounded retry policy for outbound lookups.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff_factor: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: Duration::from_millis(100),
            retry_statuses: vec![500, 502, 503, 504, 403],
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay before the given retry: `factor * 2^(attempt-1)`, attempt 1-based.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        self.backoff_factor * (1u32 << (attempt.saturating_sub(1)).min(16) as u32)
    }

    pub fn attempts_exhausted(&self, attempt: usize) -> bool {
        attempt >= self.max_attempts
    }
}

/// `reqwest::Client` wrapper applying the shared retry policy.
#[derive(Debug, Clone)]
pub struct RetryClient {
    client: Client,
    policy: RetryPolicy,
}

impl RetryClient {
    pub fn new() -> Result<Self> {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SynodexError::Http)?;
        Ok(Self { client, policy })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a built request under the retry policy.
    ///
    /// A response with a non-retryable status is returned as-is; callers
    /// decide whether e.g. a 404 is an error for them. Exhausting the
    /// attempt budget surfaces the last status or transport error.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let req = request.try_clone().ok_or_else(|| {
                SynodexError::Config("request body is not cloneable for retry".to_string())
            })?;

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if !self.policy.should_retry(status) {
                        return Ok(resp);
                    }
                    if self.policy.attempts_exhausted(attempt) {
                        let message = resp.text().await.unwrap_or_default();
                        return Err(SynodexError::Api { status, message });
                    }
                    warn!(status, attempt, "retryable status, backing off");
                }
                Err(e) => {
                    if self.policy.attempts_exhausted(attempt) {
                        return Err(SynodexError::Http(e));
                    }
                    warn!(error = %e, attempt, "transport error, backing off");
                }
            }

            tokio::time::sleep(self.policy.backoff_delay(attempt)).await;
        }
    }

    /// GET `url`, require a success status, decode the JSON body.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self.execute(self.get(url).query(query)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SynodexError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.json().await?)
    }
}
