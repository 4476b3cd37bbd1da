//! LLM interaction with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait defining async LLM interaction
//! - [`LlmClient`]: either the live `awful_aj` client bound to one chat
//!   template, or a canned reply used in test mode
//! - [`RetryAsk`]: decorator that adds the shared [`RetryPolicy`] to any
//!   `AskAsync` implementation
//!
//! The chat templates (system prompts, response formats) live in the
//! `awful_aj` configuration directory and are loaded by name at startup.

use crate::retry::RetryPolicy;
use awful_aj::api::ask;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Trait for async LLM interaction.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds the shared retry policy to any [`AskAsync`] implementation.
pub struct RetryAsk<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.policy.max_retries {
                        error!(
                            attempt,
                            max = self.policy.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.policy.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// The LLM collaborator for one role (summariser or analyst).
#[derive(Debug, Clone)]
pub enum LlmClient {
    /// Calls the OpenAI-compatible endpoint configured for `awful_aj`.
    Live {
        config: Arc<AwfulJadeConfig>,
        template: Arc<ChatTemplate>,
    },
    /// Always answers with the same text. Used in test mode.
    Canned(String),
}

impl AskAsync for LlmClient {
    type Response = String;

    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        match self {
            LlmClient::Live { config, template } => {
                let t0 = Instant::now();
                let res = ask(config, text.to_string(), template, None, None).await;
                if let Err(e) = &res {
                    warn!(elapsed_ms = t0.elapsed().as_millis(), error = %e, "API call failed");
                }
                res
            }
            LlmClient::Canned(reply) => Ok(reply.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Flaky {
        failures_left: AtomicUsize,
        calls: AtomicUsize,
    }

    impl AskAsync for Flaky {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err("transient".into());
            }
            Ok(format!("echo: {text}"))
        }
    }

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 2,
            jitter_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let flaky = Flaky {
            failures_left: AtomicUsize::new(2),
            ..Flaky::default()
        };
        let api = RetryAsk::new(flaky, fast_policy(3));
        assert_eq!(api.ask("hi").await.unwrap(), "echo: hi");
        assert_eq!(api.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let flaky = Flaky {
            failures_left: AtomicUsize::new(10),
            ..Flaky::default()
        };
        let api = RetryAsk::new(flaky, fast_policy(2));
        assert!(api.ask("hi").await.is_err());
        assert_eq!(api.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_canned_client_ignores_input() {
        let client = LlmClient::Canned("fixed".to_string());
        assert_eq!(client.ask("anything").await.unwrap(), "fixed");
        assert_eq!(client.ask("").await.unwrap(), "fixed");
    }
}
