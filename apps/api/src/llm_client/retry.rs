//! Model fallback + bounded exponential backoff for overload errors.
//!
//! Flow: primary model → (first overload) fallback model, immediately →
//!       (further overloads) backoff 2s, 4s, ... until `max_retries` failures.
//! Any non-overload error is terminal.

use std::time::Duration;

use tracing::{info, warn};

use crate::llm_client::{GenerationConfig, GenerativeModel, LlmError};

/// Bounds for `generate_with_fallback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first failure, the fallback swap included.
    /// A call sequence therefore makes at most `max_retries + 1` model calls.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^(failures - 1)`: 2s after the second failure, 4s after the third.
    pub fn backoff_delay(&self, failures: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(failures.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    Primary,
    Fallback,
}

/// Primary and fallback model identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPair {
    pub primary: String,
    pub fallback: String,
}

impl ModelPair {
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    pub fn name(&self, choice: ModelChoice) -> &str {
        match choice {
            ModelChoice::Primary => &self.primary,
            ModelChoice::Fallback => &self.fallback,
        }
    }
}

#[derive(Debug)]
enum AttemptState {
    Attempting { model: ModelChoice, failures: u32 },
    Success(String),
    Failed(LlmError),
}

/// What to do after a failed call.
#[derive(Debug, PartialEq)]
enum Transition {
    Retry {
        model: ModelChoice,
        delay: Option<Duration>,
    },
    Fail,
}

fn on_failure(
    current: ModelChoice,
    failures: u32,
    err: &LlmError,
    policy: &RetryPolicy,
) -> Transition {
    if !err.is_overloaded() || failures > policy.max_retries {
        return Transition::Fail;
    }
    if failures == 1 && current == ModelChoice::Primary {
        return Transition::Retry {
            model: ModelChoice::Fallback,
            delay: None,
        };
    }
    Transition::Retry {
        model: current,
        delay: Some(policy.backoff_delay(failures)),
    }
}

/// Calls the model with the fixed generation config, falling back and
/// backing off on overload errors. Returns the raw response text.
pub async fn generate_with_fallback(
    llm: &dyn GenerativeModel,
    models: &ModelPair,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, LlmError> {
    let config = GenerationConfig::default();
    let mut state = AttemptState::Attempting {
        model: ModelChoice::Primary,
        failures: 0,
    };

    loop {
        state = match state {
            AttemptState::Attempting { model, failures } => {
                let name = models.name(model);
                match llm.generate(name, prompt, &config).await {
                    Ok(text) => AttemptState::Success(text),
                    Err(err) => {
                        let failures = failures + 1;
                        match on_failure(model, failures, &err, policy) {
                            Transition::Fail => {
                                warn!("Model {name} failed after {failures} attempt(s): {err}");
                                AttemptState::Failed(err)
                            }
                            Transition::Retry { model: next, delay } => {
                                let next_name = models.name(next);
                                match delay {
                                    Some(delay) => {
                                        warn!(
                                            "Model {name} overloaded (attempt {failures}), retrying {next_name} after {}ms...",
                                            delay.as_millis()
                                        );
                                        tokio::time::sleep(delay).await;
                                    }
                                    None => info!(
                                        "Model {name} overloaded, switching to fallback model {next_name}"
                                    ),
                                }
                                AttemptState::Attempting {
                                    model: next,
                                    failures,
                                }
                            }
                        }
                    }
                }
            }
            AttemptState::Success(text) => return Ok(text),
            AttemptState::Failed(err) => return Err(err),
        };
    }
}
