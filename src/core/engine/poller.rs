//! Polls an execution record until the run settles or the budget runs out.

use super::client::ExecutionApi;
use super::execution::ExecutionPhase;
use super::extract::{extract_execution_error, extract_execution_output};
use crate::error::PollError;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct ExecutionPoller {
    api: Arc<dyn ExecutionApi>,
    settings: PollSettings,
}

impl ExecutionPoller {
    pub fn new(api: Arc<dyn ExecutionApi>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Resolve an execution to its reply text.
    ///
    /// A failing status query consumes an attempt but never aborts the loop.
    pub async fn poll(&self, execution_id: &str) -> Result<String, PollError> {
        let PollSettings {
            max_attempts,
            interval,
            timeout,
        } = self.settings;
        let started = Instant::now();
        let mut attempts = 0;

        tracing::info!(
            execution_id,
            max_attempts,
            interval_ms = duration_ms(interval),
            "polling execution"
        );

        while attempts < max_attempts {
            if started.elapsed() > timeout {
                return Err(PollError::TimedOut {
                    execution_id: execution_id.to_string(),
                    timeout_ms: duration_ms(timeout),
                });
            }

            attempts += 1;

            match self.api.get_execution(execution_id).await {
                Ok(record) => {
                    tracing::debug!(
                        execution_id,
                        attempt = attempts,
                        status = record.status.as_str(),
                        finished = record.finished,
                        "execution status"
                    );

                    match record.phase() {
                        ExecutionPhase::Succeeded => {
                            return match extract_execution_output(&record) {
                                Some(output) => {
                                    tracing::info!(
                                        execution_id,
                                        attempts,
                                        output_len = output.len(),
                                        "execution succeeded"
                                    );
                                    Ok(output)
                                }
                                None => {
                                    tracing::warn!(
                                        execution_id,
                                        "execution succeeded but produced no output"
                                    );
                                    Err(PollError::NoOutput {
                                        execution_id: execution_id.to_string(),
                                    })
                                }
                            };
                        }
                        ExecutionPhase::Failed => {
                            let message = extract_execution_error(&record)
                                .unwrap_or_else(|| "Workflow execution failed".to_string());
                            tracing::error!(execution_id, error = %message, "execution failed");
                            return Err(PollError::ExecutionFailed {
                                execution_id: execution_id.to_string(),
                                message,
                            });
                        }
                        ExecutionPhase::Canceled => {
                            return Err(PollError::Canceled {
                                execution_id: execution_id.to_string(),
                            });
                        }
                        ExecutionPhase::InProgress => {}
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        execution_id,
                        attempt = attempts,
                        error = %error,
                        "status query failed, continuing"
                    );
                }
            }

            if attempts < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(PollError::AttemptsExhausted {
            execution_id: execution_id.to_string(),
            attempts: max_attempts,
        })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
