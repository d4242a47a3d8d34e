//! Blocking entry point for synchronous callers
//!
//! Each call runs the orchestrator on a dedicated thread with its own
//! current-thread runtime, so it works the same whether or not the caller
//! is already inside a tokio runtime.

use crate::config::Config;
use crate::error::Result;
use crate::model::{ClassificationRequest, ClassificationResult, ProviderId};
use crate::orchestrator::{timeout_result, Orchestrator};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Classify `content` and block until a result is available or `timeout` elapses
///
/// Only an invalid request is returned as `Err`; every other failure is
/// reported as an `error`-classified result.
pub fn classify_blocking(
    orchestrator: Arc<Orchestrator>,
    content: impl Into<String>,
    preferred: ProviderId,
    timeout: Duration,
) -> Result<ClassificationResult> {
    let request = ClassificationRequest::new(content, preferred)?;
    let (tx, rx) = mpsc::channel();

    let spawned = std::thread::Builder::new()
        .name("veritas-classify".to_string())
        .spawn(move || {
            let result = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(async {
                    tokio::time::timeout(timeout, orchestrator.classify(&request))
                        .await
                        .unwrap_or_else(|_| timeout_result(timeout))
                }),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build classification runtime");
                    ClassificationResult::error(format!("Failed to start async runtime: {}", e))
                }
            };
            // The caller may have given up already
            let _ = tx.send(result);
        });

    if let Err(e) = spawned {
        tracing::error!(error = %e, "Failed to spawn classification worker");
        return Ok(ClassificationResult::error(format!(
            "Failed to spawn classification worker: {}",
            e
        )));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => Ok(result),
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Blocking classification timed out");
            Ok(timeout_result(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Ok(ClassificationResult::error(
            "Classification worker exited without a result",
        )),
    }
}

/// Orchestrator plus the wall-clock budget applied to each blocking call
#[derive(Clone)]
pub struct BlockingClassifier {
    orchestrator: Arc<Orchestrator>,
    timeout: Duration,
}

impl BlockingClassifier {
    pub fn new(orchestrator: Arc<Orchestrator>, timeout: Duration) -> Self {
        Self {
            orchestrator,
            timeout,
        }
    }

    /// Build from configuration, using the request timeout as the budget
    pub fn from_config(config: &Config) -> Result<Self> {
        let orchestrator = Orchestrator::from_config(config)?;
        Ok(Self::new(
            Arc::new(orchestrator),
            config.classifier.request_timeout(),
        ))
    }

    pub fn classify(&self, content: &str, preferred: ProviderId) -> Result<ClassificationResult> {
        classify_blocking(Arc::clone(&self.orchestrator), content, preferred, self.timeout)
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
