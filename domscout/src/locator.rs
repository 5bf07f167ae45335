use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::backend::DomBackend;
use crate::element::DomElement;
use crate::errors::ScoutError;
use crate::selector::Selector;

// Default deadline if none is specified on the locator itself
const DEFAULT_LOCATOR_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A high-level API for finding elements with presence-based waits.
///
/// Waits poll the backend until a match appears or the deadline passes;
/// there are no fixed sleeps anywhere in the lookup path.
#[derive(Clone)]
pub struct Locator {
    backend: Arc<dyn DomBackend>,
    selector: Selector,
    timeout: Duration, // Default deadline for this locator instance
    poll_interval: Duration,
}

impl Locator {
    /// Create a new locator with the given selector
    pub(crate) fn new(backend: Arc<dyn DomBackend>, selector: Selector) -> Self {
        Self {
            backend,
            selector,
            timeout: DEFAULT_LOCATOR_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set a default deadline for waiting operations on this locator
    /// instance. Used when no specific timeout is passed to a wait method.
    pub fn set_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get all elements matching this locator with a single query, no wait.
    pub async fn all(&self) -> Result<Vec<DomElement>, ScoutError> {
        self.backend.find_all(&self.selector).await
    }

    /// Wait for at least one matching element, returning the first.
    /// If no timeout is provided, uses the locator's default timeout.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<DomElement, ScoutError> {
        let mut elements = self.wait_all(timeout).await?;
        Ok(elements.remove(0))
    }

    /// Wait for the match set to become non-empty, up to the deadline.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait_all(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Vec<DomElement>, ScoutError> {
        let effective_timeout = timeout.unwrap_or(self.timeout);
        debug!(
            selector = %self.selector,
            timeout_ms = effective_timeout.as_millis() as u64,
            "waiting for element presence"
        );

        let deadline = tokio::time::Instant::now() + effective_timeout;
        let mut last_error: Option<ScoutError> = None;
        loop {
            match self.backend.find_all(&self.selector).await {
                Ok(elements) if !elements.is_empty() => return Ok(elements),
                Ok(_) => last_error = None,
                // A transient query failure should not end the wait early;
                // it is reported only if the deadline passes.
                Err(err) => last_error = Some(err),
            }

            if tokio::time::Instant::now() >= deadline {
                let detail = match last_error {
                    Some(err) => format!("last query error: {err}"),
                    None => "no matching element appeared".to_string(),
                };
                return Err(ScoutError::Timeout(format!(
                    "waited {effective_timeout:?} for {:?} ({detail})",
                    self.selector.to_string()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Wait until `condition` holds over the current match set, up to the
    /// deadline. Returns whether the condition was observed.
    pub async fn wait_for(
        &self,
        timeout: Option<Duration>,
        condition: impl Fn(&[DomElement]) -> bool,
    ) -> Result<bool, ScoutError> {
        let effective_timeout = timeout.unwrap_or(self.timeout);
        let deadline = tokio::time::Instant::now() + effective_timeout;
        loop {
            if let Ok(elements) = self.backend.find_all(&self.selector).await {
                if condition(&elements) {
                    return Ok(true);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
