//! Human-in-the-loop DOM reconnaissance over the Chrome DevTools Protocol
//!
//! This crate drives a real browser session that a human logs into manually,
//! then probes the live page structure for UI elements whose selectors are
//! not documented. Lookups are presence-waited and typed (found / absent /
//! query error) so a run can observe and report instead of crashing.

use std::sync::Arc;

use tracing::instrument;

pub mod backend;
pub mod cdp;
pub mod element;
pub mod errors;
pub mod locator;
pub mod probe;
pub mod report;
pub mod selector;
pub mod staticdom;
#[cfg(test)]
mod tests;

pub use backend::{DomBackend, DomElementImpl};
pub use cdp::LaunchOptions;
pub use element::{DomElement, ElementSummary};
pub use errors::ScoutError;
pub use locator::Locator;
pub use probe::{Probe, ProbePlan, ProbeSet};
pub use report::{Finding, InspectionReport, SummarySelectors};
pub use selector::Selector;

/// Before/after count of elements matching one selector, observed around a
/// click that is expected to mutate the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomDelta {
    pub before: usize,
    pub after: usize,
}

impl DomDelta {
    pub fn grew(&self) -> bool {
        self.after > self.before
    }
}

/// The main entry point for page inspection
pub struct Session {
    backend: Arc<dyn DomBackend>,
}

impl Session {
    /// Launch an automated Chromium instance and attach to a fresh page.
    ///
    /// This is the only operation whose failure aborts a run; everything
    /// downstream degrades to typed probe outcomes.
    pub async fn launch(opts: LaunchOptions) -> Result<Self, ScoutError> {
        let backend: Arc<dyn DomBackend> = cdp::CdpBackend::launch(opts).await?;
        Ok(Self { backend })
    }

    /// Attach to an already-built backend, e.g. a fixture page.
    pub fn from_backend(backend: Arc<dyn DomBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn DomBackend> {
        &self.backend
    }

    #[instrument(skip(self, selector))]
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.backend.clone(), selector.into())
    }

    /// Single query, no wait.
    pub async fn find_all(
        &self,
        selector: impl Into<Selector>,
    ) -> Result<Vec<DomElement>, ScoutError> {
        self.backend.find_all(&selector.into()).await
    }

    /// Number of current matches for a selector.
    pub async fn count(&self, selector: &Selector) -> Result<usize, ScoutError> {
        Ok(self.backend.find_all(selector).await?.len())
    }

    pub async fn current_url(&self) -> Result<String, ScoutError> {
        self.backend.current_url().await
    }

    #[instrument(skip(self))]
    pub async fn goto(&self, url: &str) -> Result<(), ScoutError> {
        self.backend.goto(url).await
    }

    /// Release the browser session. Callers invoke this on every exit path.
    #[instrument(skip(self))]
    pub async fn close(&self) -> Result<(), ScoutError> {
        self.backend.close().await
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}
