use async_trait::async_trait;

use crate::element::DomElement;
use crate::errors::ScoutError;
use crate::selector::Selector;

/// Query surface of an inspected page.
///
/// The production implementation drives a live Chromium tab over CDP
/// ([`crate::cdp::CdpBackend`]); [`crate::staticdom::StaticDom`] serves a
/// fixed in-memory tree so probe flows can be replayed deterministically
/// without a browser.
#[async_trait]
pub trait DomBackend: Send + Sync {
    /// Run the selector against the whole document and return every match.
    ///
    /// An empty vector means the query ran and matched nothing; an error
    /// means the query itself could not be executed.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<DomElement>, ScoutError>;

    /// URL of the page currently loaded in the session.
    async fn current_url(&self) -> Result<String, ScoutError>;

    /// Navigate the session to a URL.
    async fn goto(&self, url: &str) -> Result<(), ScoutError>;

    /// Release the underlying session. Must be safe to call exactly once on
    /// every exit path of a run.
    async fn close(&self) -> Result<(), ScoutError>;
}

/// Backend-specific behavior of a single located element.
#[async_trait]
pub trait DomElementImpl: Send + Sync {
    async fn attribute(&self, name: &str) -> Result<Option<String>, ScoutError>;

    /// Trimmed text content of the element.
    async fn text(&self) -> Result<String, ScoutError>;

    async fn click(&self) -> Result<(), ScoutError>;

    /// Run the selector scoped to this element's subtree.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<DomElement>, ScoutError>;
}
