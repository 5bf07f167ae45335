use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::DomElementImpl;
use crate::errors::ScoutError;
use crate::selector::Selector;

/// Represents a located element on the inspected page
#[derive(Clone)]
pub struct DomElement {
    inner: Arc<dyn DomElementImpl>,
}

impl fmt::Debug for DomElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomElement").finish_non_exhaustive()
    }
}

fn is_empty_string(s: &Option<String>) -> bool {
    match s {
        Some(s) => s.trim().is_empty(),
        None => true,
    }
}

/// Snapshot of the attributes the console prints for one element.
///
/// This carries no live handle and only exists to be formatted or
/// serialized; interaction always goes through [`DomElement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSummary {
    #[serde(skip_serializing_if = "is_empty_string")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "is_empty_string")]
    pub aria_label: Option<String>,
    pub has_svg: bool,
}

impl fmt::Display for ElementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id='{}', text='{}', aria='{}', svg={}",
            self.id.as_deref().unwrap_or("no-id"),
            if self.text.is_empty() {
                "no-text"
            } else {
                self.text.as_str()
            },
            self.aria_label.as_deref().unwrap_or("no-aria-label"),
            self.has_svg,
        )
    }
}

impl DomElement {
    pub fn new(inner: Arc<dyn DomElementImpl>) -> Self {
        Self { inner }
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>, ScoutError> {
        self.inner.attribute(name).await
    }

    pub async fn id(&self) -> Result<Option<String>, ScoutError> {
        self.inner.attribute("id").await
    }

    pub async fn aria_label(&self) -> Result<Option<String>, ScoutError> {
        self.inner.attribute("aria-label").await
    }

    pub async fn href(&self) -> Result<Option<String>, ScoutError> {
        self.inner.attribute("href").await
    }

    /// Value of the `download` attribute, empty string when absent.
    pub async fn download_attr(&self) -> Result<String, ScoutError> {
        Ok(self.inner.attribute("download").await?.unwrap_or_default())
    }

    /// Trimmed text content.
    pub async fn text(&self) -> Result<String, ScoutError> {
        self.inner.text().await
    }

    pub async fn click(&self) -> Result<(), ScoutError> {
        self.inner.click().await
    }

    /// Run a selector scoped to this element's subtree.
    pub async fn find_all(
        &self,
        selector: impl Into<Selector>,
    ) -> Result<Vec<DomElement>, ScoutError> {
        self.inner.find_all(&selector.into()).await
    }

    /// Whether the element contains an `<svg>` descendant.
    pub async fn has_svg(&self) -> Result<bool, ScoutError> {
        Ok(!self.find_all("svg").await?.is_empty())
    }

    /// Best-effort summary of the attributes the console prints; lookup
    /// failures degrade to absent fields rather than erroring.
    pub async fn summarize(&self) -> ElementSummary {
        ElementSummary {
            id: self.id().await.ok().flatten(),
            text: self.text().await.unwrap_or_default(),
            aria_label: self.aria_label().await.ok().flatten(),
            has_svg: self.has_svg().await.unwrap_or(false),
        }
    }
}
