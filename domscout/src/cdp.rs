//! Live-browser backend over the Chrome DevTools Protocol.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{DomBackend, DomElementImpl};
use crate::element::DomElement;
use crate::errors::ScoutError;
use crate::selector::Selector;

/// Options for launching the automated Chromium instance.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Launch without a window. The default is head-ful: a human is
    /// expected to log in and navigate in the opened window.
    pub headless: bool,
    /// Explicit Chrome/Chromium executable; autodetected when unset.
    pub chrome_executable: Option<PathBuf>,
    pub window_size: (u32, u32),
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: false,
            chrome_executable: None,
            window_size: (1440, 900),
        }
    }
}

/// A launched browser plus the one page the inspection drives.
///
/// The CDP handler stream is pumped by a background task for the lifetime
/// of the session; [`CdpBackend::close`] shuts down the page, the browser
/// process and the handler task.
pub struct CdpBackend {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler_task: Mutex<Option<JoinHandle<()>>>,
}

impl CdpBackend {
    pub async fn launch(opts: LaunchOptions) -> Result<Arc<Self>, ScoutError> {
        let mut builder = BrowserConfig::builder()
            .viewport(None)
            .window_size(opts.window_size.0, opts.window_size.1)
            // Keep the page from advertising the automation session
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars");
        if !opts.headless {
            builder = builder.with_head();
        }
        if let Some(exe) = &opts.chrome_executable {
            builder = builder.chrome_executable(exe.clone());
        }
        let config = builder.build().map_err(ScoutError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScoutError::Launch(e.to_string()))?;
        info!("browser launched");

        // The CDP websocket goes quiet unless something drains the handler.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler stream ended");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScoutError::Session(format!("opening initial page: {e}")))?;

        Ok(Arc::new(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler_task: Mutex::new(Some(handler_task)),
        }))
    }

    fn wrap(elements: Vec<Element>) -> Vec<DomElement> {
        elements
            .into_iter()
            .map(|element| DomElement::new(Arc::new(CdpElement { element })))
            .collect()
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<Element>, ScoutError> {
        match selector {
            Selector::Css(css) => self
                .page
                .find_elements(css.clone())
                .await
                .map_err(|e| ScoutError::QueryFailed(format!("{selector}: {e}"))),
            Selector::AriaLabel(label) => self
                .page
                .find_elements(format!("[aria-label=\"{label}\"]"))
                .await
                .map_err(|e| ScoutError::QueryFailed(format!("{selector}: {e}"))),
            Selector::XPath(xpath) => self
                .page
                .find_xpaths(xpath.clone())
                .await
                .map_err(|e| ScoutError::QueryFailed(format!("{selector}: {e}"))),
            Selector::Text(text) => {
                let xpath = text_xpath(text)?;
                self.page
                    .find_xpaths(xpath)
                    .await
                    .map_err(|e| ScoutError::QueryFailed(format!("{selector}: {e}")))
            }
            Selector::Invalid(reason) => Err(ScoutError::InvalidSelector(reason.clone())),
        }
    }
}

#[async_trait]
impl DomBackend for CdpBackend {
    async fn find_all(&self, selector: &Selector) -> Result<Vec<DomElement>, ScoutError> {
        Ok(Self::wrap(self.query(selector).await?))
    }

    async fn current_url(&self) -> Result<String, ScoutError> {
        self.page
            .url()
            .await
            .map_err(|e| ScoutError::Session(format!("reading page url: {e}")))
            .map(|url| url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn goto(&self, url: &str) -> Result<(), ScoutError> {
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| ScoutError::Session(format!("navigating to {url}: {e}")))
    }

    async fn close(&self) -> Result<(), ScoutError> {
        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(e) = browser.close().await {
                warn!("error closing browser: {e}");
            }
            let _ = browser.wait().await;
        }
        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }
        info!("browser session closed");
        Ok(())
    }
}

/// XPath form of an exact-text query. Only plain quoting is supported; a
/// needle containing both quote kinds cannot be expressed in XPath 1.0.
fn text_xpath(text: &str) -> Result<String, ScoutError> {
    if !text.contains('"') {
        Ok(format!("//*[normalize-space(text())=\"{text}\"]"))
    } else if !text.contains('\'') {
        Ok(format!("//*[normalize-space(text())='{text}']"))
    } else {
        Err(ScoutError::InvalidSelector(format!(
            "text selector mixes both quote kinds: {text}"
        )))
    }
}

struct CdpElement {
    element: Element,
}

#[async_trait]
impl DomElementImpl for CdpElement {
    async fn attribute(&self, name: &str) -> Result<Option<String>, ScoutError> {
        self.element
            .attribute(name)
            .await
            .map_err(|e| ScoutError::QueryFailed(format!("attribute {name}: {e}")))
    }

    async fn text(&self) -> Result<String, ScoutError> {
        self.element
            .inner_text()
            .await
            .map_err(|e| ScoutError::QueryFailed(format!("inner text: {e}")))
            .map(|text| text.unwrap_or_default().trim().to_string())
    }

    async fn click(&self) -> Result<(), ScoutError> {
        self.element
            .click()
            .await
            .map(|_| ())
            .map_err(|e| ScoutError::Session(format!("click failed: {e}")))
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<DomElement>, ScoutError> {
        match selector.as_css() {
            Some(css) => self
                .element
                .find_elements(css)
                .await
                .map(CdpBackend::wrap)
                .map_err(|e| ScoutError::QueryFailed(format!("{selector}: {e}"))),
            None => Err(ScoutError::QueryFailed(format!(
                "{selector}: only CSS selectors can be scoped to an element"
            ))),
        }
    }
}
