use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::DomBackend;
use crate::element::DomElement;
use crate::errors::ScoutError;
use crate::selector::Selector;

/// Typed outcome of one lookup, so callers can tell "element absent" apart
/// from "query failed". Lookup failures are values, not propagated errors.
#[derive(Debug)]
pub enum Probe {
    /// At least one element matched; carries the selector that won.
    Found {
        selector: Selector,
        elements: Vec<DomElement>,
    },
    /// Every query ran and matched nothing.
    Absent,
    /// A query could not be executed.
    QueryError(String),
}

impl Probe {
    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            Probe::Found { elements, .. } => elements.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First matched element, if any.
    pub fn first(&self) -> Option<&DomElement> {
        match self {
            Probe::Found { elements, .. } => elements.first(),
            _ => None,
        }
    }

    pub fn into_elements(self) -> Vec<DomElement> {
        match self {
            Probe::Found { elements, .. } => elements,
            _ => Vec::new(),
        }
    }
}

/// An ordered list of selector guesses for one probe target.
///
/// Guesses are tried in priority order and the first non-empty result wins;
/// there is no scoring or confidence. A guess whose query fails is skipped,
/// and the failure is reported only when no later guess matches anything.
#[derive(Debug, Clone)]
pub struct ProbePlan {
    target: String,
    selectors: Vec<Selector>,
    poll_interval: Duration,
}

impl ProbePlan {
    pub fn new(target: impl Into<String>, selectors: Vec<Selector>) -> Self {
        Self {
            target: target.into(),
            selectors,
            poll_interval: Duration::from_millis(100),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Try every guess once, in order.
    pub async fn run(&self, backend: &Arc<dyn DomBackend>) -> Probe {
        let mut errors: Vec<String> = Vec::new();
        for selector in &self.selectors {
            match backend.find_all(selector).await {
                Ok(elements) if !elements.is_empty() => {
                    debug!(probe = %self.target, selector = %selector, matches = elements.len(), "probe hit");
                    return Probe::Found {
                        selector: selector.clone(),
                        elements,
                    };
                }
                Ok(_) => {
                    debug!(probe = %self.target, selector = %selector, "probe miss");
                }
                Err(err) => {
                    debug!(probe = %self.target, selector = %selector, error = %err, "probe query failed");
                    errors.push(format!("{selector}: {err}"));
                }
            }
        }
        if errors.is_empty() {
            Probe::Absent
        } else {
            Probe::QueryError(format!("{}: {}", self.target, errors.join("; ")))
        }
    }

    /// Poll the whole plan until a guess matches or the deadline passes.
    /// An `Absent`/`QueryError` outcome is only final at the deadline.
    pub async fn run_until(&self, backend: &Arc<dyn DomBackend>, timeout: Duration) -> Probe {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let outcome = self.run(backend).await;
            if outcome.is_found() || tokio::time::Instant::now() >= deadline {
                return outcome;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn to_selectors(raw: &[String]) -> Vec<Selector> {
    raw.iter().map(|s| Selector::from(s.as_str())).collect()
}

/// The selector guesses and scan knobs for one inspection run.
///
/// Defaults reproduce the built-in guesses; a JSON file with the same shape
/// can override any of them without a code change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSet {
    /// Guesses for the artifact preview buttons in the conversation.
    pub artifact_buttons: Vec<String>,
    /// Guesses for the artifact panel, attribute selector first, then the
    /// positional structural path.
    pub panel: Vec<String>,
    /// Guesses for the panel close button.
    pub close_button: Vec<String>,
    /// Direct children of `<body>`, scanned for late-inserted containers.
    pub body_children: String,
    /// Containers following the Radix id naming convention.
    pub radix_elements: String,
    /// Generic menu containers.
    pub menus: String,
    /// How many trailing `body > div` children to scan for links.
    pub body_div_window: usize,
    /// How many link-bearing radix containers to report per dropdown.
    pub radix_report_cap: usize,
    /// How often waiting scans re-query the page, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ProbeSet {
    fn default() -> Self {
        Self {
            artifact_buttons: vec![r#"button[aria-label="Preview contents"]"#.to_string()],
            panel: vec![
                r#"[class*="basis-0"]"#.to_string(),
                "/html/body/div[4]/div[2]/div/div[3]".to_string(),
            ],
            close_button: vec![r#"button[aria-label="Close"]"#.to_string()],
            body_children: "body > div".to_string(),
            radix_elements: r#"[id^="radix-"]"#.to_string(),
            menus: r#"[role="menu"]"#.to_string(),
            body_div_window: 5,
            radix_report_cap: 3,
            poll_interval_ms: 100,
        }
    }
}

impl ProbeSet {
    /// Load an override file (JSON, same field names as the defaults).
    pub fn from_path(path: &Path) -> Result<Self, ScoutError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScoutError::Io(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| ScoutError::InvalidArgument(format!("{}: {e}", path.display())))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn artifact_buttons_plan(&self) -> ProbePlan {
        ProbePlan::new("artifact buttons", to_selectors(&self.artifact_buttons))
            .with_poll_interval(self.poll_interval())
    }

    pub fn panel_plan(&self) -> ProbePlan {
        ProbePlan::new("artifact panel", to_selectors(&self.panel))
            .with_poll_interval(self.poll_interval())
    }

    pub fn close_button_plan(&self) -> ProbePlan {
        ProbePlan::new("panel close button", to_selectors(&self.close_button))
            .with_poll_interval(self.poll_interval())
    }

    pub fn body_children_selector(&self) -> Selector {
        Selector::from(self.body_children.as_str())
    }

    pub fn radix_selector(&self) -> Selector {
        Selector::from(self.radix_elements.as_str())
    }

    pub fn menus_selector(&self) -> Selector {
        Selector::from(self.menus.as_str())
    }
}
