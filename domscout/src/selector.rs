use std::fmt;

/// Represents ways to locate a DOM element on the inspected page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by CSS selector
    Css(String),
    /// Select by absolute or relative XPath query
    XPath(String),
    /// Select by exact (trimmed) text content
    Text(String),
    /// Select by `aria-label` attribute value
    AriaLabel(String),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl Selector {
    /// CSS selector equivalent, where one exists. `AriaLabel` is sugar for
    /// an attribute selector; `XPath` and `Text` have no CSS form.
    pub fn as_css(&self) -> Option<String> {
        match self {
            Selector::Css(s) => Some(s.clone()),
            Selector::AriaLabel(label) => Some(format!("[aria-label=\"{label}\"]")),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(s) => write!(f, "{s}"),
            Selector::XPath(s) => write!(f, "xpath:{s}"),
            Selector::Text(s) => write!(f, "text:{s}"),
            Selector::AriaLabel(s) => write!(f, "aria:{s}"),
            Selector::Invalid(reason) => write!(f, "invalid:{reason}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed {
            _ if trimmed.is_empty() => {
                Selector::Invalid("empty selector string".to_string())
            }
            _ if trimmed.starts_with("css:") => Selector::Css(trimmed[4..].trim().to_string()),
            _ if trimmed.starts_with("xpath:") => {
                Selector::XPath(trimmed[6..].trim().to_string())
            }
            _ if trimmed.starts_with("text:") => Selector::Text(trimmed[5..].to_string()),
            _ if trimmed.starts_with("aria:") => {
                Selector::AriaLabel(trimmed[5..].trim().to_string())
            }
            // A leading slash can only be an absolute XPath
            _ if trimmed.starts_with('/') => Selector::XPath(trimmed.to_string()),
            // Bare `#id`, tag names, attribute selectors and the rest are CSS
            _ => Selector::Css(trimmed.to_string()),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}
