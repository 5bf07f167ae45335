use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ScoutError;

/// One recorded observation about discovered DOM structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub finding_type: String,
    /// Human-readable DOM path description, built from one of the
    /// [`body_div_link_location`] / [`radix_menu_link_location`] templates.
    pub location: String,
    /// Observed link text.
    pub text: String,
    /// Observed value of the `download` attribute, empty when absent.
    pub download_attr: String,
}

impl Finding {
    /// A download link discovered in a late-inserted `body > div` container.
    pub fn download_link(div_index: usize, text: String, download_attr: String) -> Self {
        Self {
            finding_type: "download_link".to_string(),
            location: body_div_link_location(div_index),
            text,
            download_attr,
        }
    }

    /// A link discovered inside a radix menu container.
    pub fn menu_link(radix_id: &str, text: String, download_attr: String) -> Self {
        Self {
            finding_type: "menu_link".to_string(),
            location: radix_menu_link_location(radix_id),
            text,
            download_attr,
        }
    }
}

/// Location template for links found under the N-th direct `<body>` child
/// (1-based).
pub fn body_div_link_location(div_index: usize) -> String {
    format!("body > div[{div_index}] > a")
}

/// Location template for links found inside a radix menu container.
pub fn radix_menu_link_location(radix_id: &str) -> String {
    format!("radix menu #{radix_id} > a")
}

/// The fixed selector-description strings summarizing where things were
/// found in a run. Keys and wording are part of the report shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySelectors {
    pub artifact_selector: String,
    pub panel_selector: String,
    pub dropdown_button: String,
    pub download_link_location: String,
    pub download_link_attributes: String,
}

impl Default for SummarySelectors {
    fn default() -> Self {
        Self {
            artifact_selector: r#"button[aria-label="Preview contents"]"#.to_string(),
            panel_selector: r#"[class*="basis-0"] or /html/body/div[4]/div[2]/div/div[3]"#
                .to_string(),
            dropdown_button: "Second button with radix ID and SVG in panel".to_string(),
            download_link_location: "body > div[N] > a (where N is one of the last few divs)"
                .to_string(),
            download_link_attributes: r#"href contains "blob:" and has download attribute"#
                .to_string(),
        }
    }
}

/// The one durable artifact of a run: a debugging snapshot, not a versioned
/// interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub timestamp: String,
    pub url: String,
    pub findings: Vec<Finding>,
    pub summary: SummarySelectors,
}

impl InspectionReport {
    pub fn new(url: String, findings: Vec<Finding>, summary: SummarySelectors) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            url,
            findings,
            summary,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ScoutError> {
        let buf = serde_json::to_vec_pretty(self)
            .map_err(|e| ScoutError::Io(format!("serializing report: {e}")))?;
        std::fs::write(path, buf)
            .map_err(|e| ScoutError::Io(format!("{}: {e}", path.display())))
    }
}
