//! The interactive inspection flow: launch, wait for the human, probe the
//! artifact UI layer by layer, write the report, release the browser.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use domscout::{
    DomDelta, DomElement, Finding, InspectionReport, Probe, ProbeSet, Session, SummarySelectors,
};

// How long a dropdown gets to render after its trigger is clicked, and how
// long a closed panel gets to disappear.
const DROPDOWN_WAIT: Duration = Duration::from_secs(3);
const PANEL_CLOSE_WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Page to open right after launch; the human still logs in manually.
    pub url: Option<String>,
    pub output: PathBuf,
    /// Deadline for each element wait.
    pub wait_timeout: Duration,
    /// Deadline for a clicked dropdown to insert its menu.
    pub dropdown_wait: Duration,
    /// Deadline for a closed panel to leave the page.
    pub panel_close_wait: Duration,
    /// Cap on how many artifact panels one run inspects.
    pub max_artifacts: usize,
    /// Skip the two stdin pauses (fixture runs).
    pub assume_yes: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            url: None,
            output: PathBuf::from("dom-inspection-report.json"),
            wait_timeout: Duration::from_secs(10),
            dropdown_wait: DROPDOWN_WAIT,
            panel_close_wait: PANEL_CLOSE_WAIT,
            max_artifacts: 2,
            assume_yes: false,
        }
    }
}

/// Which artifact indexes to open: the first, then one more if the page has
/// more than one, capped by the configured maximum.
pub fn plan_inspections(buttons_found: usize, max_artifacts: usize) -> Vec<usize> {
    (0..buttons_found.min(max_artifacts)).collect()
}

/// Drives one human-in-the-loop inspection run over a session.
pub struct Inspector {
    session: Session,
    probes: ProbeSet,
    opts: InspectOptions,
    findings: Vec<Finding>,
}

impl Inspector {
    pub fn new(session: Session, probes: ProbeSet, opts: InspectOptions) -> Self {
        Self {
            session,
            probes,
            opts,
            findings: Vec::new(),
        }
    }

    /// Run the full inspection. The session is released on every exit path,
    /// whether the run completed or failed.
    pub async fn run(mut self) -> Result<()> {
        let outcome = self.run_inner().await;
        if let Err(err) = self.session.close().await {
            warn!("error releasing browser session: {err}");
        }
        outcome
    }

    async fn run_inner(&mut self) -> Result<()> {
        if let Some(url) = self.opts.url.clone() {
            match self.session.goto(&url).await {
                Ok(()) => println!("✅ Opened {url}"),
                Err(err) => println!("❌ Could not open {url}: {err}"),
            }
        }

        self.pause(
            "\n⏸️  Please:\n1. Log into the target app\n2. Navigate to a conversation WITH artifacts\n3. Press ENTER when ready...",
        )
        .await?;

        let buttons = self.find_artifact_buttons().await;
        println!("\n📦 Found {} artifact buttons", buttons.len());

        let plan = plan_inspections(buttons.len(), self.opts.max_artifacts);
        if plan.is_empty() {
            println!("❌ No artifacts found. Navigate to a conversation with artifacts next time.");
        }
        for index in plan {
            self.inspect_artifact_panel(index).await;
            self.close_panel().await;
        }

        self.save_report().await?;

        self.pause("\n⏸️  Inspection complete. Press ENTER to close the browser...")
            .await?;
        Ok(())
    }

    /// Locate the artifact preview buttons, waiting for the page to settle.
    async fn find_artifact_buttons(&self) -> Vec<DomElement> {
        match self
            .probes
            .artifact_buttons_plan()
            .run_until(self.session.backend(), self.opts.wait_timeout)
            .await
        {
            Probe::Found { elements, .. } => elements,
            Probe::Absent => Vec::new(),
            Probe::QueryError(reason) => {
                println!("❌ Error finding artifact buttons: {reason}");
                Vec::new()
            }
        }
    }

    /// Click artifact `index` and inspect the opened panel.
    async fn inspect_artifact_panel(&mut self, index: usize) {
        // Re-query: opening and closing panels can re-render the buttons,
        // invalidating handles from the previous pass.
        let buttons = match self
            .probes
            .artifact_buttons_plan()
            .run(self.session.backend())
            .await
        {
            Probe::Found { elements, .. } => elements,
            Probe::Absent => Vec::new(),
            Probe::QueryError(reason) => {
                println!("❌ Error finding artifact buttons: {reason}");
                return;
            }
        };
        let Some(button) = buttons.get(index) else {
            println!("❌ No button at index {index}");
            return;
        };

        println!("\n🔍 Inspecting artifact {}/{}", index + 1, buttons.len());

        if let Err(err) = button.click().await {
            println!("❌ Could not click artifact button: {err}");
            return;
        }

        let panel = match self
            .probes
            .panel_plan()
            .run_until(self.session.backend(), self.opts.wait_timeout)
            .await
        {
            Probe::Found { selector, mut elements } => {
                println!("✅ Found artifact panel (matched {selector})");
                elements.remove(0)
            }
            Probe::Absent => {
                println!("❌ Artifact panel not found");
                return;
            }
            Probe::QueryError(reason) => {
                println!("❌ Artifact panel lookup failed: {reason}");
                return;
            }
        };

        let panel_buttons = match panel.find_all("button").await {
            Ok(buttons) => buttons,
            Err(err) => {
                println!("❌ Could not enumerate panel buttons: {err}");
                return;
            }
        };
        println!("   Found {} buttons in panel:", panel_buttons.len());

        for (i, button) in panel_buttons.iter().enumerate() {
            let summary = button.summarize().await;
            println!("   Button {i}: {summary}");

            // The dropdown trigger is usually an svg-bearing button after
            // the Copy button.
            if i > 0 && summary.has_svg {
                self.inspect_dropdown(button).await;
            }
        }
    }

    /// Click a dropdown trigger and observe what the click inserts.
    async fn inspect_dropdown(&mut self, trigger: &DomElement) {
        let trigger_id = trigger
            .id()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| "no-id".to_string());
        println!("\n🎯 Clicking dropdown button: {trigger_id}");

        let body_sel = self.probes.body_children_selector();
        let radix_sel = self.probes.radix_selector();
        let body_before = self.session.count(&body_sel).await.unwrap_or(0);
        let radix_before = self.session.count(&radix_sel).await.unwrap_or(0);

        if let Err(err) = trigger.click().await {
            println!("❌ Could not click dropdown button: {err}");
            return;
        }

        // Wait for the click to insert something rather than sleeping a
        // fixed interval: either a new body-level container or a new radix
        // node counts as rendered.
        let deadline = tokio::time::Instant::now() + self.opts.dropdown_wait;
        let mut body_after = body_before;
        let mut radix_after = radix_before;
        loop {
            body_after = self.session.count(&body_sel).await.unwrap_or(body_after);
            radix_after = self.session.count(&radix_sel).await.unwrap_or(radix_after);
            if body_after > body_before
                || radix_after > radix_before
                || tokio::time::Instant::now() >= deadline
            {
                break;
            }
            tokio::time::sleep(self.probes.poll_interval()).await;
        }

        let body_delta = DomDelta {
            before: body_before,
            after: body_after,
        };
        let radix_delta = DomDelta {
            before: radix_before,
            after: radix_after,
        };
        println!("   body > div count: {} → {}", body_delta.before, body_delta.after);
        println!(
            "   radix elements: {} → {}",
            radix_delta.before, radix_delta.after
        );
        if !body_delta.grew() && !radix_delta.grew() {
            println!("   (no new containers appeared before the deadline)");
        }

        self.inspect_dropdown_locations().await;
    }

    /// Scan the places a detached dropdown menu is known to land.
    async fn inspect_dropdown_locations(&mut self) {
        println!("\n📍 Searching for dropdown menu:");

        // 1. Late-inserted direct children of <body>
        let body_divs = match self.session.find_all(self.probes.body_children_selector()).await {
            Ok(divs) => divs,
            Err(err) => {
                println!("   ❌ body children scan failed: {err}");
                Vec::new()
            }
        };
        println!("   Body has {} direct div children", body_divs.len());

        let start = body_divs.len().saturating_sub(self.probes.body_div_window);
        for (i, div) in body_divs.iter().enumerate().skip(start) {
            let links = match div.find_all("a").await {
                Ok(links) => links,
                Err(err) => {
                    debug!("link scan in body > div[{}] failed: {err}", i + 1);
                    continue;
                }
            };
            if links.is_empty() {
                continue;
            }
            println!("\n   ✅ Found links in body > div[{}]:", i + 1);
            for link in &links {
                let text = link.text().await.unwrap_or_default();
                let href = link.href().await.ok().flatten().unwrap_or_default();
                let download = link.download_attr().await.unwrap_or_default();
                println!(
                    "      Link: text='{text}', href='{}...', download='{download}'",
                    truncate(&href, 50)
                );

                // Record the pattern the tool exists to discover
                if href.contains("blob:") || !download.is_empty() {
                    self.findings
                        .push(Finding::download_link(i + 1, text, download));
                }
            }
        }

        // 2. Radix containers holding links
        match self.session.find_all(self.probes.radix_selector()).await {
            Ok(radix_elements) => {
                let mut with_links = Vec::new();
                for element in radix_elements {
                    match element.find_all("a").await {
                        Ok(links) if !links.is_empty() => with_links.push((element, links)),
                        Ok(_) => {}
                        Err(err) => debug!("link scan in radix element failed: {err}"),
                    }
                }
                if !with_links.is_empty() {
                    println!("\n   Found {} radix elements with links", with_links.len());
                    for (element, links) in with_links.iter().take(self.probes.radix_report_cap) {
                        let id = element
                            .id()
                            .await
                            .ok()
                            .flatten()
                            .unwrap_or_else(|| "no-id".to_string());
                        println!("   Radix element {id} has {} links", links.len());
                        for link in links {
                            let text = link.text().await.unwrap_or_default();
                            let download = link.download_attr().await.unwrap_or_default();
                            self.findings.push(Finding::menu_link(&id, text, download));
                        }
                    }
                }
            }
            Err(err) => println!("   ❌ radix scan failed: {err}"),
        }

        // 3. Generic menu containers, reported but not recorded
        match self.session.count(&self.probes.menus_selector()).await {
            Ok(0) => {}
            Ok(n) => println!("\n   Found {n} elements with role='menu'"),
            Err(err) => debug!("menu scan failed: {err}"),
        }
    }

    /// Close the artifact panel, preferring the Close button and falling
    /// back to clicking the page body.
    async fn close_panel(&self) {
        match self
            .probes
            .close_button_plan()
            .run(self.session.backend())
            .await
        {
            Probe::Found { elements, .. } => {
                if let Err(err) = elements[0].click().await {
                    debug!("close button click failed: {err}");
                }
            }
            outcome => {
                debug!("close button not available ({outcome:?}), clicking body");
                if let Ok(bodies) = self.session.find_all("body").await {
                    if let Some(body) = bodies.first() {
                        if let Err(err) = body.click().await {
                            debug!("body click failed: {err}");
                        }
                    }
                }
            }
        }

        // Give the panel a bounded window to disappear
        let plan = self.probes.panel_plan();
        let deadline = tokio::time::Instant::now() + self.opts.panel_close_wait;
        loop {
            if !plan.run(self.session.backend()).await.is_found()
                || tokio::time::Instant::now() >= deadline
            {
                break;
            }
            tokio::time::sleep(self.probes.poll_interval()).await;
        }
    }

    /// Serialize the accumulated findings. A write failure is the one
    /// post-launch error that fails the run.
    async fn save_report(&self) -> Result<()> {
        let url = self
            .session
            .current_url()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        let report =
            InspectionReport::new(url, self.findings.clone(), SummarySelectors::default());
        report
            .write_to(&self.opts.output)
            .with_context(|| format!("writing report to {}", self.opts.output.display()))?;
        println!("\n💾 Saved findings to {}", self.opts.output.display());
        Ok(())
    }

    async fn pause(&self, message: &str) -> Result<()> {
        if self.opts.assume_yes {
            return Ok(());
        }
        println!("{message}");
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
        })
        .await
        .context("waiting for operator input")?;
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_inspections_opens_the_first_then_one_more() {
        assert!(plan_inspections(0, 2).is_empty());
        assert_eq!(plan_inspections(1, 2), vec![0]);
        assert_eq!(plan_inspections(2, 2), vec![0, 1]);
        assert_eq!(plan_inspections(5, 2), vec![0, 1]);
    }

    #[test]
    fn plan_inspections_honors_the_cap() {
        assert_eq!(plan_inspections(5, 4), vec![0, 1, 2, 3]);
        assert!(plan_inspections(3, 0).is_empty());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("blob:https://x", 50), "blob:https://x");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ééééé", 2), "éé");
    }
}
