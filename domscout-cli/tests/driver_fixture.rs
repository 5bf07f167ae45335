//! Drives the full inspection flow against an in-memory fixture page, which
//! is the only way the flow can be exercised repeatably: the real target
//! page is live, undocumented and behind a login.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use domscout::staticdom::{StaticDom, StaticNode};
use domscout::{InspectionReport, ProbeSet, Session};
use domscout_cli::driver::{InspectOptions, Inspector};

/// A page shaped like the target app: two artifact preview buttons, a
/// preview panel whose second button carries an svg, a late body-level
/// overlay holding a blob download link, and a radix menu with another.
fn artifact_page() -> StaticNode {
    StaticNode::new("html").child(
        StaticNode::new("body")
            .child(
                StaticNode::new("div").attr("class", "conversation").children([
                    StaticNode::new("button")
                        .attr("aria-label", "Preview contents")
                        .text("artifact one"),
                    StaticNode::new("button")
                        .attr("aria-label", "Preview contents")
                        .text("artifact two"),
                ]),
            )
            .child(
                StaticNode::new("div")
                    .attr("class", "flex basis-0 grow")
                    .child(StaticNode::new("button").attr("id", "copy-btn").text("Copy"))
                    .child(
                        StaticNode::new("button")
                            .attr("id", "radix-42-trigger")
                            .child(StaticNode::new("svg")),
                    )
                    .child(StaticNode::new("button").attr("aria-label", "Close")),
            )
            .child(
                StaticNode::new("div").attr("class", "overlay").child(
                    StaticNode::new("a")
                        .attr("href", "blob:https://app.example/0f93d")
                        .attr("download", "artifact.txt")
                        .text("Download as file"),
                ),
            )
            .child(
                StaticNode::new("div")
                    .attr("id", "radix-42-content")
                    .attr("role", "menu")
                    .child(
                        StaticNode::new("a")
                            .attr("href", "blob:https://app.example/77aa1")
                            .attr("download", "artifact.md")
                            .text("Download as markdown"),
                    ),
            ),
    )
}

fn empty_page() -> StaticNode {
    StaticNode::new("html").child(
        StaticNode::new("body")
            .child(StaticNode::new("div").attr("class", "conversation").text("no artifacts here")),
    )
}

fn fast_options(output: &Path) -> InspectOptions {
    InspectOptions {
        output: output.to_path_buf(),
        wait_timeout: Duration::from_millis(200),
        dropdown_wait: Duration::from_millis(120),
        panel_close_wait: Duration::from_millis(120),
        assume_yes: true,
        ..Default::default()
    }
}

async fn run_fixture(page: StaticNode, output: &Path) -> (StaticDom, InspectionReport) {
    let dom = StaticDom::with_url(page, "https://app.example/chat/abc123");
    let session = Session::from_backend(Arc::new(dom.clone()));
    let inspector = Inspector::new(session, ProbeSet::default(), fast_options(output));
    inspector.run().await.unwrap();

    let raw = std::fs::read_to_string(output).unwrap();
    let report: InspectionReport = serde_json::from_str(&raw).unwrap();
    (dom, report)
}

#[tokio::test]
async fn fixture_run_records_the_expected_findings() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.json");
    let (dom, report) = run_fixture(artifact_page(), &output).await;

    assert_eq!(report.url, "https://app.example/chat/abc123");
    // Both artifact panels are inspected; each pass records the overlay
    // link, the radix container link scanned as a body div, and the radix
    // menu link.
    assert_eq!(report.findings.len(), 6);
    assert!(report
        .findings
        .iter()
        .any(|f| f.finding_type == "download_link" && f.location == "body > div[3] > a"));
    assert!(report
        .findings
        .iter()
        .any(|f| f.finding_type == "menu_link"
            && f.location == "radix menu #radix-42-content > a"
            && f.download_attr == "artifact.md"));

    // two artifact opens, two dropdown clicks, two close-button clicks
    assert_eq!(dom.click_count(), 6);
    assert!(dom.is_closed());
}

#[tokio::test]
async fn fixture_runs_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    let (_, report_a) = run_fixture(artifact_page(), &first).await;
    let (_, report_b) = run_fixture(artifact_page(), &second).await;

    assert_eq!(report_a.findings, report_b.findings);
    assert_eq!(report_a.summary, report_b.summary);
}

#[tokio::test]
async fn every_finding_has_a_type_and_a_templated_location() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.json");
    let (_, report) = run_fixture(artifact_page(), &output).await;

    assert!(!report.findings.is_empty());
    for finding in &report.findings {
        assert!(!finding.finding_type.is_empty());
        let body_div_form = finding.location.starts_with("body > div[")
            && finding.location.ends_with("] > a");
        let radix_form = finding.location.starts_with("radix menu #")
            && finding.location.ends_with(" > a");
        assert!(
            body_div_form || radix_form,
            "unexpected location: {}",
            finding.location
        );
    }
}

#[tokio::test]
async fn zero_artifacts_means_no_clicks_and_an_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.json");
    let (dom, report) = run_fixture(empty_page(), &output).await;

    assert!(report.findings.is_empty());
    // no panel-inspection step ran
    assert_eq!(dom.click_count(), 0);
    assert!(dom.is_closed());
}

#[tokio::test]
async fn report_shape_is_stable_even_for_an_empty_run() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.json");
    let (_, _) = run_fixture(empty_page(), &output).await;

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let object = value.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["findings", "summary", "timestamp", "url"]);

    let summary = object["summary"].as_object().unwrap();
    assert_eq!(summary.len(), 5);
    for key in [
        "artifact_selector",
        "panel_selector",
        "dropdown_button",
        "download_link_location",
        "download_link_attributes",
    ] {
        assert!(summary.contains_key(key), "summary missing {key}");
    }
}

#[tokio::test]
async fn session_is_released_when_the_run_fails() {
    let dom = StaticDom::new(artifact_page());
    let session = Session::from_backend(Arc::new(dom.clone()));

    // A report path inside a directory that does not exist fails the run
    // after inspection, on the write.
    let opts = fast_options(&Path::new("/nonexistent-dir-for-sure").join("report.json"));
    let result = Inspector::new(session, ProbeSet::default(), opts).run().await;

    assert!(result.is_err());
    assert!(dom.is_closed());
}
