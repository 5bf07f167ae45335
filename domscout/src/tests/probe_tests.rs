use std::io::Write;

use crate::probe::ProbeSet;
use crate::selector::Selector;

#[test]
fn default_probe_set_carries_the_builtin_guesses() {
    let probes = ProbeSet::default();
    assert_eq!(
        probes.artifact_buttons,
        vec![r#"button[aria-label="Preview contents"]"#.to_string()]
    );
    assert_eq!(probes.panel.len(), 2);
    assert!(probes.panel[1].starts_with("/html/body/"));
    assert_eq!(probes.body_div_window, 5);
    assert_eq!(probes.radix_report_cap, 3);
    assert_eq!(probes.poll_interval_ms, 100);
}

#[test]
fn panel_plan_orders_attribute_guess_before_positional_path() {
    let plan = ProbeSet::default().panel_plan();
    assert_eq!(plan.target(), "artifact panel");
    assert!(matches!(plan.selectors()[0], Selector::Css(_)));
    assert!(matches!(plan.selectors()[1], Selector::XPath(_)));
}

#[test]
fn override_file_replaces_only_the_listed_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r##"{{
            "panel": ["#preview-pane", "/html/body/div[2]"],
            "body_div_window": 8
        }}"##
    )
    .unwrap();

    let probes = ProbeSet::from_path(file.path()).unwrap();
    assert_eq!(probes.panel, vec!["#preview-pane", "/html/body/div[2]"]);
    assert_eq!(probes.body_div_window, 8);
    // untouched fields keep their defaults
    assert_eq!(probes.artifact_buttons, ProbeSet::default().artifact_buttons);
    assert_eq!(probes.radix_report_cap, 3);
}

#[test]
fn unknown_fields_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r##"{{ "panels": ["#typo"] }}"##).unwrap();
    assert!(ProbeSet::from_path(file.path()).is_err());
}

#[test]
fn missing_override_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ProbeSet::from_path(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(crate::errors::ScoutError::Io(_))));
}

#[test]
fn probe_set_round_trips_through_json() {
    let probes = ProbeSet::default();
    let json = serde_json::to_string(&probes).unwrap();
    let back: ProbeSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, probes);
}
