use crate::report::{
    body_div_link_location, radix_menu_link_location, Finding, InspectionReport,
    SummarySelectors,
};

#[test]
fn report_always_has_the_four_top_level_keys() {
    let report = InspectionReport::new(
        "https://app.example/chat/abc123".to_string(),
        Vec::new(),
        SummarySelectors::default(),
    );
    let value = serde_json::to_value(&report).unwrap();
    let object = value.as_object().unwrap();

    let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["findings", "summary", "timestamp", "url"]);
    assert!(object["findings"].as_array().unwrap().is_empty());
}

#[test]
fn summary_always_has_the_five_fixed_keys() {
    let value = serde_json::to_value(SummarySelectors::default()).unwrap();
    let mut keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(|k| k.as_str())
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "artifact_selector",
            "download_link_attributes",
            "download_link_location",
            "dropdown_button",
            "panel_selector",
        ]
    );
}

#[test]
fn finding_serializes_its_tag_under_type() {
    let finding = Finding::download_link(7, "Download as file".to_string(), "a.txt".to_string());
    let value = serde_json::to_value(&finding).unwrap();
    assert_eq!(value["type"], "download_link");
    assert_eq!(value["location"], "body > div[7] > a");
    assert_eq!(value["download_attr"], "a.txt");
}

#[test]
fn constructors_always_produce_a_nonempty_type_and_template_location() {
    let from_div = Finding::download_link(3, String::new(), String::new());
    assert!(!from_div.finding_type.is_empty());
    assert_eq!(from_div.location, body_div_link_location(3));

    let from_menu = Finding::menu_link("radix-42-content", String::new(), String::new());
    assert!(!from_menu.finding_type.is_empty());
    assert_eq!(
        from_menu.location,
        radix_menu_link_location("radix-42-content")
    );
    assert_eq!(from_menu.location, "radix menu #radix-42-content > a");
}

#[test]
fn report_round_trips_and_the_written_file_parses() {
    let findings = vec![
        Finding::download_link(4, "Download as file".to_string(), "artifact.txt".to_string()),
        Finding::menu_link(
            "radix-42-content",
            "Download as markdown".to_string(),
            "artifact.md".to_string(),
        ),
    ];
    let report = InspectionReport::new(
        "https://app.example/chat/abc123".to_string(),
        findings,
        SummarySelectors::default(),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dom-inspection-report.json");
    report.write_to(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let back: InspectionReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.findings.len(), 2);
}
