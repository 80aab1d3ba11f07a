// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for css-techniques - end-to-end runs over fixtures.

use css_techniques::config::load_config;
use css_techniques::report::{render, OutputFormat};
use css_techniques::stylesheet::{load_stylesheets, CssNode, RuleNode};
use css_techniques::{
    Configuration, EvaluationInput, MappedDom, Report, Stylesheet, TechniqueRunner, Verdict,
};
use std::path::Path;
use std::sync::Arc;

fn fixture_input() -> EvaluationInput {
    let sheets = load_stylesheets(Path::new("tests/fixtures/site.json")).expect("Should read site.json");
    EvaluationInput::new(sheets)
}

fn only(code: &str) -> TechniqueRunner {
    TechniqueRunner::new(Some(&Configuration {
        techniques: vec![code.to_string()],
        ..Configuration::default()
    }))
}

fn single_rule(selector: &str, property: &str, value: &str) -> EvaluationInput {
    let plain = format!("{} {{ {}: {}; }}", selector, property, value);
    let ast = CssNode::stylesheet(vec![RuleNode::new([selector]).declare(property, value).into()]);
    EvaluationInput::new(vec![Stylesheet::new("inline.css", plain, ast)])
}

fn outcome(report: &Report, code: &str) -> Verdict {
    report.get(code).map(|s| s.outcome()).expect("technique should be in the report")
}

#[tokio::test]
async fn test_full_catalog_over_fixture() {
    let mut runner = TechniqueRunner::default();
    let report = runner.execute(fixture_input()).await;

    assert_eq!(report.assertions.len(), 8);
    assert_eq!(outcome(&report, "QW-CSS-T1"), Verdict::Warning);
    assert_eq!(outcome(&report, "QW-CSS-T2"), Verdict::Failed);
    assert_eq!(outcome(&report, "QW-CSS-T3"), Verdict::Failed);
    assert_eq!(outcome(&report, "QW-CSS-T4"), Verdict::Passed);
    assert_eq!(outcome(&report, "QW-CSS-T5"), Verdict::Failed);
    assert_eq!(outcome(&report, "QW-CSS-T6"), Verdict::Failed);
    assert_eq!(outcome(&report, "QW-CSS-T7"), Verdict::Inapplicable);
    assert_eq!(outcome(&report, "QW-CSS-T9"), Verdict::Failed);

    assert_eq!(report.metadata.passed, 1);
    assert_eq!(report.metadata.warning, 1);
    assert_eq!(report.metadata.failed, 5);
    assert_eq!(report.metadata.inapplicable, 1);
    assert!(report.has_failures());
}

#[tokio::test]
async fn test_metadata_sums_to_techniques_run() {
    for config in [
        Configuration::default(),
        Configuration { levels: vec!["A".to_string()], ..Configuration::default() },
        Configuration { techniques: vec!["C21".to_string(), "F4".to_string()], ..Configuration::default() },
    ] {
        let mut runner = TechniqueRunner::new(Some(&config));
        let enabled = runner.registry().enabled_codes().len();
        let report = runner.execute(fixture_input()).await;

        assert_eq!(report.metadata.total() as usize, enabled);
        assert_eq!(report.assertions.len(), enabled);
    }
}

#[tokio::test]
async fn test_keyframes_are_not_inspected() {
    let mut runner = only("QW-CSS-T1");
    let report = runner.execute(fixture_input()).await;

    let state = report.get("QW-CSS-T1").unwrap();
    assert_eq!(state.results.len(), 1);
    let evidence = state.results[0].evidence().expect("warning carries evidence");
    assert_eq!(evidence.property.value, "12px");
    assert_eq!(evidence.stylesheet_file.as_deref(), Some("https://example.org/css/site.css"));
    assert_eq!(evidence.css_code.as_deref(), Some("p {\n  font-size: 12px;\n  text-align: left;\n  line-height: 175%;\n}"));
}

#[tokio::test]
async fn test_font_size_px_is_a_warning() {
    let mut runner = only("QW-CSS-T1");
    let report = runner.execute(single_rule("p", "font-size", "12px")).await;

    let state = report.get("QW-CSS-T1").unwrap();
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.results[0].verdict, Verdict::Warning);
    assert_eq!(state.outcome(), Verdict::Warning);
}

#[tokio::test]
async fn test_blink_fails_and_absence_passes() {
    let mut runner = only("QW-CSS-T6");

    let report = runner.execute(single_rule("div", "text-decoration", "blink")).await;
    assert_eq!(outcome(&report, "QW-CSS-T6"), Verdict::Failed);

    let report = runner.execute(single_rule("div", "color", "black")).await;
    assert_eq!(outcome(&report, "QW-CSS-T6"), Verdict::Passed);
}

#[tokio::test]
async fn test_line_height_band() {
    let mut runner = only("QW-CSS-T3");

    let report = runner.execute(single_rule("section", "line-height", "175%")).await;
    let state = report.get("QW-CSS-T3").unwrap();
    assert_eq!(state.results[0].verdict, Verdict::Passed);

    let report = runner.execute(single_rule("section", "line-height", "120%")).await;
    let state = report.get("QW-CSS-T3").unwrap();
    assert_eq!(state.results[0].verdict, Verdict::Failed);
}

#[tokio::test]
async fn test_runs_do_not_leak_results() {
    let mut runner = only("QW-CSS-T1");
    let first = runner.execute(single_rule("p", "font-size", "12px")).await;
    let second = runner.execute(single_rule("p", "font-size", "12px")).await;

    assert_eq!(first, second);
    assert_eq!(second.get("QW-CSS-T1").unwrap().results.len(), 1);
}

#[tokio::test]
async fn test_config_file_selection() {
    let config = load_config(Path::new("tests/fixtures/config.yml")).expect("Should read config.yml");
    let runner = TechniqueRunner::new(Some(&config));
    assert_eq!(runner.registry().enabled_codes(), vec!["QW-CSS-T1", "QW-CSS-T6"]);
}

#[tokio::test]
async fn test_color_pairing_with_mapped_dom() {
    let json = std::fs::read_to_string("tests/fixtures/dom.json").expect("Should read dom.json");
    let dom = MappedDom::from_json(&json).unwrap();

    let mut runner = only("QW-CSS-T7");
    let report = runner.execute(fixture_input().with_dom(Arc::new(dom))).await;

    let state = report.get("QW-CSS-T7").unwrap();
    assert_eq!(state.outcome(), Verdict::Failed);
    assert_eq!(state.metadata.tally.passed, 1);
    assert_eq!(state.metadata.tally.failed, 2);

    let failing: Vec<&str> = state
        .results
        .iter()
        .filter_map(|r| r.evidence())
        .map(|e| e.selector.value.as_str())
        .collect();
    assert_eq!(failing, vec!["footer", "aside"]);
}

#[tokio::test]
async fn test_color_pairing_with_html_page() {
    let html = std::fs::read_to_string("tests/fixtures/page.html").expect("Should read page.html");
    let dom = MappedDom::from_html(&html);

    let mut runner = only("F24");
    let report = runner.execute(EvaluationInput::default().with_dom(Arc::new(dom))).await;

    let state = report.get("QW-CSS-T7").unwrap();
    assert_eq!(state.metadata.tally.passed, 2);
    assert_eq!(state.metadata.tally.failed, 1);
    assert_eq!(state.metadata.description, "Element has background-color set but not color");
}

#[tokio::test]
async fn test_report_renderings() {
    let mut runner = TechniqueRunner::default();
    let report = runner.execute(fixture_input()).await;

    let json: serde_json::Value = serde_json::from_str(&render(&report, OutputFormat::Json)).unwrap();
    assert_eq!(json["type"], "css-techniques");
    assert_eq!(json["assertions"]["QW-CSS-T6"]["mapping"], "F4");

    let sarif: serde_json::Value = serde_json::from_str(&render(&report, OutputFormat::Sarif)).unwrap();
    let results = sarif["runs"][0]["results"].as_array().unwrap();
    assert!(results.iter().any(|r| r["ruleId"] == "QW-CSS-T6" && r["level"] == "error"));
    assert!(results.iter().any(|r| r["ruleId"] == "QW-CSS-T1" && r["level"] == "warning"));

    let text = render(&report, OutputFormat::Text);
    assert!(text.contains("[QW-CSS-T6]"));
    assert!(text.ends_with("RESULT: FAIL\n"));
}

fn sheet_from_json(json: &str) -> EvaluationInput {
    let sheet: Stylesheet = serde_json::from_str(json).expect("stylesheet JSON should load");
    EvaluationInput::new(vec![sheet])
}

#[tokio::test]
async fn test_declarations_inside_unlisted_group_are_checked() {
    let input = sheet_from_json(
        r#"{ "file": "layers.css",
             "content": { "plain": "@layer base { p { font-size: 12px; } }",
                          "parsed": { "type": "stylesheet", "stylesheet": { "rules": [
                              { "type": "layer", "rules": [
                                  { "type": "rule", "selectors": ["p"],
                                    "declarations": [{ "property": "font-size", "value": "12px" }] }
                              ] }
                          ] } } } }"#,
    );

    let report = only("QW-CSS-T1").execute(input).await;
    let state = report.get("QW-CSS-T1").unwrap();
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.outcome(), Verdict::Warning);
}

#[tokio::test]
async fn test_malformed_nodes_leave_valid_rules_checked() {
    let input = sheet_from_json(
        r#"{ "file": "broken.css",
             "content": { "plain": "p {} h1 { font-size: 12px; }",
                          "parsed": { "type": "stylesheet", "stylesheet": { "rules": [
                              { "type": "rule", "selectors": ["p"], "declarations": null },
                              { "selectors": ["div"], "declarations": [] },
                              { "type": "media", "rules": null },
                              { "type": "rule", "selectors": ["h1"],
                                "declarations": [{ "property": "font-size", "value": "12px" }] }
                          ] } } } }"#,
    );

    let report = only("QW-CSS-T1").execute(input).await;
    let state = report.get("QW-CSS-T1").unwrap();
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.results[0].evidence().map(|e| e.selector.value.as_str()), Some("h1"));
}

#[tokio::test]
async fn test_quoted_semicolon_does_not_invent_background() {
    let html = r#"<html><body><p style="color: #000; font-family: 'x;background-color:red'">Hi</p></body></html>"#;
    let dom = MappedDom::from_html(html);

    let report = only("QW-CSS-T7").execute(EvaluationInput::default().with_dom(Arc::new(dom))).await;
    let state = report.get("QW-CSS-T7").unwrap();
    assert_eq!(state.outcome(), Verdict::Failed);
    assert_eq!(state.metadata.description, "Element has color set but not background-color");
}
