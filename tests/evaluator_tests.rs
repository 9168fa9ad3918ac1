//! End-to-end evaluation of the built-in catalog against fixture scripts.

use std::path::PathBuf;

use jalon::{
    catalog::default_catalog,
    evaluate::{RuleStatus, audit},
    report::AuditReport,
    source::SourceDocument,
};

fn fixture(name: &str) -> SourceDocument {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("python")
        .join(name);
    SourceDocument::load(path).expect("load fixture")
}

fn run(doc: &SourceDocument) -> AuditReport {
    let catalog = default_catalog().expect("catalog");
    audit(&catalog, doc).expect("audit")
}

fn status_of(report: &AuditReport, rule_id: &str) -> RuleStatus {
    result_of(report, rule_id).status
}

fn result_of<'a>(report: &'a AuditReport, rule_id: &str) -> &'a jalon::evaluate::RuleResult {
    report
        .milestones
        .iter()
        .flat_map(|m| m.results.iter())
        .find(|r| r.rule_id == rule_id)
        .unwrap_or_else(|| panic!("no result for rule {rule_id}"))
}

#[test]
fn timer_fixture_completes_all_required_milestones() {
    let report = run(&fixture("timer_polling.py"));

    for milestone in report.milestones.iter().filter(|m| m.required) {
        assert!(
            milestone.complete,
            "milestone {} incomplete: {:?}",
            milestone.name,
            milestone
                .results
                .iter()
                .filter(|r| r.status != RuleStatus::Passed)
                .map(|r| (&r.rule_id, &r.actual))
                .collect::<Vec<_>>()
        );
        assert_eq!(milestone.earned, milestone.max);
    }
    assert!(report.required_complete());
    assert_eq!(report.required_earned(), 100);
}

#[test]
fn missing_file_skips_every_rule_and_fails_none() {
    let report = run(&SourceDocument::missing("main.py"));

    for result in report.milestones.iter().flat_map(|m| m.results.iter()) {
        assert_eq!(
            result.status,
            RuleStatus::Skipped,
            "rule {} should be skipped on a missing file",
            result.rule_id
        );
        assert!(result.actual.contains("file not found"));
    }
    assert!(!report.required_complete());
    assert_eq!(report.required_earned(), 0);
}

#[test]
fn evaluation_is_deterministic_for_identical_input() {
    let doc = fixture("timer_polling.py");
    let first = serde_json::to_string(&run(&doc)).expect("serialize");
    let second = serde_json::to_string(&run(&doc)).expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn single_function_fails_the_count_rule_with_the_exact_count() {
    let doc = SourceDocument::from_text(
        "main.py",
        "def main():\n    pass\n\nif __name__ == \"__main__\":\n    main()\n",
    );
    let report = run(&doc);

    let result = result_of(&report, "structure-function-defs");
    assert_eq!(result.status, RuleStatus::Failed);
    assert!(
        result.actual.contains("found 1"),
        "actual should report the exact count, got: {}",
        result.actual
    );
    assert!(result.actual.contains("main"));
}

#[test]
fn threading_fixture_passes_the_whole_threading_milestone() {
    let report = run(&fixture("threaded_pipeline.py"));

    let milestone = report
        .milestones
        .iter()
        .find(|m| m.slug == "threading_pipeline")
        .expect("threading milestone");
    assert!(milestone.complete);
    assert_eq!(milestone.earned, milestone.max);

    // The same submission violates the single-loop rule of the required
    // timer milestone, by design.
    assert_eq!(status_of(&report, "timer-no-threading"), RuleStatus::Failed);
    let forbidden = result_of(&report, "timer-no-threading");
    assert!(forbidden.actual.contains("import threading"));
}

#[test]
fn syntax_error_fails_validity_skips_ast_rules_and_leaves_lexical_rules_alone() {
    let report = run(&fixture("syntax_error.py"));

    let validity = result_of(&report, "structure-valid-syntax");
    assert_eq!(validity.status, RuleStatus::Failed);
    assert!(
        validity.actual.contains("line 7"),
        "validity should name the offending line, got: {}",
        validity.actual
    );

    let counted = result_of(&report, "structure-function-defs");
    assert_eq!(counted.status, RuleStatus::Skipped);
    assert!(counted.actual.contains("cannot analyze"));

    // Lexical checks still run against the raw text.
    assert_eq!(status_of(&report, "timer-no-threading"), RuleStatus::Passed);
    assert_eq!(status_of(&report, "timer-time-import"), RuleStatus::Passed);
    assert_eq!(
        status_of(&report, "polling-keyboard-interrupt"),
        RuleStatus::Failed
    );
}

#[test]
fn gpiozero_fixture_fails_polling_import_but_passes_the_callback_variant() {
    let report = run(&fixture("gpiozero_callback.py"));

    assert_eq!(
        status_of(&report, "polling-digitalio-import"),
        RuleStatus::Failed
    );
    assert_eq!(status_of(&report, "polling-button-read"), RuleStatus::Failed);

    let variant = report
        .milestones
        .iter()
        .find(|m| m.slug == "gpiozero_callbacks")
        .expect("callback milestone");
    assert!(variant.complete);
    assert_eq!(status_of(&report, "callback-when-pressed"), RuleStatus::Passed);
    assert_eq!(
        status_of(&report, "callback-gpiozero-import"),
        RuleStatus::Passed
    );
}

#[test]
fn earned_points_equal_the_sum_of_passed_weights_and_never_exceed_max() {
    for name in [
        "timer_polling.py",
        "threaded_pipeline.py",
        "gpiozero_callback.py",
        "syntax_error.py",
    ] {
        let report = run(&fixture(name));
        for milestone in &report.milestones {
            let passed_sum: u32 = milestone
                .results
                .iter()
                .filter(|r| r.status == RuleStatus::Passed)
                .map(|r| r.weight)
                .sum();
            assert_eq!(milestone.earned, passed_sum, "fixture {name}");
            assert!(milestone.earned <= milestone.max, "fixture {name}");
        }
    }
}
