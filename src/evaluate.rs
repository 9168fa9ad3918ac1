#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The rule evaluation engine.
//!
//! Each rule goes from not-run to exactly one terminal status:
//!
//! - SKIPPED when a declared precondition (file present, tree available)
//!   does not hold,
//! - PASSED when the predicate holds,
//! - FAILED when it does not, or when the predicate itself is defective.
//!
//! Rules never observe each other: no shared mutable state, no ordering
//! dependency, and a defective predicate is isolated to its own rule so the
//! audit always completes with a result for every declared rule.

use std::fmt::Display;

use anyhow::Result;
use serde::Serialize;

use crate::{
    catalog::{Needs, PatternCatalog, Rule},
    parser::{self, ParseResult},
    report::AuditReport,
    source::SourceDocument,
};

/// Terminal status of one rule within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleStatus {
    /// The predicate held.
    Passed,
    /// The predicate did not hold, or was defective.
    Failed,
    /// A precondition did not hold; no claim is made either way.
    Skipped,
}

impl Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleStatus::Passed => write!(f, "PASSED"),
            RuleStatus::Failed => write!(f, "FAILED"),
            RuleStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Outcome of evaluating one rule: a pure function of the rule, the
/// document, and the parse outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RuleResult {
    /// Identifier of the rule this result belongs to.
    pub rule_id:        String,
    /// Terminal status.
    pub status:         RuleStatus,
    /// Points at stake.
    pub weight:         u32,
    /// What the rule looks for (the Expected line).
    pub expected:       String,
    /// What was observed, or the skip reason (the Actual line).
    pub actual:         String,
    /// Remediation guidance (the Suggestion line).
    pub remediation:    String,
    /// Set when the failure is a catalog-authoring defect rather than a
    /// finding about the student's code.
    pub internal_fault: bool,
}

impl RuleResult {
    /// Points earned by this result: the full weight on a pass, zero
    /// otherwise.
    pub fn earned(&self) -> u32 {
        match self.status {
            RuleStatus::Passed => self.weight,
            _ => 0,
        }
    }
}

/// Evaluates a single rule against a document and its parse outcome.
///
/// Total: never returns an error and never panics for well-formed inputs; a
/// defective predicate degrades to a FAILED result tagged as an internal
/// fault.
pub fn evaluate_rule(rule: &Rule, doc: &SourceDocument, parse: Option<&ParseResult>) -> RuleResult {
    let skipped = |reason: String| RuleResult {
        rule_id:        rule.id().to_string(),
        status:         RuleStatus::Skipped,
        weight:         rule.weight(),
        expected:       rule.description().to_string(),
        actual:         reason,
        remediation:    rule.remediation().to_string(),
        internal_fault: false,
    };

    // Precondition checks, cheapest claim first: a rule about a file that
    // does not exist makes no claim at all.
    if !doc.is_present() {
        return skipped(format!("file not found: {}", doc.path().display()));
    }

    if rule.needs() == Needs::Ast {
        match parse {
            Some(ParseResult::Valid(_)) => {}
            Some(ParseResult::Invalid(issue)) => {
                return skipped(format!("cannot analyze: syntax error on line {}", issue.line));
            }
            Some(ParseResult::NoInput) | None => {
                return skipped(format!("file not found: {}", doc.path().display()));
            }
        }
    }

    match rule.predicate().eval(doc, parse) {
        Ok(verdict) => RuleResult {
            rule_id:        rule.id().to_string(),
            status:         if verdict.passed {
                RuleStatus::Passed
            } else {
                RuleStatus::Failed
            },
            weight:         rule.weight(),
            expected:       rule.description().to_string(),
            actual:         verdict.actual,
            remediation:    rule.remediation().to_string(),
            internal_fault: false,
        },
        Err(fault) => {
            tracing::error!(rule = rule.id(), %fault, "defective predicate in catalog");
            RuleResult {
                rule_id:        rule.id().to_string(),
                status:         RuleStatus::Failed,
                weight:         rule.weight(),
                expected:       rule.description().to_string(),
                actual:         format!("internal check error (catalog defect): {fault}"),
                remediation:    rule.remediation().to_string(),
                internal_fault: true,
            }
        }
    }
}

/// Runs the full catalog against one document and aggregates the results
/// into an [`AuditReport`]. The file is read and parsed exactly once.
pub fn audit(catalog: &PatternCatalog, doc: &SourceDocument) -> Result<AuditReport> {
    let parse = parser::parse_document(doc)?;
    tracing::debug!(
        target_file = %doc.path().display(),
        present = doc.is_present(),
        "starting audit"
    );

    let per_milestone = catalog
        .milestones()
        .iter()
        .map(|milestone| {
            milestone
                .rules()
                .iter()
                .map(|rule| evaluate_rule(rule, doc, Some(&parse)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    Ok(AuditReport::from_results(catalog, doc, per_milestone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Predicate;

    fn lexical_rule(id: &str, predicate: Predicate) -> Rule {
        Rule::builder()
            .id(id)
            .description("test rule")
            .weight(3)
            .predicate(predicate)
            .remediation("none")
            .build()
    }

    #[test]
    fn bad_regex_is_an_isolated_internal_fault() {
        let doc = SourceDocument::from_text("main.py", "import time\n");
        let parse = parser::parse_document(&doc).expect("parse");

        let bad = lexical_rule("bad", Predicate::regex("(unclosed"));
        let good = lexical_rule("good", Predicate::substring("import time"));

        let bad_result = evaluate_rule(&bad, &doc, Some(&parse));
        assert_eq!(bad_result.status, RuleStatus::Failed);
        assert!(bad_result.internal_fault);
        assert!(bad_result.actual.contains("internal check error"));

        let good_result = evaluate_rule(&good, &doc, Some(&parse));
        assert_eq!(good_result.status, RuleStatus::Passed);
        assert!(!good_result.internal_fault);
    }

    #[test]
    fn ast_rule_skips_without_a_tree_but_lexical_rule_runs() {
        let doc = SourceDocument::from_text("main.py", "def broken(:\n    pass\n");
        let parse = parser::parse_document(&doc).expect("parse");
        assert!(parse.issue().is_some(), "fixture should not parse");

        let ast_rule = Rule::builder()
            .id("ast")
            .description("needs a tree")
            .weight(5)
            .needs(Needs::Ast)
            .predicate(Predicate::ast_count(
                crate::queries::FUNCTION_DEF_QUERY,
                "name",
                1,
            ))
            .remediation("none")
            .build();
        let lexical = lexical_rule("lex", Predicate::substring("def broken"));

        let ast_result = evaluate_rule(&ast_rule, &doc, Some(&parse));
        assert_eq!(ast_result.status, RuleStatus::Skipped);
        assert!(ast_result.actual.contains("syntax error on line"));

        let lex_result = evaluate_rule(&lexical, &doc, Some(&parse));
        assert_eq!(lex_result.status, RuleStatus::Passed);
    }
}
