#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Score aggregation and diagnostic rendering.
//!
//! Aggregation sums the weights of PASSED rules per milestone (SKIPPED and
//! FAILED both contribute zero) and marks a milestone complete when every
//! rule passed. Rendering produces the tabled per-rule overview plus an
//! Expected/Actual/Suggestion block for each rule that needs attention.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{
    catalog::PatternCatalog,
    evaluate::{RuleResult, RuleStatus},
    source::SourceDocument,
};

/// Aggregated outcome for one milestone.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneReport {
    /// Display name of the milestone.
    pub name:     String,
    /// Filesystem-safe identifier of the milestone.
    pub slug:     String,
    /// One-line description, used in marker files.
    pub description: String,
    /// Whether this milestone gates the exit code.
    pub required: bool,
    /// Points earned (sum of passed rule weights).
    pub earned:   u32,
    /// Maximum points (sum of all rule weights).
    pub max:      u32,
    /// True when every rule in the milestone passed.
    pub complete: bool,
    /// Per-rule outcomes, in declared order.
    pub results:  Vec<RuleResult>,
}

/// The complete per-run outcome: all rule results plus aggregated scores.
/// Computed fresh per run and never persisted by the core itself.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Path of the audited file.
    pub target:     String,
    /// Per-milestone aggregates, in catalog order.
    pub milestones: Vec<MilestoneReport>,
}

impl AuditReport {
    /// Builds a report from per-milestone result vectors, in catalog order.
    pub fn from_results(
        catalog: &PatternCatalog,
        doc: &SourceDocument,
        per_milestone: Vec<Vec<RuleResult>>,
    ) -> Self {
        let milestones = catalog
            .milestones()
            .iter()
            .zip(per_milestone)
            .map(|(milestone, results)| {
                let earned: u32 = results.iter().map(RuleResult::earned).sum();
                let complete = results.iter().all(|r| r.status == RuleStatus::Passed);
                MilestoneReport {
                    name: milestone.name().to_string(),
                    slug: milestone.slug().to_string(),
                    description: milestone.description().to_string(),
                    required: milestone.required(),
                    earned,
                    max: milestone.max_points(),
                    complete,
                    results,
                }
            })
            .collect();

        Self {
            target: doc.path().display().to_string(),
            milestones,
        }
    }

    /// True when every required milestone is complete. Drives the exit code.
    pub fn required_complete(&self) -> bool {
        self.milestones
            .iter()
            .filter(|m| m.required)
            .all(|m| m.complete)
    }

    /// Total points earned across required milestones.
    pub fn required_earned(&self) -> u32 {
        self.milestones
            .iter()
            .filter(|m| m.required)
            .map(|m| m.earned)
            .sum()
    }

    /// Total points attainable across required milestones.
    pub fn required_max(&self) -> u32 {
        self.milestones
            .iter()
            .filter(|m| m.required)
            .map(|m| m.max)
            .sum()
    }
}

/// One row of the audit overview table.
#[derive(Tabled)]
struct OverviewRow {
    /// Milestone the rule belongs to.
    #[tabled(rename = "Milestone")]
    milestone: String,
    /// Rule identifier.
    #[tabled(rename = "Rule")]
    rule:      String,
    /// Terminal status.
    #[tabled(rename = "Status")]
    status:    RuleStatus,
    /// Earned/weight points.
    #[tabled(rename = "Points")]
    points:    String,
}

/// Renders the audit overview table to a string.
pub fn overview_table(report: &AuditReport) -> String {
    let rows: Vec<OverviewRow> = report
        .milestones
        .iter()
        .flat_map(|milestone| {
            milestone.results.iter().map(|result| OverviewRow {
                milestone: milestone.name.clone(),
                rule:      result.rule_id.clone(),
                status:    result.status,
                points:    format!("{}/{}", result.earned(), result.weight),
            })
        })
        .collect();

    Table::new(rows)
        .with(Panel::header("Audit Overview"))
        .with(Panel::footer(format!(
            "Required total: {}/{}",
            report.required_earned(),
            report.required_max()
        )))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(32).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

/// Renders one rule result as an Expected/Actual/Suggestion block.
///
/// SKIPPED results carry the skip reason in the Actual line rather than
/// being silently omitted; PASSED results render tersely.
pub fn render_rule(result: &RuleResult) -> String {
    match result.status {
        RuleStatus::Passed => format!("[PASS] {} ({} pts)", result.rule_id, result.weight),
        RuleStatus::Failed | RuleStatus::Skipped => {
            let mut block = format!(
                "[{}] {} (0/{} pts)\n  Expected: {}\n  Actual:   {}",
                if result.status == RuleStatus::Failed {
                    "FAIL"
                } else {
                    "SKIP"
                },
                result.rule_id,
                result.weight,
                result.expected,
                result.actual,
            );
            if !result.internal_fault {
                block.push_str("\n  Suggestion: ");
                block.push_str(&result.remediation.replace('\n', "\n    "));
            }
            block
        }
    }
}

/// Prints the full report to stderr: the overview table followed by a
/// diagnostic block for every rule that did not pass.
pub fn print_report(report: &AuditReport) {
    eprintln!("{}", overview_table(report));

    for milestone in &report.milestones {
        let header = format!(
            "{} [{}] - {}/{} pts{}",
            milestone.name,
            if milestone.complete { "complete" } else { "incomplete" },
            milestone.earned,
            milestone.max,
            if milestone.required { "" } else { " (variant)" },
        );
        if milestone.complete {
            eprintln!("{}", header.green().bold());
        } else if milestone.required {
            eprintln!("{}", header.red().bold());
        } else {
            eprintln!("{}", header.yellow());
        }

        for result in &milestone.results {
            match result.status {
                RuleStatus::Passed => eprintln!("  {}", render_rule(result).green()),
                RuleStatus::Failed => eprintln!("  {}", render_rule(result).red()),
                RuleStatus::Skipped => eprintln!("  {}", render_rule(result).yellow()),
            }
        }
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, status: RuleStatus, weight: u32) -> RuleResult {
        RuleResult {
            rule_id: id.to_string(),
            status,
            weight,
            expected: "expected".to_string(),
            actual: "actual".to_string(),
            remediation: "suggestion".to_string(),
            internal_fault: false,
        }
    }

    #[test]
    fn earned_points_are_bounded_by_the_milestone_maximum() {
        let results = vec![
            result("a", RuleStatus::Passed, 5),
            result("b", RuleStatus::Failed, 10),
            result("c", RuleStatus::Skipped, 7),
        ];
        let earned: u32 = results.iter().map(RuleResult::earned).sum();
        let max: u32 = results.iter().map(|r| r.weight).sum();
        assert_eq!(earned, 5);
        assert!(earned <= max);
    }

    #[test]
    fn skipped_rule_renders_its_reason() {
        let mut skipped = result("polling-break-shutdown", RuleStatus::Skipped, 10);
        skipped.actual = "cannot analyze: syntax error on line 7".to_string();
        let rendered = render_rule(&skipped);
        assert!(rendered.contains("[SKIP]"));
        assert!(rendered.contains("syntax error on line 7"));
        assert!(rendered.contains("Suggestion:"));
    }

    #[test]
    fn failed_rule_renders_expected_actual_suggestion() {
        let rendered = render_rule(&result("structure-function-defs", RuleStatus::Failed, 5));
        assert!(rendered.contains("Expected: expected"));
        assert!(rendered.contains("Actual:   actual"));
        assert!(rendered.contains("Suggestion: suggestion"));
    }
}
