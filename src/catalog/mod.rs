#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Rule and milestone definitions.
//!
//! The catalog is an ordered collection of milestones, each an ordered
//! collection of rules. It is constructed once at startup from the static
//! definitions in [`rules`] and never mutated afterwards; the evaluator and
//! aggregator only borrow it.

/// The predicate composition model.
pub mod predicate;
/// The built-in rule catalog.
pub mod rules;

use anyhow::{Result, ensure};
use bon::Builder;
use itertools::Itertools;

pub use predicate::{Predicate, PredicateError, Verdict};
pub use rules::default_catalog;

/// Preconditions a rule declares before its predicate may run. Unmet
/// preconditions make the rule SKIPPED, never FAILED: the absence of
/// evidence (no file, no tree) is not evidence of absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Needs {
    /// The target file must exist. Lexical checks need nothing more.
    #[default]
    File,
    /// A parse tree must be available. Pure AST queries cannot claim a
    /// required shape is missing when nothing parsed.
    Ast,
}

/// A single named check: a predicate, a point weight, and remediation text.
/// Immutable once built.
#[derive(Clone, Builder)]
#[builder(on(String, into))]
pub struct Rule {
    /// Stable identifier, e.g. `timer-monotonic-call`.
    id:          String,
    /// What the rule looks for; rendered as the Expected line.
    description: String,
    /// Points awarded when the rule passes.
    weight:      u32,
    /// Preconditions checked before the predicate runs.
    #[builder(default)]
    needs:       Needs,
    /// The check itself.
    predicate:   Predicate,
    /// Static guidance rendered as the Suggestion line.
    remediation: String,
}

impl Rule {
    /// Stable identifier of this rule.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// What the rule looks for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Points awarded when the rule passes.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Preconditions checked before the predicate runs.
    pub fn needs(&self) -> Needs {
        self.needs
    }

    /// The check itself.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Static remediation guidance.
    pub fn remediation(&self) -> &str {
        &self.remediation
    }
}

/// A weighted group of rules representing one grading unit.
#[derive(Clone, Builder)]
#[builder(on(String, into))]
pub struct Milestone {
    /// Display name, e.g. `Timer Pattern`.
    name:        String,
    /// Filesystem-safe identifier used for marker files.
    slug:        String,
    /// One-line description, used in marker files and listings.
    description: String,
    /// Whether this milestone gates the process exit code. Variant
    /// milestones targeting alternative API styles are not required.
    #[builder(default = true)]
    required:    bool,
    /// The rules, in declared order.
    rules:       Vec<Rule>,
}

impl Milestone {
    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem-safe identifier.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// One-line description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this milestone gates the exit code.
    pub fn required(&self) -> bool {
        self.required
    }

    /// The rules, in declared order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Maximum points attainable: the sum of the constituent weights. This
    /// is the weight-accounting invariant; earned points are bounded by it
    /// by construction.
    pub fn max_points(&self) -> u32 {
        self.rules.iter().map(Rule::weight).sum()
    }
}

/// The ordered, immutable collection of milestones audited per run.
#[derive(Clone)]
pub struct PatternCatalog {
    /// Milestones in declared order.
    milestones: Vec<Milestone>,
}

impl PatternCatalog {
    /// Builds a catalog, enforcing the construction-time invariants: rule
    /// ids are unique across milestones and every weight is positive.
    pub fn new(milestones: Vec<Milestone>) -> Result<Self> {
        let duplicates: Vec<&str> = milestones
            .iter()
            .flat_map(|m| m.rules())
            .map(Rule::id)
            .duplicates()
            .collect();
        ensure!(
            duplicates.is_empty(),
            "duplicate rule ids in catalog: {}",
            duplicates.join(", ")
        );

        for rule in milestones.iter().flat_map(|m| m.rules()) {
            ensure!(rule.weight() > 0, "rule `{}` has zero weight", rule.id());
        }

        Ok(Self { milestones })
    }

    /// Milestones in declared order.
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// All rules across all milestones, in declared order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.milestones.iter().flat_map(|m| m.rules())
    }

    /// Total points attainable across required milestones.
    pub fn required_max_points(&self) -> u32 {
        self.milestones
            .iter()
            .filter(|m| m.required())
            .map(Milestone::max_points)
            .sum()
    }
}
