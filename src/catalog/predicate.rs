#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The predicate composition model.
//!
//! Every rule's check is expressed as a [`Predicate`] tree built from four
//! kinds of leaves (substring, regex, AST query, syntax validity) and three
//! combinators (all-of, any-of, not), evaluated short-circuit, left-to-right
//! as declared. [`Predicate::AstPreferred`] encodes the precedence policy:
//! where both an AST query and a lexical check could answer the same
//! question, the AST answer is authoritative whenever a tree exists, and the
//! lexical path is only the fallback.
//!
//! Several leaves are deliberately loose (a bare word counting as evidence a
//! concept exists). That permissiveness is inherited from the original
//! hand-authored checks and is kept as-is; tightening it would silently
//! change grading outcomes.

use itertools::Itertools;
use regex::Regex;

use crate::{
    parser::ParseResult,
    source::SourceDocument,
};

/// Errors raised by a defective predicate. These are catalog-authoring
/// defects, never student-facing diagnostics; the evaluator converts them to
/// tagged internal-fault failures.
#[derive(thiserror::Error, Debug)]
pub enum PredicateError {
    /// A regex leaf carries a pattern that does not compile.
    #[error("invalid regular expression `{pattern}`: {source}")]
    BadRegex {
        /// The pattern as declared in the catalog.
        pattern: String,
        /// The compile error from the regex engine.
        source:  regex::Error,
    },
    /// A tree-sitter query failed to compile or run.
    #[error("tree-sitter query failed: {message}")]
    BadQuery {
        /// Description of the query failure.
        message: String,
    },
    /// An AST leaf was evaluated without a parse tree. Rules needing a tree
    /// declare it, so reaching this is a catalog-authoring mistake.
    #[error("no parse tree available for an AST query")]
    NoTree,
    /// A lexical leaf was evaluated without source text.
    #[error("no source text available")]
    NoSource,
}

/// The boolean outcome of a predicate together with what was actually
/// observed, for the Actual line of a diagnostic.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Whether the predicate held.
    pub passed: bool,
    /// What was observed (a count, a matched marker, or "not found").
    pub actual: String,
}

impl Verdict {
    /// Builds a passing verdict.
    fn pass(actual: impl Into<String>) -> Self {
        Self {
            passed: true,
            actual: actual.into(),
        }
    }

    /// Builds a failing verdict.
    fn fail(actual: impl Into<String>) -> Self {
        Self {
            passed: false,
            actual: actual.into(),
        }
    }
}

/// A pure, total check over source text and/or its parse tree.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Case-sensitive containment of a marker string.
    Substring {
        /// The marker to look for.
        needle: String,
    },
    /// Containment with a minimum occurrence count.
    SubstringCount {
        /// The marker to count.
        needle:   String,
        /// Minimum number of occurrences required.
        at_least: usize,
    },
    /// A single regular expression tested against the raw text. The pattern
    /// is compiled at evaluation time so a malformed pattern surfaces as a
    /// [`PredicateError::BadRegex`] fault instead of a construction panic.
    Regex {
        /// The pattern to test.
        pattern: String,
    },
    /// A tree-sitter query counted against a threshold.
    AstCount {
        /// The query to run.
        query:         &'static str,
        /// The capture whose occurrences are counted.
        capture:       &'static str,
        /// When set, only captures whose text equals this value count.
        equals_filter: Option<String>,
        /// Minimum number of counted captures required.
        at_least:      usize,
    },
    /// Passes iff the file parsed cleanly. Fails (never skips) on a syntax
    /// error, reporting the offending line.
    SyntaxValid,
    /// Passes iff the target file exists.
    FilePresent,
    /// Every branch must hold; stops at the first failure.
    AllOf(Vec<Predicate>),
    /// At least one branch must hold; stops at the first success.
    AnyOf(Vec<Predicate>),
    /// Inverts a branch; the branch's observation is kept so a forbidden
    /// marker shows up verbatim in the Actual line.
    Not(Box<Predicate>),
    /// Precedence composite: `ast` is authoritative when a tree exists,
    /// `lexical` is the fallback used when no tree is available.
    AstPreferred {
        /// The authoritative AST branch.
        ast:     Box<Predicate>,
        /// The lexical fallback branch.
        lexical: Box<Predicate>,
    },
}

impl Predicate {
    /// Short label for the predicate kind, used in catalog listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::Substring { .. } | Predicate::SubstringCount { .. } => "substring",
            Predicate::Regex { .. } => "regex",
            Predicate::AstCount { .. } => "ast-query",
            Predicate::SyntaxValid => "syntax",
            Predicate::FilePresent => "presence",
            Predicate::AllOf(_) | Predicate::AnyOf(_) | Predicate::Not(_) => "composite",
            Predicate::AstPreferred { .. } => "ast-query/fallback",
        }
    }

    /// Evaluates the predicate against a document and its parse outcome.
    ///
    /// Pure and deterministic: identical inputs always produce the identical
    /// verdict. The `Err` path only carries catalog-authoring defects.
    pub fn eval(
        &self,
        doc: &SourceDocument,
        parse: Option<&ParseResult>,
    ) -> Result<Verdict, PredicateError> {
        match self {
            Predicate::Substring { needle } => {
                let text = doc.text().ok_or(PredicateError::NoSource)?;
                if text.contains(needle.as_str()) {
                    Ok(Verdict::pass(format!("found `{needle}`")))
                } else {
                    Ok(Verdict::fail(format!("`{needle}` not found")))
                }
            }
            Predicate::SubstringCount { needle, at_least } => {
                let text = doc.text().ok_or(PredicateError::NoSource)?;
                let count = text.matches(needle.as_str()).count();
                let verdict = format!("found {count} occurrence(s) of `{needle}`");
                if count >= *at_least {
                    Ok(Verdict::pass(verdict))
                } else {
                    Ok(Verdict::fail(verdict))
                }
            }
            Predicate::Regex { pattern } => {
                let text = doc.text().ok_or(PredicateError::NoSource)?;
                let re = Regex::new(pattern).map_err(|source| PredicateError::BadRegex {
                    pattern: pattern.clone(),
                    source,
                })?;
                match re.find(text) {
                    Some(m) => Ok(Verdict::pass(format!("found `{}`", m.as_str().trim()))),
                    None => Ok(Verdict::fail(format!("no match for `{pattern}`"))),
                }
            }
            Predicate::AstCount {
                query,
                capture,
                equals_filter,
                at_least,
            } => {
                let parser = parse
                    .and_then(ParseResult::parser)
                    .ok_or(PredicateError::NoTree)?;
                let matches = parser
                    .query(query)
                    .map_err(|e| PredicateError::BadQuery {
                        message: format!("{e:#}"),
                    })?;
                let names: Vec<&String> = matches
                    .iter()
                    .filter_map(|m| m.get(*capture))
                    .filter(|text| match equals_filter {
                        Some(wanted) => text.as_str() == wanted,
                        None => true,
                    })
                    .collect();
                let count = names.len();
                let actual = if names.is_empty() {
                    format!("found {count} match(es)")
                } else {
                    format!("found {count} match(es): {}", names.iter().join(", "))
                };
                if count >= *at_least {
                    Ok(Verdict::pass(actual))
                } else {
                    Ok(Verdict::fail(actual))
                }
            }
            Predicate::SyntaxValid => match parse {
                Some(ParseResult::Valid(_)) => Ok(Verdict::pass("syntax is valid")),
                Some(ParseResult::Invalid(issue)) => Ok(Verdict::fail(issue.to_string())),
                Some(ParseResult::NoInput) | None => Ok(Verdict::fail("no input to parse")),
            },
            Predicate::FilePresent => {
                if doc.is_present() {
                    Ok(Verdict::pass(format!("{} exists", doc.path().display())))
                } else {
                    Ok(Verdict::fail(format!(
                        "file not found at {}",
                        doc.path().display()
                    )))
                }
            }
            Predicate::AllOf(branches) => {
                for branch in branches {
                    let verdict = branch.eval(doc, parse)?;
                    if !verdict.passed {
                        return Ok(verdict);
                    }
                }
                Ok(Verdict::pass("all required markers found"))
            }
            Predicate::AnyOf(branches) => {
                for branch in branches {
                    let verdict = branch.eval(doc, parse)?;
                    if verdict.passed {
                        return Ok(verdict);
                    }
                }
                Ok(Verdict::fail("none of the accepted markers found"))
            }
            Predicate::Not(inner) => {
                let verdict = inner.eval(doc, parse)?;
                Ok(Verdict {
                    passed: !verdict.passed,
                    actual: verdict.actual,
                })
            }
            Predicate::AstPreferred { ast, lexical } => match parse {
                Some(ParseResult::Valid(_)) => ast.eval(doc, parse),
                _ => lexical.eval(doc, parse),
            },
        }
    }
}

/// Convenience constructors used by the catalog definitions.
impl Predicate {
    /// A containment leaf.
    pub fn substring(needle: impl Into<String>) -> Self {
        Predicate::Substring {
            needle: needle.into(),
        }
    }

    /// A containment leaf with a minimum occurrence count.
    pub fn substring_count(needle: impl Into<String>, at_least: usize) -> Self {
        Predicate::SubstringCount {
            needle: needle.into(),
            at_least,
        }
    }

    /// A regex leaf.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Predicate::Regex {
            pattern: pattern.into(),
        }
    }

    /// Any of the supplied markers, in declared order.
    pub fn any_substring<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::AnyOf(needles.into_iter().map(Predicate::substring).collect())
    }

    /// An AST query counting captures of `capture`, requiring at least
    /// `at_least` of them.
    pub fn ast_count(query: &'static str, capture: &'static str, at_least: usize) -> Self {
        Predicate::AstCount {
            query,
            capture,
            equals_filter: None,
            at_least,
        }
    }

    /// An AST import query requiring that `module` is imported.
    pub fn ast_import(module: impl Into<String>) -> Self {
        Predicate::AstCount {
            query:         crate::queries::IMPORT_QUERY,
            capture:       "module",
            equals_filter: Some(module.into()),
            at_least:      1,
        }
    }

    /// Negation of a branch.
    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// AST-authoritative composite with a lexical fallback.
    pub fn ast_preferred(ast: Predicate, lexical: Predicate) -> Self {
        Predicate::AstPreferred {
            ast:     Box::new(ast),
            lexical: Box::new(lexical),
        }
    }
}
