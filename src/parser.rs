#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Tree-sitter parser wrapper and syntax validation for Python source code.

use std::fmt::Formatter;

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Language, Node, Query, QueryCursor, StreamingIterator, Tree};

use crate::{Dict, source::SourceDocument};

/// A struct that wraps a tree-sitter parser object and source code.
#[derive(Clone)]
pub struct Parser {
    /// The source code being parsed.
    code:  String,
    /// The parse tree.
    _tree: Option<Tree>,
    /// The tree-sitter Python grammar language.
    lang:  tree_sitter::Language,
}

/// Returns the compiled tree-sitter Python language.
fn python_language() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, _: &mut Formatter<'_>) -> std::fmt::Result {
        Ok(())
    }
}

impl Parser {
    /// Returns a new parser object.
    ///
    /// * `source_code`: the source code to be parsed
    pub fn new(source_code: String) -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        let language = python_language();

        parser
            .set_language(&language)
            .with_context(|| "Failed to load Python grammar")?;
        let tree = parser
            .parse(source_code.as_str(), None)
            .ok_or_else(|| anyhow!("Error parsing Python code"))?;

        Ok(Self {
            code:  source_code,
            _tree: Some(tree),
            lang:  language,
        })
    }

    /// A getter for parser's source code.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the parse tree's root node.
    pub fn root_node(&self) -> Result<Node<'_>> {
        self._tree
            .as_ref()
            .map(Tree::root_node)
            .context("Treesitter could not parse code")
    }

    /// Returns the tree-sitter language (useful for custom queries).
    pub fn language(&self) -> &Language {
        &self.lang
    }

    /// Applies a tree sitter query and returns the result as a collection of
    /// HashMaps.
    ///
    /// * `q`: the tree-sitter query to be applied
    pub fn query(&self, q: &str) -> Result<Vec<Dict>> {
        let mut results = vec![];
        let tree = self
            ._tree
            .as_ref()
            .context("Treesitter could not parse code")?;

        let query = Query::new(&self.lang, q)
            .with_context(|| format!("Failed to compile tree-sitter query: {q}"))?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), self.code.as_bytes());
        let mut capture_indices = Vec::new();

        for name in query.capture_names() {
            let index = query
                .capture_index_for_name(name)
                .ok_or_else(|| anyhow!("Capture name {name} has no index associated."))?;
            capture_indices.push((index, name.to_string()));
        }

        while let Some(m) = matches.next() {
            let mut result = Dict::new();

            for (index, name) in &capture_indices {
                let value = match m.captures.iter().find(|c| c.index == *index) {
                    Some(v) => v,
                    None => continue,
                };

                let value = value
                    .node
                    .utf8_text(self.code.as_bytes())
                    .with_context(|| {
                        format!(
                            "Cannot match query result indices with source code for capture name: \
                             {name}."
                        )
                    })?;

                result.insert(name.clone(), value.to_string());
            }
            results.push(result);
        }

        Ok(results)
    }

    /// Returns the first syntax problem in the parse tree, if any.
    pub fn syntax_issue(&self) -> Option<SyntaxIssue> {
        let root = self._tree.as_ref()?.root_node();
        if !root.has_error() {
            return None;
        }
        let node = first_error_node(root).unwrap_or(root);
        let position = node.start_position();
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            "invalid syntax".to_string()
        };
        Some(SyntaxIssue {
            line: position.row + 1,
            column: position.column + 1,
            message,
        })
    }

    /// Returns the total number of lines in the source code.
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }
}

/// Depth-first search for the most specific ERROR or MISSING node.
fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    for child in children {
        if !child.has_error() {
            continue;
        }
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }
    // The error is attributed to this node but no child pinpoints it.
    Some(node)
}

/// A structured description of a syntax error, with 1-based coordinates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyntaxIssue {
    /// 1-based line number of the first offending token.
    pub line:    usize,
    /// 1-based column number of the first offending token.
    pub column:  usize,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntax error on line {}: {}", self.line, self.message)
    }
}

/// Outcome of syntax validation for one document.
///
/// Exactly one variant is produced per audit run; `NoInput` is reserved for
/// the missing-file case so downstream rules can tell "file absent" apart
/// from "file present but malformed".
#[derive(Debug, Clone)]
pub enum ParseResult {
    /// The source parsed cleanly; the wrapped parser holds the tree.
    Valid(Parser),
    /// The source is present but failed to parse.
    Invalid(SyntaxIssue),
    /// There was no source text to parse (file missing).
    NoInput,
}

impl ParseResult {
    /// Returns the parser when the source parsed cleanly.
    pub fn parser(&self) -> Option<&Parser> {
        match self {
            ParseResult::Valid(parser) => Some(parser),
            _ => None,
        }
    }

    /// Returns the syntax issue when the source failed to parse.
    pub fn issue(&self) -> Option<&SyntaxIssue> {
        match self {
            ParseResult::Invalid(issue) => Some(issue),
            _ => None,
        }
    }
}

/// Validates the syntax of a document's text.
///
/// Never propagates a parse failure as an error: an unparseable file is a
/// recognized `Invalid` outcome, not a fault. The `Err` path is reserved for
/// infrastructure problems (grammar failed to load).
pub fn parse_document(doc: &SourceDocument) -> Result<ParseResult> {
    let Some(text) = doc.text() else {
        return Ok(ParseResult::NoInput);
    };

    let parser = Parser::new(text.to_string())?;
    match parser.syntax_issue() {
        Some(issue) => Ok(ParseResult::Invalid(issue)),
        None => Ok(ParseResult::Valid(parser)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_source_yields_a_tree() {
        let doc = SourceDocument::from_text("main.py", "import time\n");
        let result = parse_document(&doc).expect("parse");
        assert!(result.parser().is_some());
        assert!(result.issue().is_none());
    }

    #[test]
    fn missing_source_yields_no_input() {
        let doc = SourceDocument::missing("main.py");
        let result = parse_document(&doc).expect("parse");
        assert!(matches!(result, ParseResult::NoInput));
    }

    #[test]
    fn broken_source_reports_the_line() {
        let doc = SourceDocument::from_text("main.py", "import time\nprint(time.time(\n");
        let result = parse_document(&doc).expect("parse");
        let issue = result.issue().expect("syntax issue");
        assert_eq!(issue.line, 2);
    }
}
