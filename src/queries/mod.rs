//! Tree-sitter query strings used by the AST predicates.

/// Tree-sitter query that returns imported module names.
/// * `module`: module name as written, for `import x`, `import x as y`, and
///   `from x import ...` forms
pub const IMPORT_QUERY: &str = include_str!("import.scm");

/// Tree-sitter query that returns function definitions.
/// * `name`: function name
pub const FUNCTION_DEF_QUERY: &str = include_str!("function_def.scm");

/// Tree-sitter query that returns `break` statements.
/// * `break`: the break statement
pub const BREAK_QUERY: &str = "((break_statement) @break)";

/// Tree-sitter query that returns `try` statements.
/// * `try`: the try statement
pub const TRY_QUERY: &str = "((try_statement) @try)";

/// Tree-sitter query that returns `except` clauses.
/// * `except`: the except clause
pub const EXCEPT_QUERY: &str = "((except_clause) @except)";
