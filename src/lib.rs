//! A small query language for filtering string-keyed records.
//!
//! A query is a nested boolean condition over field comparisons:
//!
//! ```text
//! condition  ::= "(" ("AND" | "OR" | "NOT") condition+ ")" | comparison
//! comparison ::= "(" "'" field "'" ("=" | "~") "\"" value "\"" ")"
//! ```
//!
//! `=` tests exact equality, `~` matches the whole field value against
//! the comparison value read as a regular expression. `'`, `"` and `\`
//! inside a field or value are escaped with a backslash; operators are
//! case-sensitive.
//!
//! ```
//! use std::collections::HashMap;
//!
//! let expr = sifter::parse(r#"(AND('name'="thing")('rate'~"\$14.*"))"#)?;
//! let record = HashMap::from([("name", "thing"), ("rate", "$14.50")]);
//! assert!(expr.evaluate(&record));
//! assert!(!expr.evaluate(&HashMap::<&str, &str>::new()));
//! # Ok::<(), sifter::ParseError>(())
//! ```

mod ast;
mod error;
mod grammar;
mod record;
mod scanner;

pub use ast::{CompareOp, Expression, LogicOp};
pub use error::{ParseError, Result};
pub use record::Record;

/// Parse a query into an evaluable [`Expression`]. Surrounding
/// whitespace is ignored; everything else either parses completely or
/// fails with the first [`ParseError`] met during the descent.
pub fn parse(query: &str) -> Result<Expression> {
	let result = grammar::parse_condition(query.trim(), 0);
	if let Err(err) = &result {
		log::debug!("rejected query {query:?}: {err}");
	}
	result
}

#[cfg(test)]
#[path = "tests/base.rs"]
mod tests;
