use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{CompareOp, Expression, LogicOp};
use crate::error::{ParseError, Result};
use crate::scanner::Scanner;

/// Conditions nested deeper than this are rejected outright instead of
/// recursing toward stack exhaustion.
pub const MAX_DEPTH: usize = 64;

// A condition is always a single bracketed group; `.` keeps its default
// meaning, so a newline anywhere in the query fails the shape check.
static GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(.*\)$").unwrap());

// Leaf shape: quoted field, one operator character, double quoted value.
// The value class rejects unescaped single quotes, which routes such
// inputs to the composite branch and its condition-pattern error.
static COMPARISON: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#"^'(?:[^'\\]|\\.)*'."(?:[^'\\]|\\.)*"$"#).unwrap());

pub fn parse_condition(query: &str, depth: usize) -> Result<Expression> {
	if depth >= MAX_DEPTH {
		return Err(ParseError::DepthExceeded(MAX_DEPTH));
	}
	if !GROUP.is_match(query) {
		return Err(ParseError::NotAGroup {
			query: query.to_string(),
		});
	}
	let inner = &query[1..query.len() - 1];
	if COMPARISON.is_match(inner) {
		return parse_comparison(inner);
	}

	// everything before the first child group is the logical operator
	let Some(bracket) = inner.find('(') else {
		return Err(ParseError::MalformedCondition);
	};
	let operator: LogicOp = inner[..bracket].parse()?;

	let mut children = Vec::new();
	for group in Scanner::from(&inner[bracket..]) {
		children.push(parse_condition(group?, depth + 1)?);
	}
	Ok(Expression::Composite { operator, children })
}

fn parse_comparison(comparison: &str) -> Result<Expression> {
	let Some(rest) = comparison.strip_prefix('\'') else {
		return Err(ParseError::UnquotedField);
	};
	let Some(quote) = closing_quote(rest, b'\'') else {
		return Err(ParseError::UnquotedField);
	};
	let field = unescape(&rest[..quote], r"\'", "'");
	if field.is_empty() {
		return Err(ParseError::EmptyField);
	}
	let rest = &rest[quote + 1..];

	// the single character after the field is the comparison operator
	let token = rest.chars().next().map_or(0, char::len_utf8);
	let operator: CompareOp = rest[..token].parse()?;
	let rest = &rest[token..];

	if !rest.starts_with('"') {
		return Err(ParseError::UnquotedValue);
	}
	let quote = match closing_quote(rest, b'"') {
		// the value's closing quote must also end the comparison
		Some(quote) if quote == rest.len() - 1 => quote,
		_ => return Err(ParseError::UnquotedValue),
	};
	let value = unescape(&rest[1..quote], r#"\""#, "\"");
	if value.is_empty() {
		return Err(ParseError::EmptyValue);
	}

	Ok(Expression::Comparison {
		field,
		operator,
		value,
	})
}

// First quote past the opener whose preceding byte is not an escape.
fn closing_quote(s: &str, quote: u8) -> Option<usize> {
	let bytes = s.as_bytes();
	(1..bytes.len()).find(|&i| bytes[i] == quote && bytes[i - 1] != b'\\')
}

// `\\` collapses before the quote does, so a double escape is never
// mistaken for an escaped quote.
fn unescape(raw: &str, escaped: &str, literal: &str) -> String {
	raw.replace(r"\\", r"\").replace(escaped, literal)
}

#[cfg(test)]
#[path = "tests/grammar.rs"]
mod grammar_test;
