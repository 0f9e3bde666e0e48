use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};
use crate::record::Record;

/// Logical connective of a composite condition. Tokens are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
	And,
	Or,
	Not,
}

impl LogicOp {
	pub fn token(self) -> &'static str {
		match self {
			Self::And => "AND",
			Self::Or => "OR",
			Self::Not => "NOT",
		}
	}
}

impl FromStr for LogicOp {
	type Err = ParseError;

	fn from_str(token: &str) -> Result<Self> {
		match token {
			"AND" => Ok(Self::And),
			"OR" => Ok(Self::Or),
			"NOT" => Ok(Self::Not),
			_ => Err(ParseError::UnknownLogicalOperator(token.to_string())),
		}
	}
}

impl fmt::Display for LogicOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.token())
	}
}

/// Test applied by a comparison: exact equality or a whole-string match
/// against the value read as a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
	Equal,
	Like,
}

impl CompareOp {
	pub fn token(self) -> &'static str {
		match self {
			Self::Equal => "=",
			Self::Like => "~",
		}
	}
}

impl FromStr for CompareOp {
	type Err = ParseError;

	fn from_str(token: &str) -> Result<Self> {
		match token {
			"=" => Ok(Self::Equal),
			"~" => Ok(Self::Like),
			_ => Err(ParseError::UnknownComparisonOperator(token.to_string())),
		}
	}
}

impl fmt::Display for CompareOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.token())
	}
}

/// A parsed query. Trees come out of [`crate::parse`] fully built and are
/// never mutated afterwards, so one tree can be evaluated against any
/// number of records, from any number of threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
	/// A single test on one record field.
	Comparison {
		field: String,
		operator: CompareOp,
		value: String,
	},
	/// Child conditions joined by a logical operator. The parser always
	/// produces at least one child; NOT only ever consumes the first.
	Composite {
		operator: LogicOp,
		children: Vec<Expression>,
	},
	/// Evaluates to true unconditionally. Never produced by the parser,
	/// only used as the fallback operand of a childless NOT.
	True,
}

impl Expression {
	/// Whether `record` satisfies this condition. A field missing from
	/// the record makes its comparison false; evaluation itself cannot
	/// fail.
	pub fn evaluate<R: Record>(&self, record: &R) -> bool {
		match self {
			Self::Comparison {
				field,
				operator,
				value,
			} => {
				let Some(actual) = record.field(field) else {
					return false;
				};
				match operator {
					CompareOp::Equal => actual == value,
					CompareOp::Like => match_whole(value, actual),
				}
			}
			Self::Composite { operator, children } => match operator {
				LogicOp::And => children.iter().all(|child| child.evaluate(record)),
				LogicOp::Or => children.iter().any(|child| child.evaluate(record)),
				LogicOp::Not => !children.first().unwrap_or(&Self::True).evaluate(record),
			},
			Self::True => true,
		}
	}
}

// The pattern must cover the whole value, not a substring of it.
fn match_whole(pattern: &str, value: &str) -> bool {
	match Regex::new(&format!("^(?:{pattern})$")) {
		Ok(re) => re.is_match(value),
		Err(err) => {
			log::debug!("unusable match pattern {pattern:?}: {err}");
			false
		}
	}
}

fn escape(raw: &str, quote: char) -> String {
	raw.replace('\\', r"\\").replace(quote, &format!("\\{quote}"))
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Comparison {
				field,
				operator,
				value,
			} => write!(
				f,
				"('{}'{}\"{}\")",
				escape(field, '\''),
				operator,
				escape(value, '"')
			),
			Self::Composite { operator, children } => {
				write!(f, "({operator}")?;
				for child in children {
					write!(f, "{child}")?;
				}
				f.write_str(")")
			}
			Self::True => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn compare(field: &str, operator: CompareOp, value: &str) -> Expression {
		Expression::Comparison {
			field: field.to_string(),
			operator,
			value: value.to_string(),
		}
	}

	fn composite(operator: LogicOp, children: Vec<Expression>) -> Expression {
		Expression::Composite { operator, children }
	}

	fn record(fields: &[(&str, &str)]) -> HashMap<String, String> {
		fields
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn equal_requires_the_field() {
		let expr = compare("name", CompareOp::Equal, "name1");
		assert!(expr.evaluate(&record(&[("name", "name1")])));
		assert!(!expr.evaluate(&record(&[("name", "x")])));
		assert!(!expr.evaluate(&record(&[])));
	}

	#[test]
	fn like_matches_the_whole_value() {
		let expr = compare("name", CompareOp::Like, "nam.*");
		assert!(expr.evaluate(&record(&[("name", "name1")])));
		assert!(!expr.evaluate(&record(&[("name", "xname1")])));
		assert!(!expr.evaluate(&record(&[])));
	}

	#[test]
	fn like_with_a_broken_pattern_is_false() {
		let expr = compare("name", CompareOp::Like, "(unclosed");
		assert!(!expr.evaluate(&record(&[("name", "(unclosed")])));
	}

	#[test]
	fn and_or_over_children() {
		let a = compare("a", CompareOp::Equal, "1");
		let b = compare("b", CompareOp::Equal, "2");
		let both = record(&[("a", "1"), ("b", "2")]);
		let one = record(&[("a", "1")]);
		assert!(composite(LogicOp::And, vec![a.clone(), b.clone()]).evaluate(&both));
		assert!(!composite(LogicOp::And, vec![a.clone(), b.clone()]).evaluate(&one));
		assert!(composite(LogicOp::Or, vec![a.clone(), b.clone()]).evaluate(&one));
		assert!(!composite(LogicOp::Or, vec![b.clone()]).evaluate(&one));
		// degenerate children lists keep their boolean identities
		assert!(composite(LogicOp::And, vec![]).evaluate(&one));
		assert!(!composite(LogicOp::Or, vec![]).evaluate(&one));
	}

	#[test]
	fn not_consumes_only_its_first_child() {
		let hit = compare("a", CompareOp::Equal, "1");
		let miss = compare("a", CompareOp::Equal, "2");
		let r = record(&[("a", "1")]);
		let wide = composite(LogicOp::Not, vec![hit.clone(), miss.clone()]);
		let narrow = composite(LogicOp::Not, vec![hit.clone()]);
		assert_eq!(wide.evaluate(&r), narrow.evaluate(&r));
		assert!(composite(LogicOp::Not, vec![miss]).evaluate(&r));
		// a childless NOT negates the always-true fallback
		assert!(!composite(LogicOp::Not, vec![]).evaluate(&r));
		assert!(Expression::True.evaluate(&r));
	}

	#[test]
	fn rendering_reapplies_escapes() {
		let expr = compare("nam'e", CompareOp::Equal, "nam\"e1");
		assert_eq!(expr.to_string(), r#"('nam\'e'="nam\"e1")"#);
		let expr = compare("back\\slash", CompareOp::Equal, "C:\\temp");
		assert_eq!(expr.to_string(), r#"('back\\slash'="C:\\temp")"#);
	}

	#[test]
	fn rendering_nests_composites() {
		let expr = composite(
			LogicOp::And,
			vec![
				compare("name", CompareOp::Equal, "name1"),
				composite(LogicOp::Not, vec![compare("age", CompareOp::Like, "1.*")]),
			],
		);
		assert_eq!(
			expr.to_string(),
			r#"(AND('name'="name1")(NOT('age'~"1.*")))"#
		);
	}

	#[test]
	fn serde_round_trip() -> anyhow::Result<()> {
		let expr = composite(
			LogicOp::Or,
			vec![
				compare("city", CompareOp::Equal, "Hobbitville"),
				compare("city", CompareOp::Like, "Towns.*"),
			],
		);
		let bytes = rmp_serde::to_vec(&expr)?;
		let back: Expression = rmp_serde::from_read(bytes.as_slice())?;
		assert_eq!(expr, back);
		Ok(())
	}
}
