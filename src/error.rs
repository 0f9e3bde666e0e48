use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Every way a query can be rejected. Parsing is all-or-nothing: the
/// first error raised anywhere in the descent aborts the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("couldn't parse query {query:?}: expected a single (...) group")]
	NotAGroup { query: String },
	#[error("condition doesn't match <operator>(<condition>)..(<condition>)")]
	MalformedCondition,
	#[error("logical operator must be followed by an opening bracket")]
	MissingGroup,
	#[error("number of opening and closing brackets doesn't match")]
	UnbalancedBrackets,
	#[error("number of opening and closing single quotes doesn't match")]
	UnbalancedSingleQuotes,
	#[error("number of opening and closing double quotes doesn't match")]
	UnbalancedDoubleQuotes,
	#[error("query ends in the middle of an escape sequence")]
	DanglingEscape,
	#[error("unsupported logical operator {0:?}")]
	UnknownLogicalOperator(String),
	#[error("unsupported comparison operator {0:?}")]
	UnknownComparisonOperator(String),
	#[error("comparison must start with a quoted field name")]
	UnquotedField,
	#[error("comparison value must be double quoted")]
	UnquotedValue,
	#[error("field name may not be empty")]
	EmptyField,
	#[error("field value may not be empty")]
	EmptyValue,
	#[error("conditions nested deeper than {0} levels")]
	DepthExceeded(usize),
}
