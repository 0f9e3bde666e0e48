use std::str::CharIndices;

use crate::error::{ParseError, Result};

/// Walks the body of a composite condition and yields each immediate
/// child `(...)` span, leaving whatever is inside the spans untouched.
/// Quotes and escapes are tracked so that the balance checks at the end
/// of the walk can tell structural characters from literal ones; an
/// unescaped bracket still counts even between quotes, so brackets that
/// belong to a field name or value must be escaped.
pub struct Scanner<'a> {
	input: &'a str,
	chars: CharIndices<'a>,
	opening: usize,
	closing: usize,
	in_field: bool,
	in_value: bool,
	in_escape: bool,
	start: Option<usize>,
	after_group: bool,
	started: bool,
	done: bool,
}

impl<'a> From<&'a str> for Scanner<'a> {
	fn from(input: &'a str) -> Self {
		Self {
			input,
			chars: input.char_indices(),
			opening: 0,
			closing: 0,
			in_field: false,
			in_value: false,
			in_escape: false,
			start: None,
			after_group: false,
			started: false,
			done: false,
		}
	}
}

impl<'a> Iterator for Scanner<'a> {
	type Item = Result<&'a str>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		if !self.started {
			self.started = true;
			if !self.input.starts_with('(') {
				return self.fail(ParseError::MissingGroup);
			}
		}
		while let Some((i, c)) = self.chars.next() {
			if self.after_group {
				// child groups must be contiguous
				self.after_group = false;
				if c != '(' {
					return self.fail(ParseError::MalformedCondition);
				}
			}
			match c {
				'\\' => self.in_escape = !self.in_escape,
				'(' => {
					if self.in_escape {
						self.in_escape = false;
					} else {
						self.opening += 1;
					}
					if self.start.is_none() {
						self.start = Some(i);
					}
				}
				')' => {
					if self.in_escape {
						self.in_escape = false;
					} else {
						self.closing += 1;
						if self.closing > self.opening {
							return self.fail(ParseError::UnbalancedBrackets);
						}
						if self.closing == self.opening {
							let start = self.start.take().unwrap_or(0);
							self.after_group = true;
							return Some(Ok(&self.input[start..=i]));
						}
					}
				}
				'"' => {
					if self.in_escape {
						self.in_escape = false;
					} else {
						self.in_value = !self.in_value;
					}
				}
				'\'' => {
					if self.in_escape {
						self.in_escape = false;
					} else {
						self.in_field = !self.in_field;
					}
				}
				_ => self.in_escape = false,
			}
		}
		self.done = true;
		self.final_check().err().map(Err)
	}
}

impl Scanner<'_> {
	fn fail<T>(&mut self, err: ParseError) -> Option<Result<T>> {
		self.done = true;
		Some(Err(err))
	}

	fn final_check(&self) -> Result<()> {
		if self.opening != self.closing {
			Err(ParseError::UnbalancedBrackets)
		} else if self.in_field {
			Err(ParseError::UnbalancedSingleQuotes)
		} else if self.in_value {
			Err(ParseError::UnbalancedDoubleQuotes)
		} else if self.in_escape {
			Err(ParseError::DanglingEscape)
		} else {
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scan(input: &str) -> Result<Vec<&str>> {
		Scanner::from(input).collect()
	}

	#[test]
	fn splits_child_groups() {
		let cases = [
			("('a'=\"b\")", Ok(vec!["('a'=\"b\")"])),
			("(x)(y)(z)", Ok(vec!["(x)", "(y)", "(z)"])),
			("((x)(y))(z)", Ok(vec!["((x)(y))", "(z)"])),
			("(par\\(en)", Ok(vec!["(par\\(en)"])),
			("('clo\\)se')", Ok(vec!["('clo\\)se')"])),
			("", Err(ParseError::MissingGroup)),
			("x(y)", Err(ParseError::MissingGroup)),
			("(x)y", Err(ParseError::MalformedCondition)),
			("(x) (y)", Err(ParseError::MalformedCondition)),
			("(x", Err(ParseError::UnbalancedBrackets)),
			("(x)(", Err(ParseError::UnbalancedBrackets)),
			// quotes do not shield an unescaped bracket
			("('a(b'=\"c\")", Err(ParseError::UnbalancedBrackets)),
			("('a)", Err(ParseError::UnbalancedSingleQuotes)),
			("(\"a)", Err(ParseError::UnbalancedDoubleQuotes)),
		];
		for (input, expected) in cases {
			assert_eq!(scan(input), expected, "scanning {input:?}");
		}
	}

	#[test]
	fn spans_keep_their_offsets() {
		let input = "(one)(two)";
		let spans: Vec<&str> = Scanner::from(input).map(Result::unwrap).collect();
		assert_eq!(spans, vec!["(one)", "(two)"]);
		// the spans borrow from the scanned input
		assert_eq!(input.find(spans[1]), Some(5));
	}
}
