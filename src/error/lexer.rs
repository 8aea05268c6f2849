use crate::scanner::Location;

/// A specific scanning error with its location and type.
#[derive(thiserror::Error, Debug)]
#[error("{location}: LexError: {type}")]
pub struct LexError {
	/// Where the offending lexeme starts.
	location: Location,
	/// The type of scanning error.
	r#type:   LexErrorType,
}

impl LexError {
	pub fn new(location: Location, r#type: LexErrorType) -> Self { Self { location, r#type } }

	pub fn location(&self) -> &Location { &self.location }

	pub fn r#type(&self) -> &LexErrorType { &self.r#type }
}

/// Types of scanning errors.
#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorType {
	/// Error for unterminated block comments.
	UnterminatedBlockComment,
	/// Error for characters outside the lexical grammar.
	UnknownCharacter(char),
	/// A second `.` inside one number literal.
	MultipleDecimalPoints,
	/// A `.` with no digit after it.
	MissingFractionDigits,
	/// An integer literal too large to represent at all.
	IntegerTooLarge,
	/// Error for unterminated strings.
	UnterminatedString,
	/// Error for unterminated chars.
	UnterminatedChar,
	/// A char literal holding more than one character.
	OverlongChar,
	/// `''`
	EmptyChar,
}

impl LexErrorType {
	pub fn hint(&self) -> Option<&'static str> {
		use LexErrorType::*;
		match self {
			OverlongChar => Some("use double quotes for a string literal"),
			MissingFractionDigits => Some("write a digit after the decimal point, e.g. `1.0`"),
			UnterminatedString => Some("close the string with `\"` before the end of the line"),
			UnterminatedChar => Some("close the char with `'` before the end of the line"),
			UnterminatedBlockComment => Some("close the comment with `*/`"),
			_ => None,
		}
	}
}

impl std::fmt::Display for LexErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use LexErrorType::*;
		match self {
			UnterminatedBlockComment => {
				write!(f, "Unterminated block comment")
			}
			UnknownCharacter(c) => {
				write!(f, "Unknown character '{c}' (U+{:04X})", *c as u32)
			}
			MultipleDecimalPoints => write!(f, "Multiple decimal points in a number literal"),
			MissingFractionDigits => write!(f, "Expected a digit after the decimal point"),
			IntegerTooLarge => write!(f, "Integer literal is too large to represent"),
			UnterminatedString => {
				write!(f, "Unterminated string literal")
			}
			UnterminatedChar => write!(f, "Unterminated char literal"),
			OverlongChar => write!(f, "Char literal holds more than one character"),
			EmptyChar => write!(f, "Empty char literal"),
		}
	}
}
