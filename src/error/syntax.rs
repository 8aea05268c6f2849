use crate::scanner::Location;

#[derive(thiserror::Error, Debug)]
#[error("{location}: SyntaxError: {type}")]
pub struct SyntaxError {
	location: Location,
	r#type:   SyntaxErrorType,
}

impl SyntaxError {
	pub fn new(location: Location, r#type: SyntaxErrorType) -> Self { Self { location, r#type } }

	pub fn location(&self) -> &Location { &self.location }

	pub fn r#type(&self) -> &SyntaxErrorType { &self.r#type }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxErrorType {
	/// An operand position held something that cannot start an expression.
	ExpectedExpression { found: String },
	ExpectedToken { expected: &'static str, found: String },
	ExpectedIdentifier { found: String },
	ExpectedType { found: String },
	/// `()`
	EmptyParentheses,
	/// `++`/`--` applied to something other than a variable name.
	InvalidUpdateTarget { operator: &'static str },
	InvalidAssignmentTarget { operator: &'static str },
	MissingConstInitializer { names: Vec<String> },
	/// Reserved keyword of a construct the compiler does not support.
	Unsupported { keyword: String },
}

impl SyntaxErrorType {
	pub fn hint(&self) -> Option<&'static str> {
		use SyntaxErrorType::*;
		match self {
			ExpectedExpression { .. } => Some("a literal, a variable name or a parenthesized expression"),
			EmptyParentheses => Some("put an expression between the parentheses"),
			MissingConstInitializer { .. } => Some("give the constant a value with `= <expression>`"),
			InvalidUpdateTarget { .. } | InvalidAssignmentTarget { .. } => Some("a variable name"),
			_ => None,
		}
	}
}

impl std::fmt::Display for SyntaxErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use SyntaxErrorType::*;
		match self {
			ExpectedExpression { found } => {
				write!(f, "Expected an expression but got {found}")
			}
			ExpectedToken { expected, found } => write!(f, "Expected '{expected}' but got {found}"),
			ExpectedIdentifier { found } => write!(f, "Expected a variable name but got {found}"),
			ExpectedType { found } => write!(f, "Expected a type but got {found}"),
			EmptyParentheses => write!(f, "Expected an expression inside the parentheses"),
			InvalidUpdateTarget { operator } => {
				write!(f, "The operand of '{operator}' must be a variable")
			}
			InvalidAssignmentTarget { operator } => {
				write!(f, "The left side of '{operator}' must be a variable")
			}
			MissingConstInitializer { names } => {
				write!(f, "Expected an initializer after a const declaration to specify {}'s value", names.join(", "))
			}
			Unsupported { keyword } => write!(f, "'{keyword}' is not supported"),
		}
	}
}
