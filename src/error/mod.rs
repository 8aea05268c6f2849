pub mod checker;
pub mod lexer;
pub mod report;
pub mod syntax;
pub mod warning;

use std::fmt::Display;

pub use checker::{NameError, NameErrorType, TypeError, TypeErrorType};
pub use lexer::{LexError, LexErrorType};
pub use syntax::{SyntaxError, SyntaxErrorType};
pub use warning::{Diagnostics, Warning, WarningType};

use crate::scanner::Location;

/// FuguError is the top-level error type for the compiler.
#[derive(thiserror::Error, Debug)]
pub enum FuguError {
	/// Internal compiler error, a broken contract between pipeline stages
	#[error("CompilerInternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	/// Malformed input found by the scanner
	#[error(transparent)]
	Lex(#[from] LexError),
	/// Token sequence the parser cannot accept
	#[error(transparent)]
	Syntax(#[from] SyntaxError),
	/// Unresolved or duplicated name
	#[error(transparent)]
	Name(#[from] NameError),
	/// Type rule violation
	#[error(transparent)]
	Type(#[from] TypeError),
	/// Warning policy refused code generation
	#[error("Stopped before code generation: {count} warnings exceed the limit of {limit}")]
	TooManyWarnings { count: usize, limit: usize },
}

impl FuguError {
	/// Whether this is a compiler bug rather than a mistake in the compiled source.
	pub fn is_internal(&self) -> bool { matches!(self, FuguError::InternalError(_)) }

	pub fn category(&self) -> Option<Category> {
		match self {
			FuguError::Lex(_) => Some(Category::Lex),
			FuguError::Syntax(_) => Some(Category::Syntax),
			FuguError::Name(_) => Some(Category::Name),
			FuguError::Type(_) => Some(Category::Type),
			FuguError::InternalError(_) | FuguError::TooManyWarnings { .. } => None,
		}
	}

	/// Structured record of a user-facing error, `None` for errors without a
	/// source location.
	pub fn diagnostic(&self) -> Option<Diagnostic> {
		let (category, location, message, hint) = match self {
			FuguError::Lex(e) => (Category::Lex, e.location(), e.r#type().to_string(), e.r#type().hint()),
			FuguError::Syntax(e) => (Category::Syntax, e.location(), e.r#type().to_string(), e.r#type().hint()),
			FuguError::Name(e) => (Category::Name, e.location(), e.r#type().to_string(), None),
			FuguError::Type(e) => (Category::Type, e.location(), e.r#type().to_string(), e.r#type().hint()),
			FuguError::InternalError(_) | FuguError::TooManyWarnings { .. } => return None,
		};
		Some(Diagnostic {
			severity: Severity::Error,
			category,
			message,
			location: location.clone(),
			hint: hint.map(str::to_string),
		})
	}

	/// Render the error against the source it was produced from.
	pub fn render(&self, source: &str) -> String {
		match self.diagnostic() {
			Some(diagnostic) => report::render(&diagnostic, source),
			None => self.to_string(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	Error,
	Warning,
}

/// Diagnostic categories visible to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
	Lex,
	Syntax,
	Name,
	Type,
	Overflow,
}

impl Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use Category::*;
		match self {
			Lex => write!(f, "LexError"),
			Syntax => write!(f, "SyntaxError"),
			Name => write!(f, "NameError"),
			Type => write!(f, "TypeError"),
			Overflow => write!(f, "OverflowWarning"),
		}
	}
}

/// A single diagnostic record, independent of how it is presented.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
	pub severity: Severity,
	pub category: Category,
	pub message:  String,
	pub location: Location,
	/// What the compiler expected instead, when that is known
	pub hint:     Option<String>,
}
