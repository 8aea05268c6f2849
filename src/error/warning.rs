use tracing::warn;

use super::{Category, Diagnostic, Severity};
use crate::scanner::Location;

/// A non-fatal finding; compilation continues after it is recorded.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{location}: OverflowWarning: {type}")]
pub struct Warning {
	location: Location,
	r#type:   WarningType,
}

impl Warning {
	pub fn new(location: Location, r#type: WarningType) -> Self { Self { location, r#type } }

	pub fn location(&self) -> &Location { &self.location }

	pub fn r#type(&self) -> &WarningType { &self.r#type }

	pub fn diagnostic(&self) -> Diagnostic {
		Diagnostic {
			severity: Severity::Warning,
			category: Category::Overflow,
			message:  self.r#type.to_string(),
			location: self.location.clone(),
			hint:     Some("the value is reduced modulo 2^64 when encoded".to_string()),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarningType {
	IntegerOverflow { literal: i128 },
}

impl std::fmt::Display for WarningType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			WarningType::IntegerOverflow { literal } => {
				write!(f, "Integer literal {literal} does not fit in any 64-bit integer type")
			}
		}
	}
}

/// Collects warnings for one compiled unit.
#[derive(Debug, Default)]
pub struct Diagnostics {
	warnings: Vec<Warning>,
}

impl Diagnostics {
	pub fn new() -> Self { Self::default() }

	pub fn warn(&mut self, warning: Warning) {
		warn!(%warning, "compiler warning");
		self.warnings.push(warning);
	}

	pub fn warning_count(&self) -> usize { self.warnings.len() }

	pub fn warnings(&self) -> &[Warning] { &self.warnings }

	pub fn into_warnings(self) -> Vec<Warning> { self.warnings }
}
