//! There is no place in the grammar where both an expression and a statement
//! are allowed. The operands of, say, `+` are always expressions, never
//! statements.

use std::{fmt::Display, sync::Arc};

use crate::{
	parser::expression::{Expression, Identifier},
	scanner::SourceRange,
	types::Type,
};

/// A statement in the programming language.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
	/// An expression used as a statement.
	Expression(Expression),
	/// A variable declaration statement.
	Declaration(Declaration),
	/// A lone `;`, never kept in a program body.
	Empty(SourceRange),
}

/// `mut a, b: int = 1;` or `const c: str = "c";`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
	pub mutable:       bool,
	pub declared_type: Type,
	pub names:         Vec<Identifier>,
	/// Shared by every declared name.
	pub initializer:   Option<Expression>,
	pub range:         SourceRange,
}

impl Statement {
	pub fn range(&self) -> SourceRange {
		match self {
			Statement::Expression(expression) => expression.range,
			Statement::Declaration(declaration) => declaration.range,
			Statement::Empty(range) => *range,
		}
	}
}

/// A parsed compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
	/// Name the unit's diagnostics are reported against.
	pub file: Arc<str>,
	pub body: Vec<Statement>,
}

impl Display for Statement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Statement::Expression(expression) => write!(f, "{expression};"),
			Statement::Declaration(Declaration { mutable, declared_type, names, initializer, .. }) => {
				let keyword = if *mutable { "mut" } else { "const" };
				let names: Vec<&str> = names.iter().map(|name| name.name.as_str()).collect();
				write!(f, "({keyword} {}: {declared_type}", names.join(" "))?;
				if let Some(initializer) = initializer {
					write!(f, " = {initializer}")?;
				}
				write!(f, ")")
			}
			Statement::Empty(_) => write!(f, ";"),
		}
	}
}

impl Display for Program {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let statements: Vec<String> = self.body.iter().map(ToString::to_string).collect();
		write!(f, "{}", statements.join("\n"))
	}
}
