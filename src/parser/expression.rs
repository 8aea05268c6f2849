//! Expression AST nodes
//!
//! An `Expression` is a tree structure representing code like `-123 *
//! (45.67)` as nested nodes. Every node knows the source range it came from.

use std::fmt::Display;

use ExpressionKind::*;

use crate::scanner::SourceRange;

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
	pub kind:  ExpressionKind,
	pub range: SourceRange,
}

/// Expression AST nodes
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
	Literal(Literal),
	Identifier(Identifier),
	Binary { left: Box<Expression>, operator: BinaryOperator, right: Box<Expression> },
	Unary { operator: UnaryOperator, operand: Box<Expression> },
	/// `++x`, `x--`
	Update { operator: UpdateOperator, prefix: bool, target: Identifier },
	Assignment { target: Identifier, operator: AssignOperator, value: Box<Expression> },
	/// `a, b, c`, never nested directly inside another sequence
	Sequence(Vec<Expression>),
	ArrayLiteral(Vec<Expression>),
	ElementAccess { base: Box<Expression>, index: Box<Expression> },
}

impl Expression {
	pub fn new(kind: ExpressionKind, range: SourceRange) -> Self { Self { kind, range } }

	pub fn literal(literal: Literal, range: SourceRange) -> Self { Self::new(Literal(literal), range) }

	pub fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Self {
		let range = left.range.to(right.range);
		Self::new(Binary { left: Box::new(left), operator, right: Box::new(right) }, range)
	}

	pub fn unary(operator: UnaryOperator, operand: Expression, range: SourceRange) -> Self {
		let range = range.to(operand.range);
		Self::new(Unary { operator, operand: Box::new(operand) }, range)
	}

	pub fn assignment(target: Identifier, operator: AssignOperator, value: Expression) -> Self {
		let range = target.range.to(value.range);
		Self::new(Assignment { target, operator, value: Box::new(value) }, range)
	}

	/// Append `right` to a sequence, starting one if `left` is not a sequence.
	pub fn sequence(left: Expression, right: Expression) -> Self {
		let range = left.range.to(right.range);
		match left.kind {
			Sequence(mut items) => {
				items.push(right);
				Self::new(Sequence(items), range)
			}
			_ => Self::new(Sequence(vec![left, right]), range),
		}
	}

	/// True only if every node of the tree is a constant literal.
	pub fn is_foldable(&self) -> bool {
		match &self.kind {
			Literal(literal) => !matches!(literal, self::Literal::Null),
			Identifier(_) | Update { .. } | Assignment { .. } => false,
			Binary { left, right, .. } => left.is_foldable() && right.is_foldable(),
			Unary { operand, .. } => operand.is_foldable(),
			Sequence(items) | ArrayLiteral(items) => items.iter().all(Expression::is_foldable),
			ElementAccess { base, index } => base.is_foldable() && index.is_foldable(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
	pub name:  String,
	pub range: SourceRange,
}

impl Identifier {
	pub fn new(name: impl Into<String>, range: SourceRange) -> Self { Self { name: name.into(), range } }
}

/// Literal values in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Integer(i128),
	Float(f64),
	String(String),
	Char(char),
	Null,
}

impl Literal {
	pub fn is_numeric(&self) -> bool { matches!(self, Literal::Integer(_) | Literal::Float(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
	Add,
	Subtract,
	Multiply,
	Power,
	Divide,
	Modulo,
	Equal,
	NotEqual,
	Less,
	Greater,
	LessEqual,
	GreaterEqual,
	And,
	Or,
	ShiftLeft,
	ShiftRight,
	BitAnd,
	BitOr,
	BitXor,
}

impl BinaryOperator {
	pub fn symbol(self) -> &'static str {
		use BinaryOperator::*;
		match self {
			Add => "+",
			Subtract => "-",
			Multiply => "*",
			Power => "**",
			Divide => "/",
			Modulo => "%",
			Equal => "==",
			NotEqual => "!=",
			Less => "<",
			Greater => ">",
			LessEqual => "<=",
			GreaterEqual => ">=",
			And => "&&",
			Or => "||",
			ShiftLeft => "<<",
			ShiftRight => ">>",
			BitAnd => "&",
			BitOr => "|",
			BitXor => "^",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
	Not,
	BitNot,
	Negate,
	Plus,
}

impl UnaryOperator {
	pub fn symbol(self) -> &'static str {
		match self {
			UnaryOperator::Not => "!",
			UnaryOperator::BitNot => "~",
			UnaryOperator::Negate => "-",
			UnaryOperator::Plus => "+",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
	Increment,
	Decrement,
}

impl UpdateOperator {
	pub fn symbol(self) -> &'static str {
		match self {
			UpdateOperator::Increment => "++",
			UpdateOperator::Decrement => "--",
		}
	}
}

/// `=` or a compound assignment such as `+=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
	Assign,
	Add,
	Subtract,
	Multiply,
	Divide,
	Modulo,
	ShiftLeft,
	ShiftRight,
	BitAnd,
	BitOr,
	BitXor,
}

impl AssignOperator {
	/// The operation a compound assignment applies before storing.
	pub fn binary(self) -> Option<BinaryOperator> {
		use AssignOperator::*;
		Some(match self {
			Assign => return None,
			Add => BinaryOperator::Add,
			Subtract => BinaryOperator::Subtract,
			Multiply => BinaryOperator::Multiply,
			Divide => BinaryOperator::Divide,
			Modulo => BinaryOperator::Modulo,
			ShiftLeft => BinaryOperator::ShiftLeft,
			ShiftRight => BinaryOperator::ShiftRight,
			BitAnd => BinaryOperator::BitAnd,
			BitOr => BinaryOperator::BitOr,
			BitXor => BinaryOperator::BitXor,
		})
	}

	pub fn symbol(self) -> &'static str {
		use AssignOperator::*;
		match self {
			Assign => "=",
			Add => "+=",
			Subtract => "-=",
			Multiply => "*=",
			Divide => "/=",
			Modulo => "%=",
			ShiftLeft => "<<=",
			ShiftRight => ">>=",
			BitAnd => "&=",
			BitOr => "|=",
			BitXor => "^=",
		}
	}
}

impl Display for Expression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.kind {
			Literal(literal) => write!(f, "{literal}"),
			Identifier(identifier) => write!(f, "{}", identifier.name),
			Binary { left, operator, right } => write!(f, "({} {left} {right})", operator.symbol()),
			Unary { operator, operand } => write!(f, "({} {operand})", operator.symbol()),
			Update { operator, prefix: true, target } => write!(f, "({} {})", operator.symbol(), target.name),
			Update { operator, prefix: false, target } => write!(f, "({} {})", target.name, operator.symbol()),
			Assignment { target, operator, value } => write!(f, "({} {} {value})", operator.symbol(), target.name),
			Sequence(items) => write!(f, "(, {})", join(items)),
			ArrayLiteral(items) => write!(f, "[{}]", join(items)),
			ElementAccess { base, index } => write!(f, "(index {base} {index})"),
		}
	}
}

fn join(items: &[Expression]) -> String { items.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ") }

impl Display for Literal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal::Integer(n) => write!(f, "{n}"),
			Literal::Float(n) => write!(f, "{n:?}"),
			Literal::String(s) => write!(f, "\"{s}\""),
			Literal::Char(c) => write!(f, "'{c}'"),
			Literal::Null => write!(f, "null"),
		}
	}
}
