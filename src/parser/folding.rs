//! Constant folding.
//!
//! `pennyArea = 3.14159 * (0.75 / 2) * (0.75 / 2);` => `pennyArea =
//! 0.4417860938`
//!
//! A binary node whose operands fold to numeric literals is replaced by one
//! literal computed with the host operator. Folding works bottom-up and
//! returns a new tree, so folding a folded tree changes nothing. Operations
//! the host cannot evaluate exactly (overflow, division by zero, shifts out of
//! range, non-finite results) are left for run time.

use crate::{
	parser::expression::{BinaryOperator, Expression, ExpressionKind::*, Literal},
	statement::{Declaration, Program, Statement},
	types::Type,
};

pub fn fold_program(program: Program) -> Program {
	Program { file: program.file, body: program.body.into_iter().map(fold_statement).collect() }
}

fn fold_statement(statement: Statement) -> Statement {
	match statement {
		Statement::Expression(expression) => Statement::Expression(fold_expression(expression)),
		Statement::Declaration(declaration) => Statement::Declaration(Declaration {
			declared_type: fold_type(declaration.declared_type),
			initializer: declaration.initializer.map(fold_expression),
			..declaration
		}),
		empty @ Statement::Empty(_) => empty,
	}
}

/// Array length expressions are folded too.
fn fold_type(ty: Type) -> Type {
	match ty {
		Type::Array { element, length } => Type::Array {
			element: Box::new(fold_type(*element)),
			length:  length.map(|length| Box::new(fold_expression(*length))),
		},
		Type::Union(members) => Type::Union(members.into_iter().map(fold_type).collect()),
		other => other,
	}
}

pub fn fold_expression(expression: Expression) -> Expression {
	let Expression { kind, range } = expression;
	let kind = match kind {
		Binary { left, operator, right } => {
			let left = fold_expression(*left);
			let right = fold_expression(*right);
			if let (Literal(l), Literal(r)) = (&left.kind, &right.kind) {
				if let Some(value) = evaluate(operator, l, r) {
					return Expression::literal(value, range);
				}
			}
			Binary { left: Box::new(left), operator, right: Box::new(right) }
		}
		Unary { operator, operand } => Unary { operator, operand: Box::new(fold_expression(*operand)) },
		Assignment { target, operator, value } => Assignment { target, operator, value: Box::new(fold_expression(*value)) },
		Sequence(items) => Sequence(items.into_iter().map(fold_expression).collect()),
		ArrayLiteral(items) => ArrayLiteral(items.into_iter().map(fold_expression).collect()),
		ElementAccess { base, index } => {
			ElementAccess { base: Box::new(fold_expression(*base)), index: Box::new(fold_expression(*index)) }
		}
		leaf @ (Literal(_) | Identifier(_) | Update { .. }) => leaf,
	};
	Expression::new(kind, range)
}

fn evaluate(operator: BinaryOperator, left: &Literal, right: &Literal) -> Option<Literal> {
	match (left, right) {
		(Literal::Integer(l), Literal::Integer(r)) => integer(operator, *l, *r),
		(Literal::Integer(l), Literal::Float(r)) => float(operator, *l as f64, *r),
		(Literal::Float(l), Literal::Integer(r)) => float(operator, *l, *r as f64),
		(Literal::Float(l), Literal::Float(r)) => float(operator, *l, *r),
		_ => None,
	}
}

fn truth(value: bool) -> Option<Literal> { Some(Literal::Integer(value as i128)) }

fn integer(operator: BinaryOperator, l: i128, r: i128) -> Option<Literal> {
	use BinaryOperator::*;
	let value = match operator {
		Add => l.checked_add(r)?,
		Subtract => l.checked_sub(r)?,
		Multiply => l.checked_mul(r)?,
		Divide => l.checked_div(r)?,
		Modulo => l.checked_rem(r)?,
		Power => l.checked_pow(u32::try_from(r).ok()?)?,
		ShiftLeft => l.checked_shl(u32::try_from(r).ok()?).filter(|&shifted| shifted >> r == l)?,
		ShiftRight => l.checked_shr(u32::try_from(r).ok()?)?,
		BitAnd => l & r,
		BitOr => l | r,
		BitXor => l ^ r,
		Equal => return truth(l == r),
		NotEqual => return truth(l != r),
		Less => return truth(l < r),
		Greater => return truth(l > r),
		LessEqual => return truth(l <= r),
		GreaterEqual => return truth(l >= r),
		And => return truth(l != 0 && r != 0),
		Or => return truth(l != 0 || r != 0),
	};
	Some(Literal::Integer(value))
}

fn float(operator: BinaryOperator, l: f64, r: f64) -> Option<Literal> {
	use BinaryOperator::*;
	let value = match operator {
		Add => l + r,
		Subtract => l - r,
		Multiply => l * r,
		Divide => l / r,
		Modulo => l % r,
		Power => l.powf(r),
		Equal => return truth(l == r),
		NotEqual => return truth(l != r),
		Less => return truth(l < r),
		Greater => return truth(l > r),
		LessEqual => return truth(l <= r),
		GreaterEqual => return truth(l >= r),
		And => return truth(l != 0.0 && r != 0.0),
		Or => return truth(l != 0.0 || r != 0.0),
		ShiftLeft | ShiftRight | BitAnd | BitOr | BitXor => return None,
	};
	value.is_finite().then_some(Literal::Float(value))
}
