//! Static checking of a parsed program.
//!
//! The checker walks the AST once, resolving every name against the
//! [`Environment`] and computing the type of every expression. The first
//! violated rule ends the walk; integer literals that fit no 64-bit type are
//! only reported as warnings.
//!
//! # Rules
//!
//! - **Names**: reading a name requires a visible, initialized binding.
//! - **Assignment**: the target must be mutable, and the value's type must be
//!   accepted by the declared type. Assignments have no value of their own.
//! - **Arithmetic**: numeric operands, `double` if either side may be a float.
//!   `str + str` and `str * int` build strings.
//! - **Comparison and logic**: yield `u1`.
//! - **Bitwise**: integer operands only.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
	environment::{Environment, Variable},
	error::{Diagnostics, FuguError, NameError, NameErrorType, TypeError, TypeErrorType, Warning, WarningType},
	parser::expression::{AssignOperator, BinaryOperator, Expression, ExpressionKind::*, Identifier, Literal, UnaryOperator, UpdateOperator},
	scanner::{Location, SourceRange},
	statement::{Declaration, Program, Statement},
	types::{FloatWidth, IntWidth, Type},
};

pub struct TypeChecker<'a> {
	environment: &'a mut Environment,
	diagnostics: &'a mut Diagnostics,
	/// Source name of the program being checked.
	file:        Arc<str>,
}

impl<'a> TypeChecker<'a> {
	pub fn new(environment: &'a mut Environment, diagnostics: &'a mut Diagnostics) -> Self {
		Self { environment, diagnostics, file: Arc::from("") }
	}

	/// Check every statement in order, stopping at the first error.
	pub fn check(&mut self, program: &Program) -> Result<(), FuguError> {
		self.file = program.file.clone();
		for statement in &program.body {
			self.statement(statement)?;
		}
		debug!(
			file = %self.file,
			statements = program.body.len(),
			warnings = self.diagnostics.warning_count(),
			"checked program"
		);
		Ok(())
	}

	fn statement(&mut self, statement: &Statement) -> Result<(), FuguError> {
		match statement {
			Statement::Expression(expression) => self.expression(expression).map(drop),
			Statement::Declaration(declaration) => self.declaration(declaration),
			Statement::Empty(_) => Ok(()),
		}
	}

	fn declaration(&mut self, declaration: &Declaration) -> Result<(), FuguError> {
		let Declaration { mutable, declared_type, names, initializer, .. } = declaration;
		self.array_lengths(declared_type)?;
		if let Some(initializer) = initializer {
			let ty = self.expression(initializer)?;
			if !declared_type.accepts(&ty) {
				return Err(self.mismatch(initializer.range, declared_type, &ty));
			}
		}
		for name in names {
			let variable = Variable::new(declared_type.clone(), *mutable, initializer.is_some());
			if self.environment.define(&name.name, variable).is_err() {
				return Err(self.name_error(name.range, NameErrorType::AlreadyDeclared(name.name.clone())));
			}
			trace!(name = %name.name, ty = %declared_type, "declared");
		}
		Ok(())
	}

	/// Every length written in a declared type must be an integer.
	fn array_lengths(&mut self, ty: &Type) -> Result<(), FuguError> {
		match ty {
			Type::Array { element, length } => {
				if let Some(length) = length {
					let found = self.expression(length)?;
					if !found.is_integer() {
						return Err(self.type_error(length.range, TypeErrorType::InvalidArrayLength(found.to_string())));
					}
				}
				self.array_lengths(element)
			}
			Type::Union(members) => members.iter().try_for_each(|member| self.array_lengths(member)),
			_ => Ok(()),
		}
	}

	/// The static type of `expression`.
	pub fn expression(&mut self, expression: &Expression) -> Result<Type, FuguError> {
		let range = expression.range;
		match &expression.kind {
			Literal(literal) => Ok(self.literal(literal, range)),
			Identifier(identifier) => {
				let variable = self.variable(identifier)?;
				if !variable.initialized {
					return Err(self.type_error(range, TypeErrorType::UninitializedVariable(identifier.name.clone())));
				}
				Ok(variable.ty)
			}
			Unary { operator, operand } => {
				let ty = self.expression(operand)?;
				self.unary(*operator, ty, range)
			}
			Binary { left, operator, right } => {
				let left = self.expression(left)?;
				let right = self.expression(right)?;
				self.binary(*operator, &left, &right, range)
			}
			Update { operator, target, .. } => self.update(*operator, target, range),
			Assignment { target, operator, value } => self.assignment(target, *operator, value),
			Sequence(items) => {
				let mut last = Type::Null;
				for item in items {
					last = self.expression(item)?;
				}
				Ok(last)
			}
			ArrayLiteral(items) => {
				let elements = items.iter().map(|item| self.expression(item)).collect::<Result<Vec<_>, _>>()?;
				Ok(Type::array(Type::union_by_kind(elements), None))
			}
			ElementAccess { base, index } => {
				let base_type = self.expression(base)?;
				let element = match &base_type {
					Type::Array { element, .. } => element.as_ref().clone(),
					Type::String => Type::Char,
					other => return Err(self.type_error(base.range, TypeErrorType::NotIndexable(other.to_string()))),
				};
				let index_type = self.expression(index)?;
				if !index_type.is_integer() {
					return Err(self.type_error(index.range, TypeErrorType::InvalidIndex(index_type.to_string())));
				}
				Ok(element)
			}
		}
	}

	fn literal(&mut self, literal: &Literal, range: SourceRange) -> Type {
		match literal {
			Literal::Integer(value) => match IntWidth::of_literal(*value) {
				Some(width) => Type::Integer(width),
				None => {
					let warning = Warning::new(self.location(range), WarningType::IntegerOverflow { literal: *value });
					self.diagnostics.warn(warning);
					Type::Integer(if *value > 0 { IntWidth::U64 } else { IntWidth::I64 })
				}
			},
			Literal::Float(_) => Type::Float(FloatWidth::F64),
			Literal::String(_) => Type::String,
			Literal::Char(_) => Type::Char,
			Literal::Null => Type::Null,
		}
	}

	fn unary(&self, operator: UnaryOperator, ty: Type, range: SourceRange) -> Result<Type, FuguError> {
		let valid = match operator {
			UnaryOperator::Negate | UnaryOperator::Plus => ty.is_numeric(),
			UnaryOperator::BitNot => ty.is_integer(),
			UnaryOperator::Not => ty != Type::Null,
		};
		if !valid {
			let found = ty.to_string();
			return Err(self.type_error(range, TypeErrorType::InvalidUnaryOperand { operator: operator.symbol(), found }));
		}
		Ok(if operator == UnaryOperator::Not { Type::Integer(IntWidth::U1) } else { ty })
	}

	fn binary(&self, operator: BinaryOperator, left: &Type, right: &Type, range: SourceRange) -> Result<Type, FuguError> {
		use BinaryOperator::*;
		let truth = Type::Integer(IntWidth::U1);
		let result = match operator {
			Add if *left == Type::String && *right == Type::String => Some(Type::String),
			Multiply if (*left == Type::String && right.is_integer()) || (left.is_integer() && *right == Type::String) => {
				Some(Type::String)
			}
			Add | Subtract | Multiply | Divide | Modulo | Power => arithmetic(left, right),
			Less | Greater | LessEqual | GreaterEqual => {
				let comparable = (left.is_numeric() && right.is_numeric())
					|| (*left == Type::String && *right == Type::String)
					|| (*left == Type::Char && *right == Type::Char);
				comparable.then_some(truth)
			}
			Equal | NotEqual => Some(truth),
			And | Or => (*left != Type::Null && *right != Type::Null).then_some(truth),
			ShiftLeft | ShiftRight | BitAnd | BitOr | BitXor => {
				if left.is_integer() && right.is_integer() { integer(left, right) } else { None }
			}
		};
		result.ok_or_else(|| {
			self.type_error(range, TypeErrorType::InvalidBinaryOperands {
				operator: operator.symbol(),
				left:     left.to_string(),
				right:    right.to_string(),
			})
		})
	}

	fn update(&mut self, operator: UpdateOperator, target: &Identifier, range: SourceRange) -> Result<Type, FuguError> {
		let variable = self.variable(target)?;
		let operator = operator.symbol();
		if !variable.mutable {
			return Err(self.type_error(range, TypeErrorType::ImmutableAssignment(target.name.clone())));
		}
		if !variable.initialized {
			return Err(self.type_error(range, TypeErrorType::UninitializedUpdate { operator, name: target.name.clone() }));
		}
		if !variable.ty.is_numeric() {
			let found = variable.ty.to_string();
			return Err(self.type_error(range, TypeErrorType::InvalidUpdateOperand { operator, found }));
		}
		Ok(variable.ty)
	}

	fn assignment(&mut self, target: &Identifier, operator: AssignOperator, value: &Expression) -> Result<Type, FuguError> {
		let variable = self.variable(target)?;
		if !variable.mutable {
			return Err(self.type_error(target.range, TypeErrorType::ImmutableAssignment(target.name.clone())));
		}
		let value_type = match operator.binary() {
			None => self.expression(value)?,
			Some(binary) => {
				if !variable.initialized {
					let error = TypeErrorType::UninitializedVariable(target.name.clone());
					return Err(self.type_error(target.range, error));
				}
				let right = self.expression(value)?;
				self.binary(binary, &variable.ty, &right, target.range.to(value.range))?
			}
		};
		if !variable.ty.accepts(&value_type) {
			return Err(self.mismatch(value.range, &variable.ty, &value_type));
		}
		self.environment.mark_initialized(&target.name);
		Ok(Type::Null)
	}

	fn variable(&self, identifier: &Identifier) -> Result<Variable, FuguError> {
		self.environment
			.get(&identifier.name)
			.cloned()
			.ok_or_else(|| self.name_error(identifier.range, NameErrorType::Undeclared(identifier.name.clone())))
	}

	fn location(&self, range: SourceRange) -> Location { Location::new(self.file.clone(), range) }

	fn type_error(&self, range: SourceRange, r#type: TypeErrorType) -> FuguError {
		TypeError::new(self.location(range), r#type).into()
	}

	fn name_error(&self, range: SourceRange, r#type: NameErrorType) -> FuguError {
		NameError::new(self.location(range), r#type).into()
	}

	fn mismatch(&self, range: SourceRange, expected: &Type, found: &Type) -> FuguError {
		self.type_error(range, TypeErrorType::Mismatch { expected: expected.to_string(), found: found.to_string() })
	}
}

/// Result of an arithmetic operator over numeric operands.
fn arithmetic(left: &Type, right: &Type) -> Option<Type> {
	if !left.is_numeric() || !right.is_numeric() {
		return None;
	}
	if left.may_be_float() || right.may_be_float() {
		return Some(Type::Float(FloatWidth::F64));
	}
	integer(left, right)
}

fn integer(left: &Type, right: &Type) -> Option<Type> {
	let (left, right) = left.integer_width().zip(right.integer_width())?;
	Some(Type::Integer(left.wider(right)))
}
