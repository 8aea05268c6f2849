use crate::scanner::Location;

/// A name that does not resolve, or resolves twice.
#[derive(thiserror::Error, Debug)]
#[error("{location}: NameError: {type}")]
pub struct NameError {
	location: Location,
	r#type:   NameErrorType,
}

impl NameError {
	pub fn new(location: Location, r#type: NameErrorType) -> Self { Self { location, r#type } }

	pub fn location(&self) -> &Location { &self.location }

	pub fn r#type(&self) -> &NameErrorType { &self.r#type }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NameErrorType {
	Undeclared(String),
	AlreadyDeclared(String),
}

impl std::fmt::Display for NameErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use NameErrorType::*;
		match self {
			Undeclared(name) => write!(f, "'{name}' is not declared"),
			AlreadyDeclared(name) => write!(f, "'{name}' is already declared in this scope"),
		}
	}
}

#[derive(thiserror::Error, Debug)]
#[error("{location}: TypeError: {type}")]
pub struct TypeError {
	location: Location,
	r#type:   TypeErrorType,
}

impl TypeError {
	pub fn new(location: Location, r#type: TypeErrorType) -> Self { Self { location, r#type } }

	pub fn location(&self) -> &Location { &self.location }

	pub fn r#type(&self) -> &TypeErrorType { &self.r#type }
}

/// Types are carried pre-rendered so errors stay independent of the AST.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeErrorType {
	Mismatch { expected: String, found: String },
	ImmutableAssignment(String),
	UninitializedVariable(String),
	UninitializedUpdate { operator: &'static str, name: String },
	InvalidUpdateOperand { operator: &'static str, found: String },
	InvalidUnaryOperand { operator: &'static str, found: String },
	InvalidBinaryOperands { operator: &'static str, left: String, right: String },
	NotIndexable(String),
	InvalidIndex(String),
	InvalidArrayLength(String),
}

impl TypeErrorType {
	pub fn hint(&self) -> Option<&'static str> {
		use TypeErrorType::*;
		match self {
			ImmutableAssignment(_) => Some("declare the variable with `mut` to allow assignment"),
			UninitializedVariable(_) | UninitializedUpdate { .. } => Some("assign a value to the variable first"),
			InvalidIndex(_) | InvalidArrayLength(_) => Some("an integer expression"),
			_ => None,
		}
	}
}

impl std::fmt::Display for TypeErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use TypeErrorType::*;
		match self {
			Mismatch { expected, found } => {
				write!(f, "Type mismatch: cannot use a value of type '{found}' where '{expected}' is expected")
			}
			ImmutableAssignment(name) => write!(f, "Cannot assign to constant '{name}'"),
			UninitializedVariable(name) => write!(f, "Variable '{name}' is used before being initialized"),
			UninitializedUpdate { operator, name } => {
				write!(f, "Cannot apply '{operator}' to '{name}' because it has not been initialized")
			}
			InvalidUpdateOperand { operator, found } => {
				write!(f, "Cannot apply '{operator}' to a value of type '{found}'")
			}
			InvalidUnaryOperand { operator, found } => {
				write!(f, "Unary '{operator}' is not defined for type '{found}'")
			}
			InvalidBinaryOperands { operator, left, right } => {
				write!(f, "Operator '{operator}' is not defined for types '{left}' and '{right}'")
			}
			NotIndexable(found) => write!(f, "A value of type '{found}' cannot be indexed"),
			InvalidIndex(found) => write!(f, "Index must be an integer, found '{found}'"),
			InvalidArrayLength(found) => write!(f, "Array length must be an integer, found '{found}'"),
		}
	}
}
