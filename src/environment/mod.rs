use std::collections::HashMap;

use crate::types::Type;

/// Static bindings visible to the type checker. Clone it to get an
/// independent snapshot.
#[derive(Default, Debug, Clone)]
pub struct Environment {
	variables:  HashMap<String, Variable>,
	procedures: HashMap<String, Procedure>,
	pub outer:  Option<Box<Environment>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
	pub ty:          Type,
	pub mutable:     bool,
	pub initialized: bool,
}

impl Variable {
	pub fn new(ty: Type, mutable: bool, initialized: bool) -> Self { Self { ty, mutable, initialized } }
}

/// Signature of a callable. Nothing in the language declares one yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
	pub parameters: Vec<Type>,
	pub returns:    Type,
}

impl Environment {
	pub fn new() -> Self { Self::default() }

	/// Child scope owning `self` as its parent.
	pub fn enclose(self) -> Self { Self { outer: Some(Box::new(self)), ..Self::default() } }

	/// Drop the current scope, returning its parent.
	pub fn into_outer(self) -> Option<Self> { self.outer.map(|outer| *outer) }

	/// Unlike a runtime environment, a name may be bound only once per scope.
	/// Returns the rejected variable when the name is taken.
	pub fn define(&mut self, name: &str, variable: Variable) -> Result<(), Variable> {
		if self.variables.contains_key(name) {
			return Err(variable);
		}
		self.variables.insert(name.to_string(), variable);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&Variable> {
		self.variables.get(name).or_else(|| self.outer.as_ref().and_then(|env| env.get(name)))
	}

	fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
		match self.variables.get_mut(name) {
			Some(variable) => Some(variable),
			None => self.outer.as_mut().and_then(|env| env.get_mut(name)),
		}
	}

	/// Flip the nearest binding of `name` to initialized, false if there is
	/// none.
	pub fn mark_initialized(&mut self, name: &str) -> bool {
		self.get_mut(name).map(|variable| variable.initialized = true).is_some()
	}

	pub fn define_procedure(&mut self, name: &str, procedure: Procedure) -> Result<(), Procedure> {
		if self.procedures.contains_key(name) {
			return Err(procedure);
		}
		self.procedures.insert(name.to_string(), procedure);
		Ok(())
	}

	pub fn get_procedure(&self, name: &str) -> Option<&Procedure> {
		self.procedures.get(name).or_else(|| self.outer.as_ref().and_then(|env| env.get_procedure(name)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::IntWidth;

	fn int() -> Type { Type::Integer(IntWidth::I32) }

	#[test]
	fn define_once_per_scope() {
		let mut env = Environment::new();
		assert!(env.define("a", Variable::new(int(), true, false)).is_ok());
		assert_eq!(env.define("a", Variable::new(Type::String, false, true)), Err(Variable::new(Type::String, false, true)));
		assert_eq!(env.get("a").map(|v| &v.ty), Some(&int()));
		assert!(env.get("b").is_none());
	}

	#[test]
	fn lookups_walk_outward() {
		let mut global = Environment::new();
		global.define("a", Variable::new(int(), true, false)).unwrap();
		let mut local = global.enclose();
		assert!(local.get("a").is_some());

		// Shadowing an outer binding is a new definition.
		local.define("a", Variable::new(Type::String, true, true)).unwrap();
		assert_eq!(local.get("a").map(|v| &v.ty), Some(&Type::String));

		let global = local.into_outer().unwrap();
		assert_eq!(global.get("a").map(|v| &v.ty), Some(&int()));
		assert!(global.into_outer().is_none());
	}

	#[test]
	fn mark_initialized_hits_nearest_binding() {
		let mut global = Environment::new();
		global.define("a", Variable::new(int(), true, false)).unwrap();
		let mut local = global.enclose();
		assert!(local.mark_initialized("a"));
		assert!(!local.mark_initialized("missing"));
		let global = local.into_outer().unwrap();
		assert!(global.get("a").unwrap().initialized);
	}

	#[test]
	fn snapshots_are_independent() {
		let mut env = Environment::new();
		env.define("a", Variable::new(int(), true, false)).unwrap();
		let mut snapshot = env.clone();
		snapshot.mark_initialized("a");
		snapshot.define("b", Variable::new(int(), true, true)).unwrap();
		assert!(!env.get("a").unwrap().initialized);
		assert!(env.get("b").is_none());
	}

	#[test]
	fn procedures() {
		let mut env = Environment::new();
		let signature = Procedure { parameters: vec![int(), Type::String], returns: Type::Null };
		env.define_procedure("print", signature.clone()).unwrap();
		assert!(env.define_procedure("print", signature.clone()).is_err());
		let local = env.enclose();
		assert_eq!(local.get_procedure("print"), Some(&signature));
		assert!(local.get("print").is_none());
	}
}
