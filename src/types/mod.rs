//! The static type lattice.
//!
//! Integer and float widths are advisory: compatibility compares kinds, and a
//! literal's width only records the smallest class its value fits in.
//! Unions are kept flat, a union never directly contains another union.

use std::fmt::Display;

use crate::parser::expression::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
	U1,
	U8,
	U16,
	U32,
	U64,
	I8,
	I16,
	I32,
	I64,
}

impl IntWidth {
	pub fn bits(self) -> u32 {
		use IntWidth::*;
		match self {
			U1 => 1,
			U8 | I8 => 8,
			U16 | I16 => 16,
			U32 | I32 => 32,
			U64 | I64 => 64,
		}
	}

	pub fn is_signed(self) -> bool { matches!(self, IntWidth::I8 | IntWidth::I16 | IntWidth::I32 | IntWidth::I64) }

	/// Width class of an integer literal, `None` when the value fits no
	/// 64-bit integer type.
	pub fn of_literal(value: i128) -> Option<Self> {
		if value == 0 || value == 1 {
			Some(IntWidth::U1)
		} else if i32::try_from(value).is_ok() {
			Some(IntWidth::I32)
		} else if i64::try_from(value).is_ok() {
			Some(IntWidth::I64)
		} else if u64::try_from(value).is_ok() {
			Some(IntWidth::U64)
		} else {
			None
		}
	}

	/// The wider of two widths, signed wins a tie.
	pub fn wider(self, other: Self) -> Self { if (other.bits(), other.is_signed()) > (self.bits(), self.is_signed()) { other } else { self } }
}

impl Display for IntWidth {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use IntWidth::*;
		let name = match self {
			U1 => "u1",
			U8 => "u8",
			U16 => "u16",
			U32 => "u32",
			U64 => "u64",
			I8 => "i8",
			I16 => "i16",
			I32 => "i32",
			I64 => "i64",
		};
		write!(f, "{name}")
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
	F32,
	F64,
}

impl Display for FloatWidth {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FloatWidth::F32 => write!(f, "float"),
			FloatWidth::F64 => write!(f, "double"),
		}
	}
}

/// Types nameable by a single keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
	Integer(IntWidth),
	Float(FloatWidth),
	String,
	Char,
}

impl From<ScalarType> for Type {
	fn from(scalar: ScalarType) -> Self {
		match scalar {
			ScalarType::Integer(width) => Type::Integer(width),
			ScalarType::Float(width) => Type::Float(width),
			ScalarType::String => Type::String,
			ScalarType::Char => Type::Char,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
	Null,
	Integer,
	Float,
	String,
	Char,
	Array,
	Union,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
	Null,
	Integer(IntWidth),
	Float(FloatWidth),
	String,
	Char,
	Array { element: Box<Type>, length: Option<Box<Expression>> },
	/// Built through [`Type::union`]. The empty union is the type of no value
	/// at all, e.g. the elements of `[]`.
	Union(Vec<Type>),
}

impl Type {
	pub fn array(element: Type, length: Option<Expression>) -> Self {
		Type::Array { element: Box::new(element), length: length.map(Box::new) }
	}

	/// Flatten nested unions and drop duplicates, a single remaining member
	/// stands for itself.
	pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
		let mut flat: Vec<Type> = Vec::new();
		for member in members {
			let nested = match member {
				Type::Union(nested) => nested,
				other => vec![other],
			};
			for ty in nested {
				if !flat.contains(&ty) {
					flat.push(ty);
				}
			}
		}
		if flat.len() == 1 { flat.remove(0) } else { Type::Union(flat) }
	}

	/// Union keeping only the first member of each kind. Array members merge
	/// into one array over the union of their element types.
	pub fn union_by_kind(members: impl IntoIterator<Item = Type>) -> Self {
		let mut kept: Vec<Type> = Vec::new();
		for member in members {
			for ty in member.members() {
				let position = kept.iter().position(|k| k.kind() == ty.kind());
				match (position, ty) {
					(None, _) => kept.push(ty.clone()),
					(Some(i), Type::Array { element: other, .. }) => {
						if let Type::Array { element, .. } = &mut kept[i] {
							let merged = Type::union_by_kind([element.as_ref().clone(), other.as_ref().clone()]);
							**element = merged;
						}
					}
					(Some(_), _) => {}
				}
			}
		}
		Type::union(kept)
	}

	pub fn kind(&self) -> TypeKind {
		match self {
			Type::Null => TypeKind::Null,
			Type::Integer(_) => TypeKind::Integer,
			Type::Float(_) => TypeKind::Float,
			Type::String => TypeKind::String,
			Type::Char => TypeKind::Char,
			Type::Array { .. } => TypeKind::Array,
			Type::Union(_) => TypeKind::Union,
		}
	}

	/// Union members, or the type itself.
	pub fn members(&self) -> &[Type] {
		match self {
			Type::Union(members) => members,
			other => std::slice::from_ref(other),
		}
	}

	/// Whether a value of type `value` may be stored where `self` is expected.
	pub fn accepts(&self, value: &Type) -> bool {
		match (self, value) {
			(_, Type::Union(values)) if values.is_empty() => true,
			(Type::Union(targets), Type::Union(values)) => {
				values.iter().all(|v| targets.iter().any(|t| t.accepts(v)))
			}
			(Type::Union(targets), value) => targets.iter().any(|t| t.accepts(value)),
			(Type::Array { element: target, .. }, Type::Array { element: value, .. }) => target.accepts(value),
			(target, value) => target.kind() == value.kind(),
		}
	}

	fn all_members(&self, predicate: impl Fn(&Type) -> bool) -> bool {
		let members = self.members();
		!members.is_empty() && members.iter().all(predicate)
	}

	pub fn is_integer(&self) -> bool { self.all_members(|t| matches!(t, Type::Integer(_))) }

	/// Integer, float, or a union of only those.
	pub fn is_numeric(&self) -> bool { self.all_members(|t| matches!(t, Type::Integer(_) | Type::Float(_))) }

	pub fn may_be_float(&self) -> bool { self.members().iter().any(|t| matches!(t, Type::Float(_))) }

	pub fn may_be_null(&self) -> bool { self.members().iter().any(|t| matches!(t, Type::Null)) }

	/// Widest integer width among the members, if any member is an integer.
	pub fn integer_width(&self) -> Option<IntWidth> {
		self.members()
			.iter()
			.filter_map(|t| match t {
				Type::Integer(width) => Some(*width),
				_ => None,
			})
			.reduce(IntWidth::wider)
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Type::Null => write!(f, "null"),
			Type::Integer(width) => write!(f, "{width}"),
			Type::Float(width) => write!(f, "{width}"),
			Type::String => write!(f, "str"),
			Type::Char => write!(f, "chr"),
			Type::Array { element, length } => {
				match element.as_ref() {
					Type::Union(members) if members.len() > 1 => write!(f, "({element})")?,
					_ => write!(f, "{element}")?,
				}
				match length {
					Some(length) => write!(f, "[{length}]"),
					None => write!(f, "[]"),
				}
			}
			Type::Union(members) if members.is_empty() => write!(f, "never"),
			Type::Union(members) => {
				let members: Vec<String> = members.iter().map(ToString::to_string).collect();
				write!(f, "{}", members.join(" | "))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	const INT: Type = Type::Integer(IntWidth::I32);

	#[test]
	fn literal_width_classes() {
		assert_eq!(IntWidth::of_literal(0), Some(IntWidth::U1));
		assert_eq!(IntWidth::of_literal(1), Some(IntWidth::U1));
		assert_eq!(IntWidth::of_literal(-1), Some(IntWidth::I32));
		assert_eq!(IntWidth::of_literal(2_147_483_647), Some(IntWidth::I32));
		assert_eq!(IntWidth::of_literal(2_147_483_648), Some(IntWidth::I64));
		assert_eq!(IntWidth::of_literal(i64::MIN as i128), Some(IntWidth::I64));
		assert_eq!(IntWidth::of_literal(u64::MAX as i128), Some(IntWidth::U64));
		assert_eq!(IntWidth::of_literal(u64::MAX as i128 + 1), None);
		assert_eq!(IntWidth::of_literal(i64::MIN as i128 - 1), None);
	}

	#[test]
	fn wider_width() {
		assert_eq!(IntWidth::U1.wider(IntWidth::I32), IntWidth::I32);
		assert_eq!(IntWidth::I64.wider(IntWidth::U8), IntWidth::I64);
		assert_eq!(IntWidth::U32.wider(IntWidth::I32), IntWidth::I32);
	}

	#[test]
	fn union_flattens_and_deduplicates() {
		let nested = Type::union([INT, Type::union([Type::String, Type::Null]), Type::String]);
		assert_eq!(nested, Type::Union(vec![INT, Type::String, Type::Null]));
		assert_eq!(Type::union([INT, INT]), INT);
		assert_eq!(nested.to_string(), "i32 | str | null");
	}

	#[test]
	fn union_by_kind_keeps_first_member() {
		let element = Type::union_by_kind([Type::Integer(IntWidth::U1), INT, Type::String]);
		assert_eq!(element, Type::Union(vec![Type::Integer(IntWidth::U1), Type::String]));
		assert_eq!(Type::union_by_kind([]), Type::Union(vec![]));
	}

	#[test]
	fn union_by_kind_merges_array_elements() {
		let bit = Type::Integer(IntWidth::U1);
		let merged = Type::union_by_kind([Type::array(bit.clone(), None), Type::array(Type::String, None)]);
		assert_eq!(merged, Type::array(Type::Union(vec![bit.clone(), Type::String]), None));
		assert_eq!(merged.to_string(), "(u1 | str)[]");
		assert!(!Type::array(INT, None).accepts(&merged));

		let nested = Type::union_by_kind([
			Type::array(Type::array(bit.clone(), None), None),
			Type::array(Type::array(INT, None), None),
		]);
		assert_eq!(nested, Type::array(Type::array(bit, None), None));
	}

	#[test]
	fn scalar_compatibility_ignores_width() {
		assert!(INT.accepts(&Type::Integer(IntWidth::U64)));
		assert!(Type::Float(FloatWidth::F32).accepts(&Type::Float(FloatWidth::F64)));
		assert!(!INT.accepts(&Type::Float(FloatWidth::F64)));
		assert!(!INT.accepts(&Type::Null));
		assert!(!Type::Char.accepts(&Type::String));
	}

	#[test]
	fn union_compatibility() {
		let target = Type::union([INT, Type::String]);
		assert!(target.accepts(&Type::String));
		assert!(target.accepts(&Type::Integer(IntWidth::U1)));
		assert!(!target.accepts(&Type::Char));
		assert!(target.accepts(&Type::union([Type::String, INT])));
		assert!(!target.accepts(&Type::union([Type::String, Type::Null])));
		assert!(!INT.accepts(&Type::union([INT, Type::String])));
	}

	#[test]
	fn array_compatibility() {
		let ints = Type::array(INT, None);
		assert!(ints.accepts(&Type::array(Type::Integer(IntWidth::U1), None)));
		assert!(!ints.accepts(&Type::array(Type::String, None)));
		assert!(!ints.accepts(&INT));
		assert!(ints.accepts(&Type::array(Type::union_by_kind([]), None)));
		let mixed = Type::array(Type::union([INT, Type::String]), None);
		assert!(mixed.accepts(&Type::array(Type::union([Type::String, Type::Integer(IntWidth::U1)]), None)));
		assert!(!ints.accepts(&mixed));
	}

	#[test]
	fn display_types() {
		assert_eq!(Type::array(Type::array(Type::Char, None), None).to_string(), "chr[][]");
		assert_eq!(Type::array(Type::union([INT, Type::Null]), None).to_string(), "(i32 | null)[]");
		assert_eq!(Type::Float(FloatWidth::F64).to_string(), "double");
		assert_eq!(Type::array(Type::union_by_kind([]), None).to_string(), "never[]");
	}

	fn scalar() -> impl Strategy<Value = Type> {
		prop_oneof![
			Just(Type::Null),
			Just(Type::Integer(IntWidth::I32)),
			Just(Type::Integer(IntWidth::U8)),
			Just(Type::Float(FloatWidth::F64)),
			Just(Type::String),
			Just(Type::Char),
		]
	}

	fn any_type() -> impl Strategy<Value = Type> {
		scalar().prop_recursive(3, 16, 4, |inner| {
			prop_oneof![
				inner.clone().prop_map(|element| Type::array(element, None)),
				proptest::collection::vec(inner, 1..4).prop_map(Type::union),
			]
		})
	}

	proptest! {
		#[test]
		fn compatibility_is_reflexive(ty in any_type()) {
			prop_assert!(ty.accepts(&ty));
		}

		#[test]
		fn union_member_order_is_irrelevant(members in proptest::collection::vec(any_type(), 1..5), value in any_type()) {
			let forward = Type::union(members.clone());
			let backward = Type::union(members.into_iter().rev());
			prop_assert_eq!(forward.accepts(&value), backward.accepts(&value));
			prop_assert_eq!(value.accepts(&forward), value.accepts(&backward));
		}

		#[test]
		fn union_duplicates_are_irrelevant(members in proptest::collection::vec(any_type(), 1..5), value in any_type()) {
			let once = Type::union(members.clone());
			let twice = Type::union(members.iter().chain(members.iter()).cloned());
			prop_assert_eq!(once.accepts(&value), twice.accepts(&value));
			prop_assert_eq!(value.accepts(&once), value.accepts(&twice));
		}
	}
}
