use std::fmt::Display;

use crate::{
	parser::expression::{BinaryOperator, UnaryOperator},
	types::{FloatWidth, IntWidth, Type},
};

/// One byte instruction codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
	/// Load an 8-bit signed immediate
	LoadByteImmediate = 0x01,
	/// Load a 16-bit signed immediate
	LoadShortImmediate = 0x02,
	/// Load a 32-bit signed immediate
	LoadImmediate = 0x03,
	/// Load a 64-bit signed immediate
	LoadLongImmediate = 0x04,
	/// Load an inline IEEE-754 double
	LoadDouble = 0x05,
	/// Load an inline NUL terminated string
	LoadString = 0x06,
	/// Build an array from the next `count` values
	LoadArraySize = 0x07,
	/// Load a constant pool entry
	LoadConstant = 0x08,

	LoadB = 0x10,
	LoadS = 0x11,
	LoadI = 0x12,
	LoadL = 0x13,
	LoadUb = 0x14,
	LoadUs = 0x15,
	LoadUi = 0x16,
	LoadUl = 0x17,
	LoadF = 0x18,
	LoadD = 0x19,
	LoadStr = 0x1A,
	LoadArr = 0x1B,
	LoadAny = 0x1C,

	StoreB = 0x20,
	StoreS = 0x21,
	StoreI = 0x22,
	StoreL = 0x23,
	StoreUb = 0x24,
	StoreUs = 0x25,
	StoreUi = 0x26,
	StoreUl = 0x27,
	StoreF = 0x28,
	StoreD = 0x29,
	StoreStr = 0x2A,
	StoreArr = 0x2B,
	StoreAny = 0x2C,

	Add = 0x30,
	Sub = 0x31,
	Mul = 0x32,
	Pow = 0x33,
	Div = 0x34,
	Mod = 0x35,
	Eq = 0x36,
	Neq = 0x37,
	Lt = 0x38,
	Gt = 0x39,
	Lte = 0x3A,
	Gte = 0x3B,
	And = 0x3C,
	Or = 0x3D,
	ShiftLeft = 0x3E,
	ShiftRight = 0x3F,
	BitAnd = 0x40,
	BitOr = 0x41,
	BitXor = 0x42,
	Not = 0x43,
	BitNot = 0x44,
	/// Pop an index and an array, push the element
	LoadElement = 0x45,

	Jump = 0x50,
	/// Jump when the popped value is zero
	JumpIfZero = 0x51,
}

impl OpCode {
	pub fn mnemonic(self) -> &'static str {
		use OpCode::*;
		match self {
			LoadByteImmediate => "LDBI",
			LoadShortImmediate => "LDSI",
			LoadImmediate => "LDI",
			LoadLongImmediate => "LDLI",
			LoadDouble => "LDD",
			LoadString => "LDS",
			LoadArraySize => "LDAS",
			LoadConstant => "LDC",
			LoadB => "LOADB",
			LoadS => "LOADS",
			LoadI => "LOADI",
			LoadL => "LOADL",
			LoadUb => "LOADUB",
			LoadUs => "LOADUS",
			LoadUi => "LOADUI",
			LoadUl => "LOADUL",
			LoadF => "LOADF",
			LoadD => "LOADD",
			LoadStr => "LOADSTR",
			LoadArr => "LOADARR",
			LoadAny => "LOADANY",
			StoreB => "STOREB",
			StoreS => "STORES",
			StoreI => "STOREI",
			StoreL => "STOREL",
			StoreUb => "STOREUB",
			StoreUs => "STOREUS",
			StoreUi => "STOREUI",
			StoreUl => "STOREUL",
			StoreF => "STOREF",
			StoreD => "STORED",
			StoreStr => "STORESTR",
			StoreArr => "STOREARR",
			StoreAny => "STOREANY",
			Add => "ADD",
			Sub => "SUB",
			Mul => "MUL",
			Pow => "POW",
			Div => "DIV",
			Mod => "MOD",
			Eq => "EQ",
			Neq => "NEQ",
			Lt => "LT",
			Gt => "GT",
			Lte => "LTE",
			Gte => "GTE",
			And => "AND",
			Or => "OR",
			ShiftLeft => "LSHFT",
			ShiftRight => "RSHFT",
			BitAnd => "BAND",
			BitOr => "BOR",
			BitXor => "BXOR",
			Not => "NOT",
			BitNot => "BNOT",
			LoadElement => "LDEL",
			Jump => "JMP",
			JumpIfZero => "JZ",
		}
	}
}

impl From<BinaryOperator> for OpCode {
	fn from(operator: BinaryOperator) -> Self {
		use BinaryOperator::*;
		match operator {
			Add => OpCode::Add,
			Subtract => OpCode::Sub,
			Multiply => OpCode::Mul,
			Power => OpCode::Pow,
			Divide => OpCode::Div,
			Modulo => OpCode::Mod,
			Equal => OpCode::Eq,
			NotEqual => OpCode::Neq,
			Less => OpCode::Lt,
			Greater => OpCode::Gt,
			LessEqual => OpCode::Lte,
			GreaterEqual => OpCode::Gte,
			And => OpCode::And,
			Or => OpCode::Or,
			ShiftLeft => OpCode::ShiftLeft,
			ShiftRight => OpCode::ShiftRight,
			BitAnd => OpCode::BitAnd,
			BitOr => OpCode::BitOr,
			BitXor => OpCode::BitXor,
		}
	}
}

impl OpCode {
	/// Opcode of a unary operator that maps onto a single instruction.
	pub fn unary(operator: UnaryOperator) -> Option<Self> {
		match operator {
			UnaryOperator::Not => Some(OpCode::Not),
			UnaryOperator::BitNot => Some(OpCode::BitNot),
			UnaryOperator::Negate | UnaryOperator::Plus => None,
		}
	}
}

impl Display for OpCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.mnemonic()) }
}

/// How a variable slot is stored, picked from its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
	B,
	S,
	I,
	L,
	Ub,
	Us,
	Ui,
	Ul,
	F,
	D,
	Str,
	Arr,
	Any,
}

impl Storage {
	pub fn of(ty: &Type) -> Self {
		match ty {
			Type::Integer(width) => match width {
				IntWidth::I8 => Storage::B,
				IntWidth::I16 => Storage::S,
				IntWidth::I32 => Storage::I,
				IntWidth::I64 => Storage::L,
				IntWidth::U1 | IntWidth::U8 => Storage::Ub,
				IntWidth::U16 => Storage::Us,
				IntWidth::U32 => Storage::Ui,
				IntWidth::U64 => Storage::Ul,
			},
			Type::Float(FloatWidth::F32) => Storage::F,
			Type::Float(FloatWidth::F64) => Storage::D,
			Type::String => Storage::Str,
			Type::Char => Storage::Ui,
			Type::Array { .. } => Storage::Arr,
			Type::Union(_) | Type::Null => Storage::Any,
		}
	}

	pub fn load(self) -> OpCode {
		use Storage::*;
		match self {
			B => OpCode::LoadB,
			S => OpCode::LoadS,
			I => OpCode::LoadI,
			L => OpCode::LoadL,
			Ub => OpCode::LoadUb,
			Us => OpCode::LoadUs,
			Ui => OpCode::LoadUi,
			Ul => OpCode::LoadUl,
			F => OpCode::LoadF,
			D => OpCode::LoadD,
			Str => OpCode::LoadStr,
			Arr => OpCode::LoadArr,
			Any => OpCode::LoadAny,
		}
	}

	pub fn store(self) -> OpCode {
		use Storage::*;
		match self {
			B => OpCode::StoreB,
			S => OpCode::StoreS,
			I => OpCode::StoreI,
			L => OpCode::StoreL,
			Ub => OpCode::StoreUb,
			Us => OpCode::StoreUs,
			Ui => OpCode::StoreUi,
			Ul => OpCode::StoreUl,
			F => OpCode::StoreF,
			D => OpCode::StoreD,
			Str => OpCode::StoreStr,
			Arr => OpCode::StoreArr,
			Any => OpCode::StoreAny,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn storage_classes() {
		assert_eq!(Storage::of(&Type::Integer(IntWidth::I32)), Storage::I);
		assert_eq!(Storage::of(&Type::Integer(IntWidth::U1)), Storage::Ub);
		assert_eq!(Storage::of(&Type::Char), Storage::Ui);
		assert_eq!(Storage::of(&Type::Float(FloatWidth::F32)), Storage::F);
		assert_eq!(Storage::of(&Type::array(Type::String, None)), Storage::Arr);
		assert_eq!(Storage::of(&Type::union([Type::String, Type::Null])), Storage::Any);
		assert_eq!(Storage::of(&Type::Null), Storage::Any);
	}

	#[test]
	fn load_and_store_pair_up() {
		use Storage::*;
		for storage in [B, S, I, L, Ub, Us, Ui, Ul, F, D, Str, Arr, Any] {
			assert_eq!(storage.store() as u8, storage.load() as u8 + 0x10);
			assert!(storage.load().mnemonic().starts_with("LOAD"));
			assert_eq!(&storage.store().mnemonic()[5..], &storage.load().mnemonic()[4..]);
		}
	}

	#[test]
	fn opcode_bytes() {
		assert_eq!(OpCode::LoadByteImmediate as u8, 0x01);
		assert_eq!(OpCode::from(BinaryOperator::Add) as u8, 0x30);
		assert_eq!(OpCode::from(BinaryOperator::BitXor) as u8, 0x42);
		assert_eq!(OpCode::LoadElement.to_string(), "LDEL");
		assert_eq!(OpCode::unary(UnaryOperator::Negate), None);
	}
}
