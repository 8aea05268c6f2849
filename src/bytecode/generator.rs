use std::collections::HashMap;

use anyhow::{Context, bail};
use tracing::{debug, trace};

use super::{Bytecode, ConstantTag, Instruction, OpCode, Storage};
use crate::{
	error::FuguError,
	parser::expression::{Expression, ExpressionKind::*, Identifier, Literal, UnaryOperator, UpdateOperator},
	statement::{Declaration, Program, Statement},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
	/// Load string and float literals from the constant pool instead of
	/// inlining them.
	pub pool_constants: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
	pub index:   u16,
	pub storage: Storage,
}

/// Variable slots, kept across every unit generated against it.
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
	slots: HashMap<String, Slot>,
}

impl SlotTable {
	pub fn new() -> Self { Self::default() }

	/// The slot of `name`, allocating the next free one on first use.
	pub fn allocate(&mut self, name: &str, storage: Storage) -> anyhow::Result<Slot> {
		if let Some(slot) = self.slots.get(name) {
			return Ok(*slot);
		}
		let index = u16::try_from(self.slots.len()).context("Out of variable slots, at most 65536 names fit")?;
		let slot = Slot { index, storage };
		self.slots.insert(name.to_string(), slot);
		trace!(name, index, ?storage, "allocated slot");
		Ok(slot)
	}

	pub fn get(&self, name: &str) -> Option<Slot> { self.slots.get(name).copied() }

	pub fn len(&self) -> usize { self.slots.len() }

	pub fn is_empty(&self) -> bool { self.slots.is_empty() }
}

/// Smallest signed immediate that holds `value`. Values outside `i64` are
/// reduced modulo 2^64 and always take the 8-byte form.
pub fn encode_integer(value: i128) -> (OpCode, Vec<u8>) {
	if let Ok(value) = i8::try_from(value) {
		(OpCode::LoadByteImmediate, value.to_le_bytes().to_vec())
	} else if let Ok(value) = i16::try_from(value) {
		(OpCode::LoadShortImmediate, value.to_le_bytes().to_vec())
	} else if let Ok(value) = i32::try_from(value) {
		(OpCode::LoadImmediate, value.to_le_bytes().to_vec())
	} else {
		(OpCode::LoadLongImmediate, (value as i64).to_le_bytes().to_vec())
	}
}

/// Lowers a checked program to bytecode.
pub struct BytecodeGenerator<'a> {
	slots:    &'a mut SlotTable,
	options:  GeneratorOptions,
	bytecode: Bytecode,
}

impl<'a> BytecodeGenerator<'a> {
	pub fn new(slots: &'a mut SlotTable, options: GeneratorOptions) -> Self {
		Self { slots, options, bytecode: Bytecode::new() }
	}

	/// Only fails on programs the checker should have rejected.
	pub fn generate(mut self, program: &Program) -> Result<Bytecode, FuguError> {
		for statement in &program.body {
			self.statement(statement)?;
		}
		debug!(
			instructions = self.bytecode.instructions.len(),
			constants = self.bytecode.constants.len(),
			slots = self.slots.len(),
			"generated bytecode"
		);
		Ok(self.bytecode)
	}

	fn statement(&mut self, statement: &Statement) -> anyhow::Result<()> {
		match statement {
			Statement::Expression(expression) => self.expression(expression),
			Statement::Declaration(declaration) => self.declaration(declaration),
			Statement::Empty(_) => Ok(()),
		}
	}

	fn declaration(&mut self, declaration: &Declaration) -> anyhow::Result<()> {
		let storage = Storage::of(&declaration.declared_type);
		let mut slots = Vec::with_capacity(declaration.names.len());
		for name in &declaration.names {
			slots.push((name, self.slots.allocate(&name.name, storage)?));
		}
		let (Some(initializer), Some(&(first_name, first))) = (&declaration.initializer, slots.first()) else {
			return Ok(());
		};
		self.expression(initializer)?;
		self.emit_slot(first.storage.store(), first, &first_name.name);
		// The rest copy the first name's value.
		for &(name, slot) in &slots[1..] {
			self.emit_slot(first.storage.load(), first, &first_name.name);
			self.emit_slot(slot.storage.store(), slot, &name.name);
		}
		Ok(())
	}

	fn expression(&mut self, expression: &Expression) -> anyhow::Result<()> {
		match &expression.kind {
			Literal(literal) => self.literal(literal)?,
			Identifier(identifier) => {
				let slot = self.slot(identifier)?;
				self.emit_slot(slot.storage.load(), slot, &identifier.name);
			}
			Binary { left, operator, right } => {
				self.expression(left)?;
				self.expression(right)?;
				self.emit(OpCode::from(*operator), vec![]);
			}
			Unary { operator, operand } => match (operator, OpCode::unary(*operator)) {
				(_, Some(opcode)) => {
					self.expression(operand)?;
					self.emit(opcode, vec![]);
				}
				(UnaryOperator::Negate, None) => {
					self.emit(OpCode::LoadByteImmediate, vec![0x00]);
					self.expression(operand)?;
					self.emit(OpCode::Sub, vec![]);
				}
				(_, None) => self.expression(operand)?,
			},
			Update { operator, target, .. } => {
				let slot = self.slot(target)?;
				self.emit_slot(slot.storage.load(), slot, &target.name);
				self.emit(OpCode::LoadByteImmediate, vec![0x01]);
				self.emit(if *operator == UpdateOperator::Increment { OpCode::Add } else { OpCode::Sub }, vec![]);
				self.emit_slot(slot.storage.store(), slot, &target.name);
			}
			Assignment { target, operator, value } => {
				let slot = self.slot(target)?;
				match operator.binary() {
					Some(binary) => {
						self.emit_slot(slot.storage.load(), slot, &target.name);
						self.expression(value)?;
						self.emit(OpCode::from(binary), vec![]);
					}
					None => self.expression(value)?,
				}
				self.emit_slot(slot.storage.store(), slot, &target.name);
			}
			Sequence(items) => {
				for item in items {
					self.expression(item)?;
				}
			}
			ArrayLiteral(items) => {
				let count = u32::try_from(items.len()).context("Array literal has too many elements")?;
				self.emit(OpCode::LoadArraySize, count.to_le_bytes().to_vec());
				for item in items {
					self.expression(item)?;
				}
			}
			ElementAccess { base, index } => {
				self.expression(base)?;
				self.expression(index)?;
				self.emit(OpCode::LoadElement, vec![]);
			}
		}
		Ok(())
	}

	fn literal(&mut self, literal: &Literal) -> anyhow::Result<()> {
		match literal {
			Literal::Integer(value) => {
				let (opcode, operands) = encode_integer(*value);
				let instruction = Instruction::new(opcode, operands);
				self.bytecode.instructions.push(match i64::try_from(*value) {
					Ok(_) => instruction,
					Err(_) => instruction.with_comment(format!("{value} wrapped to {}", *value as i64)),
				});
			}
			Literal::Char(c) => {
				let (opcode, operands) = encode_integer(i128::from(u32::from(*c)));
				self.bytecode.instructions.push(Instruction::new(opcode, operands).with_comment(format!("'{c}'")));
			}
			Literal::Null => self.emit(OpCode::LoadByteImmediate, vec![0x00]),
			Literal::Float(value) => {
				let bytes = value.to_le_bytes().to_vec();
				self.inline_or_pooled(ConstantTag::Float, OpCode::LoadDouble, bytes, format!("{value:?}"))?;
			}
			Literal::String(value) => {
				let bytes = value.as_bytes().to_vec();
				self.inline_or_pooled(ConstantTag::String, OpCode::LoadString, bytes, format!("{value:?}"))?;
			}
		}
		Ok(())
	}

	fn inline_or_pooled(&mut self, tag: ConstantTag, inline: OpCode, mut bytes: Vec<u8>, comment: String) -> anyhow::Result<()> {
		let instruction = if self.options.pool_constants {
			let index = self.bytecode.constants.intern(tag, bytes)?;
			Instruction::new(OpCode::LoadConstant, index.to_le_bytes().to_vec())
		} else {
			if tag == ConstantTag::String {
				bytes.push(0x00);
			}
			Instruction::new(inline, bytes)
		};
		self.bytecode.instructions.push(instruction.with_comment(comment));
		Ok(())
	}

	fn slot(&self, identifier: &Identifier) -> anyhow::Result<Slot> {
		match self.slots.get(&identifier.name) {
			Some(slot) => Ok(slot),
			None => bail!("No slot allocated for '{}' at {:?}", identifier.name, identifier.range),
		}
	}

	fn emit(&mut self, opcode: OpCode, operands: Vec<u8>) {
		self.bytecode.instructions.push(Instruction::new(opcode, operands));
	}

	fn emit_slot(&mut self, opcode: OpCode, slot: Slot, name: &str) {
		self.bytecode.instructions.push(Instruction::new(opcode, slot.index.to_le_bytes().to_vec()).with_comment(name));
	}

	/// Emit a jump with a placeholder offset, returning its instruction index
	/// for [`Self::patch_jump`].
	pub fn emit_jump(&mut self, opcode: OpCode) -> Result<usize, FuguError> {
		if !matches!(opcode, OpCode::Jump | OpCode::JumpIfZero) {
			return Err(anyhow::anyhow!("{opcode} is not a jump").into());
		}
		self.emit(opcode, vec![0xFF; 4]);
		Ok(self.bytecode.instructions.len() - 1)
	}

	/// Point the jump at `site` to the next instruction to be emitted. The
	/// offset counts instructions, relative to the one after the jump.
	pub fn patch_jump(&mut self, site: usize) -> Result<(), FuguError> {
		let len = self.bytecode.instructions.len();
		let Some(jump) = self.bytecode.instructions.get_mut(site) else {
			return Err(anyhow::anyhow!("No instruction at jump site {site}").into());
		};
		if !matches!(jump.opcode, OpCode::Jump | OpCode::JumpIfZero) {
			return Err(anyhow::anyhow!("Instruction at {site} is {}, not a jump", jump.opcode).into());
		}
		let offset = i32::try_from(len - site - 1).context("Jump offset does not fit in 32 bits")?;
		jump.operands = offset.to_le_bytes().to_vec();
		trace!(site, offset, "patched jump");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::{
		checker::TypeChecker,
		environment::Environment,
		error::Diagnostics,
		parser::parse,
		scanner::tokenize,
	};

	fn decode_integer(opcode: OpCode, operands: &[u8]) -> Option<i64> {
		Some(match opcode {
			OpCode::LoadByteImmediate => i64::from(i8::from_le_bytes(operands.try_into().ok()?)),
			OpCode::LoadShortImmediate => i64::from(i16::from_le_bytes(operands.try_into().ok()?)),
			OpCode::LoadImmediate => i64::from(i32::from_le_bytes(operands.try_into().ok()?)),
			OpCode::LoadLongImmediate => i64::from_le_bytes(operands.try_into().ok()?),
			_ => return None,
		})
	}

	fn generate_with(source: &str, options: GeneratorOptions) -> Bytecode {
		let program = parse(tokenize(source, "test").unwrap()).unwrap();
		let mut environment = Environment::new();
		let mut diagnostics = Diagnostics::new();
		TypeChecker::new(&mut environment, &mut diagnostics).check(&program).unwrap();
		let mut slots = SlotTable::new();
		BytecodeGenerator::new(&mut slots, options).generate(&program).unwrap()
	}

	fn generate(source: &str) -> Bytecode { generate_with(source, GeneratorOptions::default()) }

	/// `OPCODE 0x.. 0x..` per instruction, comments left out.
	fn listing(source: &str) -> Vec<String> {
		generate(source)
			.instructions
			.into_iter()
			.map(|instruction| Instruction { comment: None, ..instruction }.to_string())
			.collect()
	}

	#[test]
	fn integer_widths() {
		assert_eq!(encode_integer(2), (OpCode::LoadByteImmediate, vec![0x02]));
		assert_eq!(encode_integer(-128), (OpCode::LoadByteImmediate, vec![0x80]));
		assert_eq!(encode_integer(128), (OpCode::LoadShortImmediate, vec![0x80, 0x00]));
		assert_eq!(encode_integer(-32769), (OpCode::LoadImmediate, vec![0xFF, 0x7F, 0xFF, 0xFF]));
		assert_eq!(encode_integer(i128::from(i32::MAX) + 1).0, OpCode::LoadLongImmediate);
		assert_eq!(encode_integer(1 << 64), (OpCode::LoadLongImmediate, vec![0; 8]));
		assert_eq!(encode_integer(u64::MAX.into()), (OpCode::LoadLongImmediate, vec![0xFF; 8]));
	}

	#[test]
	fn folded_literal() {
		assert_eq!(listing("1 + 1;"), ["LDBI 0x02"]);
		assert_eq!(generate("1 + 1;").encode(), vec![0x01, 0x02]);
	}

	#[test]
	fn overflow_wraps() {
		let bytecode = generate("18446744073709551616;");
		assert_eq!(listing("18446744073709551616;"), ["LDLI 0x00 0x00 0x00 0x00 0x00 0x00 0x00 0x00"]);
		assert_eq!(bytecode.instructions[0].comment.as_deref(), Some("18446744073709551616 wrapped to 0"));
	}

	#[test]
	fn declarations_store_once_per_name() {
		assert_eq!(listing("mut x: int = 5; x = 10;"), [
			"LDBI 0x05",
			"STOREI 0x00 0x00",
			"LDBI 0x0A",
			"STOREI 0x00 0x00"
		]);
		let second = generate("mut x: int = 5; x = 10;");
		let stores = second.instructions[2..].iter().filter(|i| i.opcode == OpCode::StoreI).count();
		assert_eq!(stores, 1);

		assert_eq!(listing("mut a, b: long = 300;"), [
			"LDSI 0x2C 0x01",
			"STOREL 0x00 0x00",
			"LOADL 0x00 0x00",
			"STOREL 0x01 0x00"
		]);
		assert!(listing("mut x: int;").is_empty());
	}

	#[test]
	fn shared_initializer_runs_once() {
		let bytecode = generate("mut i: int = 0; mut a, b, c: int = i++;");
		let increments = bytecode.opcodes().iter().filter(|opcode| **opcode == OpCode::Add).count();
		assert_eq!(increments, 1);
		let stores_to_i = bytecode
			.instructions
			.iter()
			.filter(|i| i.opcode == OpCode::StoreI && i.operands == [0x00, 0x00])
			.count();
		assert_eq!(stores_to_i, 2);
		assert_eq!(listing("mut i: int = 0; mut a, b, c: int = i++;")[6..], [
			"STOREI 0x01 0x00",
			"LOADI 0x01 0x00",
			"STOREI 0x02 0x00",
			"LOADI 0x01 0x00",
			"STOREI 0x03 0x00"
		]);
	}

	#[test]
	fn storage_follows_declared_type() {
		assert_eq!(listing("mut c: char = 'a'; c;"), ["LDBI 0x61", "STOREUI 0x00 0x00", "LOADUI 0x00 0x00"]);
		assert_eq!(listing("mut c: chr = '\u{20AC}';"), ["LDSI 0xAC 0x20", "STOREUI 0x00 0x00"]);
		assert_eq!(listing("mut c: chr = '\u{1F600}';"), ["LDI 0x00 0xF6 0x01 0x00", "STOREUI 0x00 0x00"]);
		assert_eq!(listing("mut u: int | null = null; u;"), ["LDBI 0x00", "STOREANY 0x00 0x00", "LOADANY 0x00 0x00"]);
		assert_eq!(listing("mut f: float = 1.5;")[1], "STOREF 0x00 0x00");
		assert_eq!(listing("mut a: str[] = [];")[1], "STOREARR 0x00 0x00");
	}

	#[test]
	fn operators() {
		assert_eq!(listing("mut a: int = 1; a * 2 - 3;")[2..], ["LOADI 0x00 0x00", "LDBI 0x02", "MUL", "LDBI 0x03", "SUB"]);
		assert_eq!(listing("mut a: int = 1; -a;")[2..], ["LDBI 0x00", "LOADI 0x00 0x00", "SUB"]);
		assert_eq!(listing("mut a: int = 1; +a;")[2..], ["LOADI 0x00 0x00"]);
		assert_eq!(listing("mut a: int = 1; !a, ~a;")[2..], ["LOADI 0x00 0x00", "NOT", "LOADI 0x00 0x00", "BNOT"]);
		assert_eq!(listing("mut a: int = 1; a <> 1 || a >> 2;")[2..], [
			"LOADI 0x00 0x00",
			"LDBI 0x01",
			"NEQ",
			"LOADI 0x00 0x00",
			"LDBI 0x02",
			"RSHFT",
			"OR"
		]);
	}

	#[test]
	fn updates_and_assignments() {
		let update = ["LOADI 0x00 0x00", "LDBI 0x01", "ADD", "STOREI 0x00 0x00"];
		assert_eq!(listing("mut i: int = 0; i++;")[2..], update);
		assert_eq!(listing("mut i: int = 0; ++i;")[2..], update);
		assert_eq!(listing("mut i: int = 0; i--;")[4], "SUB");
		assert_eq!(listing("mut i: int = 0; i -= 4;")[2..], ["LOADI 0x00 0x00", "LDBI 0x04", "SUB", "STOREI 0x00 0x00"]);
		assert_eq!(listing("mut s: str = \"a\"; s += \"b\";")[2..], [
			"LOADSTR 0x00 0x00",
			"LDS 0x62 0x00",
			"ADD",
			"STORESTR 0x00 0x00"
		]);
	}

	#[test]
	fn literals() {
		assert_eq!(listing("\"hi\";"), ["LDS 0x68 0x69 0x00"]);
		assert_eq!(listing("0.5;"), ["LDD 0x00 0x00 0x00 0x00 0x00 0x00 0xE0 0x3F"]);
		assert_eq!(listing("null;"), ["LDBI 0x00"]);
		assert_eq!(listing("'\u{20AC}';"), ["LDSI 0xAC 0x20"]);
		assert_eq!(listing("1000;"), ["LDSI 0xE8 0x03"]);
	}

	#[test]
	fn arrays() {
		assert_eq!(listing("[1, 2];"), ["LDAS 0x02 0x00 0x00 0x00", "LDBI 0x01", "LDBI 0x02"]);
		assert_eq!(listing("\"ab\"[1];"), ["LDS 0x61 0x62 0x00", "LDBI 0x01", "LDEL"]);
		assert_eq!(listing("[];"), ["LDAS 0x00 0x00 0x00 0x00"]);
	}

	#[test]
	fn constant_pool() {
		let bytecode = generate_with("\"a\", 2.5, \"a\";", GeneratorOptions { pool_constants: true });
		assert_eq!(bytecode.constants.len(), 2);
		assert_eq!(bytecode.constants.entries()[0].bytes, b"a".to_vec());
		assert_eq!(bytecode.constants.entries()[1].bytes, 2.5f64.to_le_bytes().to_vec());
		let operands: Vec<Vec<u8>> = bytecode.instructions.iter().map(|i| i.operands.clone()).collect();
		assert_eq!(operands, vec![vec![0x00, 0x00], vec![0x01, 0x00], vec![0x00, 0x00]]);
		assert!(bytecode.opcodes().iter().all(|opcode| *opcode == OpCode::LoadConstant));
	}

	#[test]
	fn disassembly_comments() {
		let text = generate("mut x: int = 1; x += \"s\"[0] == 'c';").to_string();
		assert!(text.starts_with("main:\n  LDBI 0x01\n  STOREI 0x00 0x00 // x\n"));
		assert!(text.contains("LDS 0x73 0x00 // \"s\"\n"));
		assert!(text.contains("LDBI 0x63 // 'c'\n"));
	}

	#[test]
	fn slots_persist_across_units() {
		let mut slots = SlotTable::new();
		let first = slots.allocate("a", Storage::I).unwrap();
		let second = slots.allocate("b", Storage::Str).unwrap();
		assert_eq!((first.index, second.index), (0, 1));
		assert_eq!(slots.allocate("a", Storage::I).unwrap(), first);
		assert_eq!(slots.len(), 2);

		let program = parse(tokenize("a = 3;", "test").unwrap()).unwrap();
		let bytecode = BytecodeGenerator::new(&mut slots, GeneratorOptions::default()).generate(&program).unwrap();
		assert_eq!(bytecode.instructions[1].operands, vec![0x00, 0x00]);
	}

	#[test]
	fn missing_slot_is_internal() {
		let program = parse(tokenize("ghost;", "test").unwrap()).unwrap();
		let mut slots = SlotTable::new();
		let error = BytecodeGenerator::new(&mut slots, GeneratorOptions::default()).generate(&program).unwrap_err();
		assert!(error.is_internal());
		assert!(error.to_string().starts_with("CompilerInternalError: No slot allocated for 'ghost'"));
	}

	#[test]
	fn slot_exhaustion_is_internal() {
		let mut slots = SlotTable::new();
		for n in 0..=u16::MAX {
			slots.allocate(&n.to_string(), Storage::I).unwrap();
		}
		assert!(slots.allocate("one_more", Storage::I).is_err());
	}

	#[test]
	fn jumps_patch_forward() {
		let mut slots = SlotTable::new();
		let mut generator = BytecodeGenerator::new(&mut slots, GeneratorOptions::default());
		let site = generator.emit_jump(OpCode::JumpIfZero).unwrap();
		generator.emit(OpCode::LoadByteImmediate, vec![0x01]);
		generator.emit(OpCode::LoadByteImmediate, vec![0x02]);
		generator.patch_jump(site).unwrap();
		assert_eq!(generator.bytecode.instructions[site].operands, 2i32.to_le_bytes().to_vec());

		let empty = generator.emit_jump(OpCode::Jump).unwrap();
		generator.patch_jump(empty).unwrap();
		assert_eq!(generator.bytecode.instructions[empty].operands, vec![0; 4]);

		assert!(generator.emit_jump(OpCode::Add).unwrap_err().is_internal());
		assert!(generator.patch_jump(1).is_err());
		assert!(generator.patch_jump(99).is_err());
	}

	proptest! {
		#[test]
		fn integer_encoding_round_trips(value in any::<i64>()) {
			let (opcode, operands) = encode_integer(value.into());
			prop_assert_eq!(decode_integer(opcode, &operands), Some(value));
			let width = match opcode {
				OpCode::LoadByteImmediate => 1,
				OpCode::LoadShortImmediate => 2,
				OpCode::LoadImmediate => 4,
				_ => 8,
			};
			prop_assert_eq!(operands.len(), width);
		}

		#[test]
		fn oversized_integers_wrap(value in any::<i128>()) {
			let (opcode, operands) = encode_integer(value);
			prop_assert_eq!(decode_integer(opcode, &operands), Some(value as i64));
		}

		#[test]
		fn narrowest_width_is_chosen(value in any::<i64>()) {
			let (opcode, _) = encode_integer(value.into());
			let expected = if i8::try_from(value).is_ok() {
				OpCode::LoadByteImmediate
			} else if i16::try_from(value).is_ok() {
				OpCode::LoadShortImmediate
			} else if i32::try_from(value).is_ok() {
				OpCode::LoadImmediate
			} else {
				OpCode::LoadLongImmediate
			};
			prop_assert_eq!(opcode, expected);
		}
	}
}
