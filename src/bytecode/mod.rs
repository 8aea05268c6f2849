//! Stack machine bytecode.
//!
//! A program is a constant pool plus a flat instruction stream. Every
//! instruction is a one byte [`OpCode`] followed by its little-endian
//! operands; expression statements leave their value on the stack.

mod generator;
mod opcode;

use std::fmt::Display;

use anyhow::Context;
pub use generator::{BytecodeGenerator, GeneratorOptions, Slot, SlotTable, encode_integer};
pub use opcode::{OpCode, Storage};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
	pub constants:    ConstantPool,
	pub instructions: Vec<Instruction>,
}

impl Bytecode {
	pub fn new() -> Self { Self::default() }

	/// The instruction stream as raw bytes.
	pub fn encode(&self) -> Vec<u8> {
		let mut bytes = Vec::new();
		for instruction in &self.instructions {
			bytes.push(instruction.opcode as u8);
			bytes.extend_from_slice(&instruction.operands);
		}
		bytes
	}

	pub fn opcodes(&self) -> Vec<OpCode> { self.instructions.iter().map(|instruction| instruction.opcode).collect() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
	pub opcode:   OpCode,
	pub operands: Vec<u8>,
	/// Shown in listings only, never encoded.
	pub comment:  Option<String>,
}

impl Instruction {
	pub fn new(opcode: OpCode, operands: Vec<u8>) -> Self { Self { opcode, operands, comment: None } }

	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
	Float,
	String,
}

impl Display for ConstantTag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ConstantTag::Float => write!(f, "double"),
			ConstantTag::String => write!(f, "str"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
	pub index: u16,
	pub tag:   ConstantTag,
	pub bytes: Vec<u8>,
}

/// Append-only table of interned literals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
	entries: Vec<Constant>,
}

impl ConstantPool {
	/// Index of the entry holding `bytes`, adding one if there is none.
	pub fn intern(&mut self, tag: ConstantTag, bytes: Vec<u8>) -> anyhow::Result<u16> {
		if let Some(existing) = self.entries.iter().find(|entry| entry.tag == tag && entry.bytes == bytes) {
			return Ok(existing.index);
		}
		let index = u16::try_from(self.entries.len()).context("Constant pool holds more than 65536 entries")?;
		self.entries.push(Constant { index, tag, bytes });
		Ok(index)
	}

	pub fn get(&self, index: u16) -> Option<&Constant> { self.entries.get(usize::from(index)) }

	pub fn entries(&self) -> &[Constant] { &self.entries }

	pub fn len(&self) -> usize { self.entries.len() }

	pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl Display for Instruction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.opcode)?;
		for byte in &self.operands {
			write!(f, " 0x{byte:02X}")?;
		}
		if let Some(comment) = &self.comment {
			write!(f, " // {comment}")?;
		}
		Ok(())
	}
}

impl Display for Constant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{} {}", self.index, self.tag)?;
		match self.tag {
			ConstantTag::String => write!(f, " {:?}", String::from_utf8_lossy(&self.bytes)),
			ConstantTag::Float => match <[u8; 8]>::try_from(self.bytes.as_slice()) {
				Ok(bytes) => write!(f, " {:?}", f64::from_le_bytes(bytes)),
				Err(_) => write!(f, " <{} bytes>", self.bytes.len()),
			},
		}
	}
}

impl Display for Bytecode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if !self.constants.is_empty() {
			writeln!(f, "constants:")?;
			for constant in self.constants.entries() {
				writeln!(f, "  {constant}")?;
			}
		}
		writeln!(f, "main:")?;
		for instruction in &self.instructions {
			writeln!(f, "  {instruction}")?;
		}
		Ok(())
	}
}
