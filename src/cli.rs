use std::path::PathBuf;

use palc::{Parser, Subcommand};

use crate::session::CompileOptions;

#[derive(Parser)]
#[command(name = "fugu", after_long_help = "Compiles fugu source to stack machine bytecode.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Compile a source file and print its bytecode
	File {
		path:          PathBuf,
		/// Treat any warning as fatal
		#[arg(long)]
		deny_warnings: bool,
		/// Stop before code generation past this many warnings
		#[arg(long)]
		max_warnings:  Option<usize>,
		/// Load strings and floats from a constant pool
		#[arg(long)]
		constant_pool: bool,
		/// Print the tokens first
		#[arg(long)]
		tokens:        bool,
		/// Print the folded syntax tree first
		#[arg(long)]
		ast:           bool,
	},
	/// Compile line by line, declarations carry over between lines
	Repl {
		/// Treat any warning as fatal
		#[arg(long)]
		deny_warnings: bool,
		/// Stop before code generation past this many warnings
		#[arg(long)]
		max_warnings:  Option<usize>,
		/// Load strings and floats from a constant pool
		#[arg(long)]
		constant_pool: bool,
	},
}

impl Mode {
	pub fn compile_options(&self) -> CompileOptions {
		let (Mode::File { deny_warnings, max_warnings, constant_pool, .. }
		| Mode::Repl { deny_warnings, max_warnings, constant_pool }) = self;
		let warning_limit = if *deny_warnings { Some(0) } else { *max_warnings };
		CompileOptions { warning_limit, pool_constants: *constant_pool }
	}
}
