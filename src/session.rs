use tracing::{debug, info_span};

use crate::{
	bytecode::{Bytecode, BytecodeGenerator, GeneratorOptions, SlotTable},
	checker::TypeChecker,
	environment::Environment,
	error::{Diagnostics, FuguError, Warning},
	parser::parse,
	scanner::tokenize,
	statement::Program,
};

/// Knobs for a compilation session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
	/// Refuse code generation once a unit records more warnings than this.
	pub warning_limit:  Option<usize>,
	/// Move string and float literals into the constant pool.
	pub pool_constants: bool,
}

impl CompileOptions {
	pub fn generator(&self) -> GeneratorOptions { GeneratorOptions { pool_constants: self.pool_constants } }
}

/// Everything one successfully compiled unit produced.
#[derive(Debug)]
pub struct Compilation {
	/// The folded program.
	pub program:  Program,
	pub bytecode: Bytecode,
	pub warnings: Vec<Warning>,
}

/// Compiles units one after another against shared declarations, so a name
/// declared by one REPL line is visible to the next.
#[derive(Debug, Default)]
pub struct Session {
	environment: Environment,
	slots:       SlotTable,
	options:     CompileOptions,
}

impl Session {
	pub fn new(options: CompileOptions) -> Self { Self { options, ..Self::default() } }

	pub fn options(&self) -> CompileOptions { self.options }

	pub fn environment(&self) -> &Environment { &self.environment }

	/// Run the whole pipeline over `source`. A failed unit leaves the session
	/// as it was.
	pub fn compile(&mut self, file: &str, source: &str) -> Result<Compilation, FuguError> {
		let tokens = {
			let _lex = info_span!("fugu.lex", file).entered();
			tokenize(source, file)?
		};
		let program = {
			let _parse = info_span!("fugu.parse", file).entered();
			parse(tokens)?
		};

		let mut environment = self.environment.clone();
		let mut diagnostics = Diagnostics::new();
		{
			let _check = info_span!("fugu.check", file).entered();
			TypeChecker::new(&mut environment, &mut diagnostics).check(&program)?;
		}
		if let Some(limit) = self.options.warning_limit {
			let count = diagnostics.warning_count();
			if count > limit {
				return Err(FuguError::TooManyWarnings { count, limit });
			}
		}

		let mut slots = self.slots.clone();
		let bytecode = {
			let _codegen = info_span!("fugu.codegen", file).entered();
			BytecodeGenerator::new(&mut slots, self.options.generator()).generate(&program)?
		};

		self.environment = environment;
		self.slots = slots;
		debug!(file, instructions = bytecode.instructions.len(), "compiled unit");
		Ok(Compilation { program, bytecode, warnings: diagnostics.into_warnings() })
	}
}

/// Compile a single standalone unit.
pub fn compile(file: &str, source: &str, options: CompileOptions) -> Result<Compilation, FuguError> {
	Session::new(options).compile(file, source)
}
