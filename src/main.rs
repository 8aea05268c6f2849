use std::{fs::read_to_string, io::Write, path::Path, process::ExitCode};

use anyhow::Context;
use fugu::{Compilation, FuguError, Session, cli::*, error::report, scanner::tokenize};
use palc::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();

	let mode = Cli::parse().mode;
	let session = Session::new(mode.compile_options());
	match mode {
		Mode::File { path, tokens, ast, .. } => match run_file(session, &path, tokens, ast) {
			Ok(()) => ExitCode::SUCCESS,
			Err(e) => {
				eprintln!("{e:#}");
				ExitCode::FAILURE
			}
		},
		Mode::Repl { .. } => {
			run_prompt(session);
			ExitCode::SUCCESS
		}
	}
}

fn run_file(mut session: Session, path: &Path, tokens: bool, ast: bool) -> anyhow::Result<()> {
	let source = read_to_string(path).with_context(|| format!("Failed open source file {}", path.display()))?;
	let file = path.display().to_string();
	if tokens {
		match tokenize(&source, &file) {
			Ok(tokens) => tokens.iter().for_each(|token| println!("{} {:?}", token.location, token.r#type)),
			Err(e) => return Err(failure(&e, &source)),
		}
	}
	let compilation = session.compile(&file, &source).map_err(|e| failure(&e, &source))?;
	if ast {
		println!("{}", compilation.program);
	}
	report_success(&compilation, &source);
	Ok(())
}

fn failure(error: &FuguError, source: &str) -> anyhow::Error { anyhow::anyhow!("{}", error.render(source)) }

fn report_success(compilation: &Compilation, source: &str) {
	for warning in &compilation.warnings {
		eprintln!("{}", report::render(&warning.diagnostic(), source));
	}
	print!("{}", compilation.bytecode);
}

/// Each line is one unit, `exit` or end of input quits.
fn run_prompt(mut session: Session) {
	let mut input = String::new();
	let stdin = std::io::stdin();
	loop {
		input.clear();
		print!("> ");
		if let Err(e) = std::io::stdout().flush() {
			eprintln!("Failed flush: {e}");
		}
		match stdin.read_line(&mut input) {
			Ok(0) => {
				println!("\nExited fugu repl");
				break;
			}
			Ok(_) => {}
			Err(e) => {
				eprintln!("Failed read line: {e}");
				continue;
			}
		}
		let line = input.trim();
		if line == "exit" {
			break;
		}
		if line.is_empty() {
			continue;
		}
		match session.compile("repl", line) {
			Ok(compilation) => report_success(&compilation, line),
			Err(e) => eprintln!("{}", e.render(line)),
		}
	}
}
