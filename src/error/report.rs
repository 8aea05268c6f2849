//! Caret-annotated rendering of diagnostics.
//!
//! ```text
//! TypeError: Cannot assign to constant 'x'
//!  --> main.fg:2:1
//!   |
//! 2 | x = 3;
//!   | ^
//!   = hint: declare the variable with `mut` to allow assignment
//! ```

use super::Diagnostic;

pub fn render(diagnostic: &Diagnostic, source: &str) -> String {
	let location = &diagnostic.location;
	let pad = " ".repeat(location.line.to_string().len());

	let mut lines = vec![format!("{}: {}", diagnostic.category, diagnostic.message), format!("{pad}--> {location}")];
	if let Some(text) = source.lines().nth(location.line.saturating_sub(1)) {
		lines.push(format!("{pad} |"));
		lines.push(format!("{} | {text}", location.line));
		lines.push(format!("{pad} | {}", underline(text, location.start, location.end)));
	}
	if let Some(hint) = &diagnostic.hint {
		lines.push(format!("{pad} = hint: {hint}"));
	}
	lines.into_iter().map(|line| line + "\n").collect()
}

/// Carets under `start..end`, keeping tabs so the columns line up.
fn underline(text: &str, start: usize, end: usize) -> String {
	let length = text.chars().count();
	let start = start.min(length);
	let width = end.min(length).saturating_sub(start).max(1);
	let indent: String = text.chars().take(start).map(|c| if c == '\t' { '\t' } else { ' ' }).collect();
	format!("{indent}{}", "^".repeat(width))
}
