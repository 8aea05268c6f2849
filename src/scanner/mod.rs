//! Turns source text into tokens.
//!
//! Keywords are part of the shape of the language's grammar, so at the point
//! that we recognize a lexeme we also remember which kind of lexeme it
//! represents: each keyword, operator and bit of punctuation has its own
//! type, and literals carry their decoded value.
//!
//! Operators are matched by explicit peek-ahead on the leading character, so
//! `<<=` is one token and `< <=` is two. We can't detect a reserved word until
//! we've reached the end of what might instead be an identifier, this is
//! `maximal munch`.
//!
//! Newlines only advance the line counter. Statements end at `;`.
mod token;

use std::{iter::Peekable, str::CharIndices, sync::Arc};

use TokenType::*;
use anyhow::Context;
use tracing::debug;
pub use token::*;

use crate::error::{FuguError, LexError, LexErrorType};

/// Scan `source` into tokens terminated by [`TokenType::Eof`].
pub fn tokenize<'a>(source: &'a str, file: &str) -> Result<Vec<Token<'a>>, FuguError> {
	Scanner::new(source, file).scan_tokens()
}

/// A scanner for fugu source code
pub struct Scanner<'a> {
	/// User input source code
	source:       &'a str,
	/// User input source code iterator
	source_iter:  Peekable<CharIndices<'a>>,
	/// Name reported in token locations
	file:         Arc<str>,
	/// Points at the beginning of the current lexeme
	start:        usize,
	/// Points past the character most recently consumed
	cursor:       usize,
	/// Tracks what source line `cursor` is on so we can produce tokens that know
	/// their location.
	line:         usize,
	/// Character column of `cursor` within `line`
	column:       usize,
	start_line:   usize,
	start_column: usize,
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str, file: &str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self {
			source,
			source_iter,
			file: Arc::from(file),
			start: 0,
			cursor: 0,
			line: 1,
			column: 0,
			start_line: 1,
			start_column: 0,
		}
	}

	/// Scan all tokens from the source code, stopping at the first error
	pub fn scan_tokens(mut self) -> Result<Vec<Token<'a>>, FuguError> {
		let mut tokens = Vec::new();
		while let Some(&(index, _)) = self.source_iter.peek() {
			// We are at the beginning of the next lexeme.
			self.start = index;
			self.cursor = self.start;
			self.start_line = self.line;
			self.start_column = self.column;
			self.scan_token(&mut tokens)?;
		}
		self.start = self.source.len();
		self.start_line = self.line;
		self.start_column = self.column;
		tokens.push(Token::new(Eof, "", self.location()));
		debug!(file = %self.file, count = tokens.len(), "scanned tokens");
		Ok(tokens)
	}

	/// Scan a single token from the source code
	fn scan_token(&mut self, tokens: &mut Vec<Token<'a>>) -> Result<(), FuguError> {
		let next_char = self.advance().context("Unexpected EOF")?;
		#[rustfmt::skip]
		let r#type = match next_char {
			'(' => LeftParen,
			')' => RightParen,
			'{' => LeftBrace,
			'}' => RightBrace,
			'[' => LeftBracket,
			']' => RightBracket,
			',' => Comma,
			'?' => Question,
			':' => Colon,
			'.' => Dot,
			';' => Semicolon,
			'~' => Tilde,
			'+' => if self.match_next('+') { PlusPlus } else if self.match_next('=') { PlusEqual } else { Plus },
			'-' => if self.match_next('-') { MinusMinus } else if self.match_next('=') { MinusEqual } else { Minus },
			'*' => if self.match_next('*') { StarStar } else if self.match_next('=') { StarEqual } else { Star },
			'%' => if self.match_next('=') { PercentEqual } else { Percent },
			'!' => if self.match_next('=') { BangEqual } else { Bang },
			'=' => if self.match_next('=') { EqualEqual } else { Equal },
			'^' => if self.match_next('=') { CaretEqual } else { Caret },
			'&' => if self.match_next('&') { AmpersandAmpersand } else if self.match_next('=') { AmpersandEqual } else { Ampersand },
			'|' => if self.match_next('|') { PipePipe } else if self.match_next('=') { PipeEqual } else { Pipe },
			'<' => if self.match_next('<') {
				if self.match_next('=') { LessLessEqual } else { LessLess }
			} else if self.match_next('=') { LessEqual } else if self.match_next('>') { LessGreater } else { Less },
			'>' => if self.match_next('>') {
				if self.match_next('=') { GreaterGreaterEqual } else { GreaterGreater }
			} else if self.match_next('=') { GreaterEqual } else { Greater },
			'/' => if self.match_next('/') {
				while self.peek().is_some_and(|c| c != '\n') { self.advance(); }
				Comment
			} else if self.match_next('*') {
				let mut closed = false;
				while let Some(c) = self.peek() {
					if c == '*' && self.peek_second().is_some_and(|c| c == '/') {
						self.advance(); // consume '*'
						self.advance(); // consume '/'
						closed = true;
						break;
					}
					self.advance();
				}
				if closed { Comment } else { return Err(self.error(LexErrorType::UnterminatedBlockComment).into()) }
			} else if self.match_next('=') { SlashEqual } else { Slash },
			' ' | '\r' | '\t' | '\x0B' | '\x0C' => Whitespace,
			'\n' => NewLine,
			'"' => self.string()?,
			'\'' => self.char()?,
			c if c.is_ascii_digit() => self.number()?,
			c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
			_ => return Err(self.error(LexErrorType::UnknownCharacter(next_char)).into()),
		};

		if !r#type.is_ignored() {
			let lexeme = &self.source[self.start..self.cursor];
			tokens.push(Token::new(r#type, lexeme, self.location()));
		}

		Ok(())
	}

	/// Location of the current lexeme
	fn location(&self) -> Location {
		let end = if self.line == self.start_line { self.column } else { self.start_column + 1 };
		Location::new(self.file.clone(), SourceRange::new(self.start_line, self.start_column, end))
	}

	fn error(&self, r#type: LexErrorType) -> LexError { LexError::new(self.location(), r#type) }

	/// Match the next character if it is the expected one
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Advance to the next character
	fn advance(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		if c == '\n' {
			self.line += 1;
			self.column = 0;
		} else {
			self.column += 1;
		}
		Some(c)
	}

	/// Peek the current character
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Peek the second character ahead
	fn peek_second(&mut self) -> Option<char> {
		let mut it = self.source_iter.clone();
		it.next()?;
		it.peek().map(|&(_, c)| c)
	}

	/// Consume up to the closing `quote`, which must appear on the same line
	fn quoted(&mut self, quote: char) -> Option<&'a str> {
		while let Some(c) = self.peek() {
			if c == quote || c == '\n' {
				break;
			}
			self.advance();
		}
		if self.peek() != Some(quote) {
			return None;
		}
		self.advance(); // The closing quote
		Some(&self.source[self.start + 1..self.cursor - 1])
	}

	/// Scan a string literal
	fn string(&mut self) -> Result<TokenType<'a>, LexError> {
		let value = self.quoted('"').ok_or_else(|| self.error(LexErrorType::UnterminatedString))?;
		Ok(StringLiteral(value))
	}

	/// Scan a char literal
	fn char(&mut self) -> Result<TokenType<'a>, LexError> {
		let value = self.quoted('\'').ok_or_else(|| self.error(LexErrorType::UnterminatedChar))?;
		let mut chars = value.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => Ok(CharLiteral(c)),
			(None, _) => Err(self.error(LexErrorType::EmptyChar)),
			(Some(_), Some(_)) => Err(self.error(LexErrorType::OverlongChar)),
		}
	}

	/// Scan a number literal, `_` separates digit groups
	fn number(&mut self) -> Result<TokenType<'a>, FuguError> {
		let mut fractional = false;
		loop {
			match self.peek() {
				Some(c) if c.is_ascii_digit() || c == '_' => {
					self.advance();
				}
				Some('.') => {
					self.advance(); // consume '.'
					if fractional {
						return Err(self.error(LexErrorType::MultipleDecimalPoints).into());
					}
					if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
						return Err(self.error(LexErrorType::MissingFractionDigits).into());
					}
					fractional = true;
				}
				_ => break,
			}
		}

		let digits: String = self.source[self.start..self.cursor].chars().filter(|&c| c != '_').collect();
		if fractional {
			return Ok(FloatLiteral(digits.parse().context("Failed to parse float literal")?));
		}
		match digits.parse::<i128>() {
			Ok(value) => Ok(IntegerLiteral(value)),
			Err(_) => Err(self.error(LexErrorType::IntegerTooLarge).into()),
		}
	}

	/// Scan an identifier or keyword
	fn identifier(&mut self) -> TokenType<'a> {
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
			self.advance();
		}
		let text = &self.source[self.start..self.cursor];
		TokenType::keyword_or_identifier(text)
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::types::{IntWidth, ScalarType};

	fn scan(input: &str, ok: bool) {
		let result = tokenize(input, "test");
		assert!(result.is_ok() == ok, "{input:?}: {result:?}");
	}

	fn types(input: &str) -> Vec<TokenType<'_>> {
		tokenize(input, "test").unwrap().into_iter().map(|token| token.r#type).collect()
	}

	fn error(input: &str) -> LexErrorType {
		match tokenize(input, "test") {
			Err(FuguError::Lex(e)) => e.r#type().clone(),
			other => panic!("expected a lex error for {input:?}, got {other:?}"),
		}
	}

	#[test]
	fn scan_tokens() {
		scan("", true);
		scan("(", true);
		scan("(){}[]", true);
		scan(" ( ) ", true);
		scan("@", false);
		scan("你好", false);
		scan(r#""世界""#, true);
		scan("12345", true);
		scan(r#""/* Block 注释📻 */""#, true);
		scan("\n    Multi\n    Line\n        String\n    ", true);
		scan(r#"// Comment"#, true);
		scan("/* Unterminated comment ", false);
		scan("user", true);
		scan("return", true);
	}

	#[test]
	fn scan_operators() {
		assert_eq!(types("! != = =="), vec![Bang, BangEqual, Equal, EqualEqual, Eof]);
		assert_eq!(types("< <= <> << <<="), vec![Less, LessEqual, LessGreater, LessLess, LessLessEqual, Eof]);
		assert_eq!(types("> >= >> >>="), vec![Greater, GreaterEqual, GreaterGreater, GreaterGreaterEqual, Eof]);
		assert_eq!(types("+ ++ += - -- -="), vec![Plus, PlusPlus, PlusEqual, Minus, MinusMinus, MinusEqual, Eof]);
		assert_eq!(types("* ** *= / /= % %="), vec![
			Star,
			StarStar,
			StarEqual,
			Slash,
			SlashEqual,
			Percent,
			PercentEqual,
			Eof
		]);
		assert_eq!(types("& && &= | || |= ^ ^= ~"), vec![
			Ampersand,
			AmpersandAmpersand,
			AmpersandEqual,
			Pipe,
			PipePipe,
			PipeEqual,
			Caret,
			CaretEqual,
			Tilde,
			Eof
		]);
		assert_eq!(types("?:;,."), vec![Question, Colon, Semicolon, Comma, Dot, Eof]);
	}

	#[test]
	fn scan_longest_match() {
		assert_eq!(types("a+++b"), vec![Identifier("a"), PlusPlus, Plus, Identifier("b"), Eof]);
		assert_eq!(types("1<<=2"), vec![IntegerLiteral(1), LessLessEqual, IntegerLiteral(2), Eof]);
	}

	#[test]
	fn scan_numbers() {
		assert_eq!(types("0 42 1_000_000"), vec![
			IntegerLiteral(0),
			IntegerLiteral(42),
			IntegerLiteral(1_000_000),
			Eof
		]);
		assert_eq!(types("3.14 0.5"), vec![FloatLiteral(3.14), FloatLiteral(0.5), Eof]);
		assert_eq!(types("18446744073709551616"), vec![IntegerLiteral(18446744073709551616), Eof]);
		assert_eq!(types(".5"), vec![Dot, IntegerLiteral(5), Eof]);
		assert_eq!(error("1.2.3"), LexErrorType::MultipleDecimalPoints);
		assert_eq!(error("1."), LexErrorType::MissingFractionDigits);
		assert_eq!(error("1.x"), LexErrorType::MissingFractionDigits);
		assert_eq!(error("999999999999999999999999999999999999999999"), LexErrorType::IntegerTooLarge);
	}

	#[test]
	fn scan_strings() {
		assert_eq!(types(r#""""#), vec![StringLiteral(""), Eof]);
		assert_eq!(types(r#""hello world""#), vec![StringLiteral("hello world"), Eof]);
		assert_eq!(error("\"unterminated"), LexErrorType::UnterminatedString);
		assert_eq!(error("\"line\nbreak\""), LexErrorType::UnterminatedString);
		assert_eq!(types("\"carriage\rreturn\""), vec![StringLiteral("carriage\rreturn"), Eof]);
	}

	#[test]
	fn scan_chars() {
		assert_eq!(types("'a' '📻'"), vec![CharLiteral('a'), CharLiteral('📻'), Eof]);
		assert_eq!(error("'ab'"), LexErrorType::OverlongChar);
		assert_eq!(error("''"), LexErrorType::EmptyChar);
		assert_eq!(error("'a"), LexErrorType::UnterminatedChar);
		assert_ne!(error("'a"), error("\"a"));
	}

	#[test]
	fn scan_keywords() {
		assert_eq!(types("mut const true false null"), vec![Mut, Const, True, False, Null, Eof]);
		assert_eq!(types("if while proc class"), vec![
			Reserved(ReservedWord::If),
			Reserved(ReservedWord::While),
			Reserved(ReservedWord::Proc),
			Reserved(ReservedWord::Class),
			Eof
		]);
		assert_eq!(types("int i32"), vec![
			TypeName(ScalarType::Integer(IntWidth::I32)),
			TypeName(ScalarType::Integer(IntWidth::I32)),
			Eof
		]);
		assert_eq!(types("str chr"), vec![TypeName(ScalarType::String), TypeName(ScalarType::Char), Eof]);
		assert_eq!(types("mutable int8"), vec![Identifier("mutable"), Identifier("int8"), Eof]);
	}

	#[test]
	fn scan_comments() {
		scan("// comment with ()[]{}", true);
		scan("/* block comment */", true);
		scan("/** nested ** comment **/", true);
		scan("/** multi ** comment ***********/", true);
		assert_eq!(types("1 /* a\nb */ 2 // tail"), vec![IntegerLiteral(1), IntegerLiteral(2), Eof]);
		assert_eq!(error("/* unterminated"), LexErrorType::UnterminatedBlockComment);
	}

	#[test]
	fn scan_whitespace() {
		scan(" \t\r\n\x0B\x0C", true);
		assert_eq!(types("1\n;"), vec![IntegerLiteral(1), Semicolon, Eof]);
	}

	#[test]
	fn scan_unknown_character() {
		assert_eq!(error("mut x = $;"), LexErrorType::UnknownCharacter('$'));
		let message = tokenize("@", "test").unwrap_err().to_string();
		assert!(message.contains("U+0040"), "{message}");
	}

	#[test]
	fn scan_locations() {
		let tokens = tokenize("mut x;\n  x = 10;", "main.fg").unwrap();
		assert_eq!(tokens[1].location, Location::new("main.fg".into(), SourceRange::new(1, 4, 5)));
		assert_eq!(tokens[3].lexeme, "x");
		assert_eq!(tokens[3].range(), SourceRange::new(2, 2, 3));
		assert_eq!(tokens[5].range(), SourceRange::new(2, 6, 8));
		assert_eq!(tokens.last().unwrap().r#type, Eof);
		assert_eq!(tokens.last().unwrap().range().line, 2);
	}

	#[test]
	fn scan_error_location() {
		match tokenize("1 +\n  $", "main.fg") {
			Err(FuguError::Lex(e)) => assert_eq!(e.location().range(), SourceRange::new(2, 2, 3)),
			other => panic!("unexpected {other:?}"),
		}
	}

	proptest! {
		#[test]
		fn rescanning_lexemes_keeps_types(
			words in proptest::collection::vec(
				prop_oneof![
					"[a-z_][a-z0-9_]{0,6}",
					"[0-9]{1,9}",
					"[0-9]{1,4}\\.[0-9]{1,4}",
					"\"[a-z ]{0,5}\"",
					Just("+".to_string()), Just("++".to_string()), Just("<<=".to_string()),
					Just("<>".to_string()), Just("&&".to_string()), Just("|".to_string()),
					Just(";".to_string()), Just("(".to_string()), Just("]".to_string()),
				],
				0..24,
			)
		) {
			let source = words.join(" ");
			let first = tokenize(&source, "a").unwrap();
			let joined = first.iter().map(|token| token.lexeme).collect::<Vec<_>>().join(" ");
			let second = tokenize(&joined, "b").unwrap();
			let first: Vec<_> = first.iter().map(|token| token.r#type).collect();
			let second: Vec<_> = second.iter().map(|token| token.r#type).collect();
			prop_assert_eq!(first, second);
		}
	}
}
