use std::{fmt::Display, sync::Arc};

use crate::types::{FloatWidth, IntWidth, ScalarType};

/// Position of a lexeme or node inside one source line, columns are
/// 0-based and `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRange {
	pub line:  usize,
	pub start: usize,
	pub end:   usize,
}

impl SourceRange {
	pub fn new(line: usize, start: usize, end: usize) -> Self { Self { line, start, end } }

	/// Range from the start of `self` to the end of `other`.
	pub fn to(self, other: SourceRange) -> Self {
		let end = if other.line == self.line { other.end.max(self.end) } else { self.end };
		Self { end, ..self }
	}
}

/// A source range qualified by the file it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
	pub file:  Arc<str>,
	pub line:  usize,
	pub start: usize,
	pub end:   usize,
}

impl Location {
	pub fn new(file: Arc<str>, range: SourceRange) -> Self {
		Self { file, line: range.line, start: range.start, end: range.end }
	}

	pub fn range(&self) -> SourceRange { SourceRange::new(self.line, self.start, self.end) }
}

impl Display for Location {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}:{}", self.file, self.line, self.start + 1)
	}
}

/// A token produced by the scanner
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
	pub r#type:   TokenType<'a>,
	pub lexeme:   &'a str,
	pub location: Location,
}

impl<'a> Token<'a> {
	pub fn new(r#type: TokenType<'a>, lexeme: &'a str, location: Location) -> Self { Self { r#type, lexeme, location } }

	pub fn range(&self) -> SourceRange { self.location.range() }

	/// How the token reads in an error message.
	pub fn describe(&self) -> String {
		match self.r#type {
			TokenType::Eof => "end of input".to_string(),
			_ => format!("'{}'", self.lexeme),
		}
	}
}

/// The different types of tokens, the copying is lightweight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenType<'a> {
	/// Space, `\t`, `\v`, `\f`, `\r`.
	Whitespace,
	/// New Line Character `\n`, never a statement terminator.
	NewLine,
	/// Comment `//` or /* ... */
	Comment,
	/// Left parenthesis `(`.
	LeftParen,
	/// Right parenthesis `)`.
	RightParen,
	/// Left brace `{`.
	LeftBrace,
	/// Right brace `}`.
	RightBrace,
	/// Left bracket `[`.
	LeftBracket,
	/// Right bracket `]`.
	RightBracket,
	/// Comma `,`.
	Comma,
	/// Question mark `?`.
	Question,
	/// Colon `:`.
	Colon,
	/// Dot `.`.
	Dot,
	/// Semicolon `;`.
	Semicolon,
	/// Minus `-`.
	Minus,
	/// `--`
	MinusMinus,
	/// `-=`
	MinusEqual,
	/// Plus `+`.
	Plus,
	/// `++`
	PlusPlus,
	/// `+=`
	PlusEqual,
	/// Slash `/`.
	Slash,
	/// `/=`
	SlashEqual,
	/// Asterisk `*`.
	Star,
	/// Exponent `**`.
	StarStar,
	/// `*=`
	StarEqual,
	/// Percent `%`.
	Percent,
	/// `%=`
	PercentEqual,
	/// Bang `!`.
	Bang,
	/// Bang equal `!=`.
	BangEqual,
	/// Equal `=`.
	Equal,
	/// Equal equal `==`.
	EqualEqual,
	/// Greater than `>`.
	Greater,
	/// Greater than or equal `>=`.
	GreaterEqual,
	/// Right shift `>>`.
	GreaterGreater,
	/// `>>=`
	GreaterGreaterEqual,
	/// Less than `<`.
	Less,
	/// Less than or equal `<=`.
	LessEqual,
	/// Not equal `<>`, an alternative spelling of `!=`.
	LessGreater,
	/// Left shift `<<`.
	LessLess,
	/// `<<=`
	LessLessEqual,
	/// Bitwise and `&`.
	Ampersand,
	/// Logical and `&&`.
	AmpersandAmpersand,
	/// `&=`
	AmpersandEqual,
	/// Bitwise or `|`, also separates union members.
	Pipe,
	/// Logical or `||`.
	PipePipe,
	/// `|=`
	PipeEqual,
	/// Bitwise xor `^`.
	Caret,
	/// `^=`
	CaretEqual,
	/// Bitwise not `~`.
	Tilde,
	/// Identifier, e.g. variable name.
	Identifier(&'a str),
	/// Integer literal, e.g. `1_000`.
	IntegerLiteral(i128),
	/// Float literal, e.g. `123.45`.
	FloatLiteral(f64),
	/// String literal without its quotes, e.g. `"hello"`.
	StringLiteral(&'a str),
	/// Char literal, e.g. `'a'`.
	CharLiteral(char),
	/// Scalar type keyword such as `int` or `u8`.
	TypeName(ScalarType),
	/// Mutable declaration keyword.
	Mut,
	/// Constant declaration keyword.
	Const,
	/// Boolean literal `true`.
	True,
	/// Boolean literal `false`.
	False,
	/// Null literal, and the null type in type position.
	Null,
	/// Keyword of a construct that is reserved but not supported.
	Reserved(ReservedWord),
	/// End of file/input.
	Eof,
}

impl<'a> TokenType<'a> {
	pub fn is_ignored(&self) -> bool { matches!(self, TokenType::Whitespace | TokenType::NewLine | TokenType::Comment) }

	pub fn keyword_or_identifier(value: &'a str) -> Self {
		use FloatWidth::*;
		use IntWidth::*;
		use TokenType::*;
		match value {
			"mut" => Mut,
			"const" => Const,
			"true" => True,
			"false" => False,
			"null" => Null,
			"class" => Reserved(ReservedWord::Class),
			"new" => Reserved(ReservedWord::New),
			"from" => Reserved(ReservedWord::From),
			"include" => Reserved(ReservedWord::Include),
			"proc" => Reserved(ReservedWord::Proc),
			"return" => Reserved(ReservedWord::Return),
			"if" => Reserved(ReservedWord::If),
			"elif" => Reserved(ReservedWord::Elif),
			"else" => Reserved(ReservedWord::Else),
			"while" => Reserved(ReservedWord::While),
			"for" => Reserved(ReservedWord::For),
			"in" => Reserved(ReservedWord::In),
			"typeof" => Reserved(ReservedWord::Typeof),
			"switch" => Reserved(ReservedWord::Switch),
			"case" => Reserved(ReservedWord::Case),
			"default" => Reserved(ReservedWord::Default),
			"break" => Reserved(ReservedWord::Break),
			"u1" => TypeName(ScalarType::Integer(U1)),
			"u8" | "ubyte" => TypeName(ScalarType::Integer(U8)),
			"u16" | "ushort" => TypeName(ScalarType::Integer(U16)),
			"u32" | "uint" => TypeName(ScalarType::Integer(U32)),
			"u64" | "ulong" => TypeName(ScalarType::Integer(U64)),
			"i8" | "byte" => TypeName(ScalarType::Integer(I8)),
			"i16" | "short" => TypeName(ScalarType::Integer(I16)),
			"i32" | "int" => TypeName(ScalarType::Integer(I32)),
			"i64" | "long" => TypeName(ScalarType::Integer(I64)),
			"float" => TypeName(ScalarType::Float(F32)),
			"double" => TypeName(ScalarType::Float(F64)),
			"str" => TypeName(ScalarType::String),
			"chr" | "char" => TypeName(ScalarType::Char),
			_ => Identifier(value),
		}
	}
}

/// Keywords of procedures, classes, control flow and modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedWord {
	Class,
	New,
	From,
	Include,
	Proc,
	Return,
	If,
	Elif,
	Else,
	While,
	For,
	In,
	Typeof,
	Switch,
	Case,
	Default,
	Break,
}

impl Display for ReservedWord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ReservedWord::*;
		let keyword = match self {
			Class => "class",
			New => "new",
			From => "from",
			Include => "include",
			Proc => "proc",
			Return => "return",
			If => "if",
			Elif => "elif",
			Else => "else",
			While => "while",
			For => "for",
			In => "in",
			Typeof => "typeof",
			Switch => "switch",
			Case => "case",
			Default => "default",
			Break => "break",
		};
		write!(f, "{keyword}")
	}
}
