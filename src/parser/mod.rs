//! The `Scanner` uses the lexical grammar, its alphabet is characters. The
//! `Parser` uses the syntactic grammar, its alphabet is tokens.
//!
//! Expressions are parsed by operator precedence (Pratt parsing): every token
//! has a binding power, a `nud` rule for when it starts an expression and a
//! `led` rule for when it continues one. `expression(min)` keeps extending the
//! left operand while the next token binds tighter than `min`, and a binary
//! operator parses its right operand at its own binding power, so all binary
//! operators associate to the left.
//!
//! |Power|Operators|
//! --|--
//! 1|`,`
//! 2|`=` `+=` `-=` `*=` `/=` `%=` `<<=` `>>=` `&=` `\|=` `^=`
//! 3|`\|\|`
//! 4|`&&`
//! 5|`\|`
//! 6|`^`
//! 7|`&`
//! 8|`==` `!=` `<>`
//! 9|`<` `>` `<=` `>=`
//! 10|`<<` `>>`
//! 11|`+` `-`
//! 12|`*` `/` `%`
//! 13|`**`
//! 14|prefix `!` `~` `-` `+` `++` `--`
//! 15|postfix `++` `--`, element access `[]`
//!
//! Statement grammar:
//!
//! ``` BNF
//! program     → statement* EOF ;
//! statement   → ";" | declaration | expression ";" ;
//! declaration → ( "mut" | "const" ) IDENTIFIER ( "," IDENTIFIER )* ":" type ( "=" expression )? ";" ;
//! type        → array ( "|" array )* ;
//! array       → ( SCALAR | "null" | "(" type ")" ) ( "[" expression? "]" )* ;
//! ```

pub mod expression;
pub mod folding;

use std::{iter::Peekable, sync::Arc, vec::IntoIter};

use TokenType::*;
use anyhow::anyhow;
use tracing::debug;

use crate::{
	error::{FuguError, SyntaxError, SyntaxErrorType},
	parser::expression::{
		AssignOperator, BinaryOperator, Expression, ExpressionKind, Identifier, Literal, UnaryOperator, UpdateOperator,
	},
	scanner::{Location, SourceRange, Token, TokenType},
	statement::{Declaration, Program, Statement},
	types::Type,
};

const COMMA: u8 = 1;
const ASSIGNMENT: u8 = 2;
const PREFIX: u8 = 14;
const POSTFIX: u8 = 15;

/// Parse a token stream into a constant-folded program.
pub fn parse(tokens: Vec<Token<'_>>) -> Result<Program, FuguError> { Parser::new(tokens).parse() }

pub struct Parser<'a> {
	/// The tokens to parse.
	tokens: Peekable<IntoIter<Token<'a>>>,
	/// Source name for diagnostics.
	file:   Arc<str>,
}

impl<'a> Parser<'a> {
	pub fn new(tokens: Vec<Token<'a>>) -> Self {
		let file = tokens.first().map_or_else(|| Arc::from(""), |token| token.location.file.clone());
		Self { tokens: tokens.into_iter().peekable(), file }
	}

	/// Parse the whole unit, then fold its constant subtrees.
	pub fn parse(mut self) -> Result<Program, FuguError> {
		let program = self.program()?;
		debug!(file = %program.file, statements = program.body.len(), "parsed program");
		Ok(folding::fold_program(program))
	}

	/// Parse the whole unit without folding.
	pub fn program(&mut self) -> Result<Program, FuguError> {
		let mut body = Vec::new();
		while self.peek()?.r#type != Eof {
			match self.statement()? {
				Statement::Empty(_) => {}
				statement => body.push(statement),
			}
		}
		Ok(Program { file: self.file.clone(), body })
	}

	fn statement(&mut self) -> Result<Statement, FuguError> {
		let token = self.peek()?;
		let (r#type, range) = (token.r#type, token.range());
		match r#type {
			Semicolon => Ok(Statement::Empty(self.advance()?.range())),
			Mut | Const => Ok(Statement::Declaration(self.declaration()?)),
			Reserved(word) => Err(self.error(range, SyntaxErrorType::Unsupported { keyword: word.to_string() })),
			_ => {
				let expression = self.expression(0)?;
				self.consume(Semicolon, ";")?;
				Ok(Statement::Expression(expression))
			}
		}
	}

	fn declaration(&mut self) -> Result<Declaration, FuguError> {
		let keyword = self.advance()?;
		let mutable = keyword.r#type == Mut;

		let mut names = vec![self.identifier()?];
		while self.match_next(Comma)? {
			names.push(self.identifier()?);
		}
		self.consume(Colon, ":")?;
		let declared_type = self.type_annotation()?;

		let initializer = if self.match_next(Equal)? { Some(self.expression(ASSIGNMENT)?) } else { None };
		if !mutable && initializer.is_none() {
			let range = keyword.range().to(self.peek()?.range());
			let names = names.into_iter().map(|name| name.name).collect();
			return Err(self.error(range, SyntaxErrorType::MissingConstInitializer { names }));
		}
		let end = self.consume(Semicolon, ";")?;

		Ok(Declaration { mutable, declared_type, names, initializer, range: keyword.range().to(end.range()) })
	}

	fn identifier(&mut self) -> Result<Identifier, FuguError> {
		let token = self.advance()?;
		match token.r#type {
			Identifier(name) => Ok(Identifier::new(name, token.range())),
			_ => Err(self.error(token.range(), SyntaxErrorType::ExpectedIdentifier { found: token.describe() })),
		}
	}

	/// Parse a type annotation, `|` joins union members.
	fn type_annotation(&mut self) -> Result<Type, FuguError> {
		let first = self.array_type()?;
		if self.peek()?.r#type != Pipe {
			return Ok(first);
		}
		let mut members = vec![first];
		while self.match_next(Pipe)? {
			members.push(self.array_type()?);
		}
		Ok(Type::union(members))
	}

	fn array_type(&mut self) -> Result<Type, FuguError> {
		let token = self.advance()?;
		let mut ty = match token.r#type {
			TypeName(scalar) => scalar.into(),
			Null => Type::Null,
			LeftParen => {
				let inner = self.type_annotation()?;
				self.consume(RightParen, ")")?;
				inner
			}
			_ => return Err(self.error(token.range(), SyntaxErrorType::ExpectedType { found: token.describe() })),
		};
		while self.match_next(LeftBracket)? {
			let length = if self.peek()?.r#type == RightBracket { None } else { Some(self.expression(ASSIGNMENT)?) };
			self.consume(RightBracket, "]")?;
			ty = Type::array(ty, length);
		}
		Ok(ty)
	}

	/// Parse an expression whose operators all bind tighter than `min_power`.
	fn expression(&mut self, min_power: u8) -> Result<Expression, FuguError> {
		let token = self.advance()?;
		let mut left = self.nud(token)?;
		while binding_power(&self.peek()?.r#type) > min_power {
			let token = self.advance()?;
			left = self.led(left, token)?;
		}
		Ok(left)
	}

	/// Rule for a token that starts an expression.
	fn nud(&mut self, token: Token<'a>) -> Result<Expression, FuguError> {
		let range = token.range();
		let literal = |literal| Ok(Expression::literal(literal, range));
		match token.r#type {
			IntegerLiteral(value) => literal(Literal::Integer(value)),
			FloatLiteral(value) => literal(Literal::Float(value)),
			StringLiteral(value) => literal(Literal::String(value.to_string())),
			CharLiteral(value) => literal(Literal::Char(value)),
			True => literal(Literal::Integer(1)),
			False => literal(Literal::Integer(0)),
			Null => literal(Literal::Null),
			Identifier(name) => Ok(Expression::new(ExpressionKind::Identifier(Identifier::new(name, range)), range)),
			PlusPlus | MinusMinus => {
				let operator = update_operator(&token.r#type)?;
				let operand = self.expression(PREFIX)?;
				let range = range.to(operand.range);
				match operand.kind {
					ExpressionKind::Identifier(target) => {
						Ok(Expression::new(ExpressionKind::Update { operator, prefix: true, target }, range))
					}
					_ => Err(self.error(operand.range, SyntaxErrorType::InvalidUpdateTarget { operator: operator.symbol() })),
				}
			}
			Bang | Tilde | Minus | Plus => {
				let operator = match token.r#type {
					Bang => UnaryOperator::Not,
					Tilde => UnaryOperator::BitNot,
					Minus => UnaryOperator::Negate,
					_ => UnaryOperator::Plus,
				};
				Ok(Expression::unary(operator, self.expression(PREFIX)?, range))
			}
			LeftParen => {
				if self.peek()?.r#type == RightParen {
					let range = range.to(self.peek()?.range());
					return Err(self.error(range, SyntaxErrorType::EmptyParentheses));
				}
				let inner = self.expression(0)?;
				self.consume(RightParen, ")")?;
				Ok(inner)
			}
			LeftBracket => {
				let mut items = Vec::new();
				if self.peek()?.r#type != RightBracket {
					items.push(self.expression(COMMA)?);
					while self.match_next(Comma)? {
						items.push(self.expression(COMMA)?);
					}
				}
				let end = self.consume(RightBracket, "]")?;
				Ok(Expression::new(ExpressionKind::ArrayLiteral(items), range.to(end.range())))
			}
			_ => Err(self.error(range, SyntaxErrorType::ExpectedExpression { found: token.describe() })),
		}
	}

	/// Rule for a token that continues the expression `left`.
	fn led(&mut self, left: Expression, token: Token<'a>) -> Result<Expression, FuguError> {
		match token.r#type {
			PlusPlus | MinusMinus => {
				let operator = update_operator(&token.r#type)?;
				let range = left.range.to(token.range());
				match left.kind {
					ExpressionKind::Identifier(target) => {
						Ok(Expression::new(ExpressionKind::Update { operator, prefix: false, target }, range))
					}
					_ => Err(self.error(left.range, SyntaxErrorType::InvalidUpdateTarget { operator: operator.symbol() })),
				}
			}
			LeftBracket => {
				let index = self.expression(0)?;
				let end = self.consume(RightBracket, "]")?;
				let range = left.range.to(end.range());
				Ok(Expression::new(ExpressionKind::ElementAccess { base: Box::new(left), index: Box::new(index) }, range))
			}
			Comma => {
				let right = self.expression(COMMA)?;
				Ok(Expression::sequence(left, right))
			}
			_ => {
				if let Some(operator) = assign_operator(&token.r#type) {
					let target = match left.kind {
						ExpressionKind::Identifier(target) => target,
						_ => {
							let operator = operator.symbol();
							return Err(self.error(left.range, SyntaxErrorType::InvalidAssignmentTarget { operator }));
						}
					};
					let value = self.expression(ASSIGNMENT)?;
					return Ok(Expression::assignment(target, operator, value));
				}
				let operator = binary_operator(&token.r#type)
					.ok_or_else(|| anyhow!("Token {:?} has a binding power but no infix rule", token.r#type))?;
				let right = self.expression(binding_power(&token.r#type))?;
				Ok(Expression::binary(left, operator, right))
			}
		}
	}

	/// Advance to the next token.
	fn advance(&mut self) -> Result<Token<'a>, FuguError> {
		self.tokens.next().ok_or_else(|| anyhow!("Unexpected end of the token stream").into())
	}

	/// Peek at the current token.
	fn peek(&mut self) -> Result<&Token<'a>, FuguError> {
		self.tokens.peek().ok_or_else(|| anyhow!("Unexpected end of the token stream").into())
	}

	/// Consume the next token if it has the `expected` type
	fn match_next(&mut self, expected: TokenType<'_>) -> Result<bool, FuguError> {
		if self.peek()?.r#type == expected {
			self.advance()?;
			return Ok(true);
		}
		Ok(false)
	}

	/// Consume a token of the `expected` type or report what was found instead
	fn consume(&mut self, expected: TokenType<'_>, symbol: &'static str) -> Result<Token<'a>, FuguError> {
		let token = self.peek()?;
		if token.r#type != expected {
			let (range, found) = (token.range(), token.describe());
			return Err(self.error(range, SyntaxErrorType::ExpectedToken { expected: symbol, found }));
		}
		self.advance()
	}

	fn error(&self, range: SourceRange, r#type: SyntaxErrorType) -> FuguError {
		SyntaxError::new(Location::new(self.file.clone(), range), r#type).into()
	}
}

/// How tightly a token binds to the expression on its left, 0 ends the
/// expression.
fn binding_power(r#type: &TokenType<'_>) -> u8 {
	match r#type {
		Comma => COMMA,
		Equal | PlusEqual | MinusEqual | StarEqual | SlashEqual | PercentEqual | LessLessEqual | GreaterGreaterEqual
		| AmpersandEqual | PipeEqual | CaretEqual => ASSIGNMENT,
		PipePipe => 3,
		AmpersandAmpersand => 4,
		Pipe => 5,
		Caret => 6,
		Ampersand => 7,
		EqualEqual | BangEqual | LessGreater => 8,
		Less | Greater | LessEqual | GreaterEqual => 9,
		LessLess | GreaterGreater => 10,
		Plus | Minus => 11,
		Star | Slash | Percent => 12,
		StarStar => 13,
		PlusPlus | MinusMinus | LeftBracket => POSTFIX,
		_ => 0,
	}
}

fn binary_operator(r#type: &TokenType<'_>) -> Option<BinaryOperator> {
	use BinaryOperator as Op;
	Some(match r#type {
		Plus => Op::Add,
		Minus => Op::Subtract,
		Star => Op::Multiply,
		StarStar => Op::Power,
		Slash => Op::Divide,
		Percent => Op::Modulo,
		EqualEqual => Op::Equal,
		BangEqual | LessGreater => Op::NotEqual,
		Less => Op::Less,
		Greater => Op::Greater,
		LessEqual => Op::LessEqual,
		GreaterEqual => Op::GreaterEqual,
		AmpersandAmpersand => Op::And,
		PipePipe => Op::Or,
		LessLess => Op::ShiftLeft,
		GreaterGreater => Op::ShiftRight,
		Ampersand => Op::BitAnd,
		Pipe => Op::BitOr,
		Caret => Op::BitXor,
		_ => return None,
	})
}

fn assign_operator(r#type: &TokenType<'_>) -> Option<AssignOperator> {
	use AssignOperator as Op;
	Some(match r#type {
		Equal => Op::Assign,
		PlusEqual => Op::Add,
		MinusEqual => Op::Subtract,
		StarEqual => Op::Multiply,
		SlashEqual => Op::Divide,
		PercentEqual => Op::Modulo,
		LessLessEqual => Op::ShiftLeft,
		GreaterGreaterEqual => Op::ShiftRight,
		AmpersandEqual => Op::BitAnd,
		PipeEqual => Op::BitOr,
		CaretEqual => Op::BitXor,
		_ => return None,
	})
}

fn update_operator(r#type: &TokenType<'_>) -> Result<UpdateOperator, FuguError> {
	match r#type {
		PlusPlus => Ok(UpdateOperator::Increment),
		MinusMinus => Ok(UpdateOperator::Decrement),
		other => Err(anyhow!("{other:?} is not an update operator").into()),
	}
}
