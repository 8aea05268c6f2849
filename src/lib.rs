//! # How source text becomes bytecode
//!
//! User's source code: `mut average: double = (min + max) / 2;`

//! ## Scanning
//!
//! Also known as `lexing`, takes in the characters and converts them into
//! tokens. Punctuation `(`, numbers `2`, string literals `"hi!"`, identifiers
//! `min` and keywords `mut` are all tokens.
//!
//! Whitespace, newlines and comments are dropped. So the tokens are
//! `["mut", "average", ":", "double", "=", "(", "min", "+", "max", ")", "/",
//! "2", ";"]`. The first malformed character stops the scan with a `LexError`.

//! ## Parsing
//!
//! A Pratt parser turns the tokens into an abstract syntax tree. Every
//! operator has a binding power and every binary operator is
//! left-associative.
//!
//! ``` markdown
//! average (Declaration, double)
//! └── / (Binary)
//!     ├── + (Binary)
//!     │   ├── min (Identifier)
//!     │   └── max (Identifier)
//!     └── 2 (Literal)
//! ```
//!
//! Constant subtrees are folded right after parsing, `2 * 3 + x` becomes
//! `6 + x`.

//! ## Static analysis
//!
//! Every name is resolved against the environment and every expression gets a
//! type from a small lattice: sized integers, floats, strings, chars, arrays
//! and unions. `const` bindings reject assignment, reads of uninitialized
//! variables are errors, and integer literals that fit no 64-bit type are
//! reported as warnings.

//! ## Code generation
//!
//! The checked tree is lowered to instructions for a stack machine. Integer
//! immediates use the narrowest signed encoding, variables live in numbered
//! slots whose load and store opcodes follow the declared type.

pub mod bytecode;
pub mod checker;
pub mod cli;
pub mod environment;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod session;
pub mod statement;
pub mod types;

pub use error::{FuguError, LexError, LexErrorType, NameError, SyntaxError, TypeError, Warning};
pub use session::{CompileOptions, Compilation, Session, compile};
