pub mod eval;
pub mod interp;
pub mod lex;
pub mod postfix;
pub mod store;

pub use eval::{EvalError, evaluate};
pub use interp::{Interpreter, UnrecognizedStatement};
pub use lex::{Lexer, Op, Resolve, Token, TokenKind, UnexpectedCharacter};
pub use postfix::{UnbalancedParens, convert};
pub use store::Store;
