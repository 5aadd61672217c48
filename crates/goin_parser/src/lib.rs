pub mod ast;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod stack;
pub mod token;

pub use lexer::{Lexer, TokenSource};
pub use parser::{ParseError, Parser};
