pub mod lexer;
pub mod parser;

pub use lexer::{QueryState, QueryToken, tokenize};
pub use parser::{Query, parse_query};
