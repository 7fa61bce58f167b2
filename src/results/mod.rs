pub mod lexer;
pub mod parser;

pub use lexer::{ResultState, ResultToken, tokenize};
pub use parser::{FileMatchGroup, MatchLine, digit_count, parse_results};
