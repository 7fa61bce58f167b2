//! Lexer states for the search prompt's query language.
//!
//! ```text
//! MyClass file:.*c$           -> Text(MyClass) Flag(file) Text(.*c$)
//! "a literal" case:no         -> Quote("a literal") Flag(case) Text(no)
//! name\ *=\ *foo              -> Text(name\ *=\ *foo)
//! ```

use crate::error::LexError;
use crate::lexer::{LexState, Lexer};

/// Flag names recognized before a `:`
const FLAG_NAMES: [&str; 2] = ["file", "case"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryToken {
    /// Unquoted word, escapes left as typed
    Text,
    /// Double quoted phrase, delimiters included
    Quote,
    /// Flag name; its value is the following token
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Text,
    Quote,
}

impl LexState for QueryState {
    type Kind = QueryToken;

    fn step(self, lex: &mut Lexer<'_, QueryToken>) -> Result<Option<Self>, LexError> {
        Ok(match self {
            QueryState::Text => lex_text(lex),
            QueryState::Quote => lex_quote(lex),
        })
    }
}

fn is_text_boundary(c: char) -> bool {
    c.is_whitespace() || c == '\\' || c == ':'
}

fn is_flag_name(word: &str) -> bool {
    FLAG_NAMES.iter().any(|name| word.eq_ignore_ascii_case(name))
}

fn lex_text(lex: &mut Lexer<'_, QueryToken>) -> Option<QueryState> {
    lex.accept_run(char::is_whitespace);
    lex.discard();

    match lex.advance() {
        None => return None,
        Some('"') => return Some(QueryState::Quote),
        Some('\\') => {
            lex.advance();
        }
        Some(_) => {}
    }

    loop {
        lex.accept_run_excluding(is_text_boundary);
        if lex.peek() == Some(':') {
            if is_flag_name(lex.pending_text()) {
                lex.emit(QueryToken::Flag);
                lex.advance();
                lex.discard();
                return Some(QueryState::Text);
            }
            lex.advance();
        } else if lex.accept('\\') {
            // Whatever follows is literal, even whitespace or ':'
            lex.advance();
        } else {
            break;
        }
    }
    lex.emit(QueryToken::Text);
    Some(QueryState::Text)
}

fn lex_quote(lex: &mut Lexer<'_, QueryToken>) -> Option<QueryState> {
    loop {
        lex.accept_run_excluding("\\\"");
        match lex.advance() {
            Some('\\') => {
                lex.advance();
            }
            Some(_) => {
                lex.emit(QueryToken::Quote);
                break;
            }
            None => {
                // Unterminated: close it ourselves rather than reject the query
                let closed = format!("{}\"", lex.pending_text());
                lex.emit_value(QueryToken::Quote, closed);
                break;
            }
        }
    }
    Some(QueryState::Text)
}

/// Tokenize a query string.
pub fn tokenize(text: &str) -> Result<Vec<crate::lexer::Token<QueryToken>>, LexError> {
    crate::lexer::run(text, QueryState::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Token;

    fn lex(text: &str) -> Vec<Token<QueryToken>> {
        tokenize(text).unwrap()
    }

    #[test]
    fn test_words_split_on_whitespace() {
        assert_eq!(
            lex("  Hello, 世界.\tDone "),
            vec![
                Token::new(QueryToken::Text, "Hello,"),
                Token::new(QueryToken::Text, "世界."),
                Token::new(QueryToken::Text, "Done"),
            ]
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(lex("").is_empty());
        assert!(lex(" \t\n").is_empty());
    }

    #[test]
    fn test_flags_are_separate_tokens() {
        assert_eq!(
            lex("MyClass FILE:.*c$ Case:no"),
            vec![
                Token::new(QueryToken::Text, "MyClass"),
                Token::new(QueryToken::Flag, "FILE"),
                Token::new(QueryToken::Text, ".*c$"),
                Token::new(QueryToken::Flag, "Case"),
                Token::new(QueryToken::Text, "no"),
            ]
        );
    }

    #[test]
    fn test_other_words_keep_their_colon() {
        assert_eq!(lex("foo:bar"), vec![Token::new(QueryToken::Text, "foo:bar")]);
        assert_eq!(lex("a:b:c"), vec![Token::new(QueryToken::Text, "a:b:c")]);
        assert_eq!(lex("profile:x"), vec![Token::new(QueryToken::Text, "profile:x")]);
    }

    #[test]
    fn test_escapes_stay_in_text() {
        assert_eq!(
            lex(r"name\ *=\ *foo"),
            vec![Token::new(QueryToken::Text, r"name\ *=\ *foo")]
        );
        assert_eq!(lex(r"file\:x"), vec![Token::new(QueryToken::Text, r"file\:x")]);
        assert_eq!(lex(r"\ lead"), vec![Token::new(QueryToken::Text, r"\ lead")]);
    }

    #[test]
    fn test_trailing_backslash() {
        assert_eq!(lex("abc\\"), vec![Token::new(QueryToken::Text, "abc\\")]);
    }

    #[test]
    fn test_quote_keeps_delimiters_and_escapes() {
        assert_eq!(
            lex(r#""Hello, \"World\"" printf"#),
            vec![
                Token::new(QueryToken::Quote, r#""Hello, \"World\"""#),
                Token::new(QueryToken::Text, "printf"),
            ]
        );
    }

    #[test]
    fn test_unterminated_quote_is_closed() {
        assert_eq!(lex("\"Hello"), vec![Token::new(QueryToken::Quote, "\"Hello\"")]);
        assert_eq!(lex("\""), vec![Token::new(QueryToken::Quote, "\"\"")]);
    }

    #[test]
    fn test_quote_in_middle_of_word_is_text() {
        assert_eq!(lex("a\"b"), vec![Token::new(QueryToken::Text, "a\"b")]);
    }

    #[test]
    fn test_flag_without_value() {
        assert_eq!(lex("case:"), vec![Token::new(QueryToken::Flag, "case")]);
    }
}
