//! Lexer states for the search runner's `filename:linenumber:line` output.

use crate::error::LexError;
use crate::lexer::{LexState, Lexer, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultToken {
    FileName,
    LineNumber,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    Start,
    FileName,
    LineNumber,
    Line,
}

impl LexState for ResultState {
    type Kind = ResultToken;

    fn step(self, lex: &mut Lexer<'_, ResultToken>) -> Result<Option<Self>, LexError> {
        match self {
            ResultState::Start => Ok(lex.peek().map(|_| ResultState::FileName)),
            ResultState::FileName => lex_filename(lex),
            ResultState::LineNumber => lex_line_number(lex),
            ResultState::Line => lex_line(lex),
        }
    }
}

fn expect_separator(lex: &mut Lexer<'_, ResultToken>, after: &str) -> Result<(), LexError> {
    if lex.advance() != Some(':') {
        return Err(lex.fail(format!("expected ':' after {after}")));
    }
    lex.discard();
    Ok(())
}

/// Filenames stop at a newline too, so a stray line never merges into the next record.
fn lex_filename(lex: &mut Lexer<'_, ResultToken>) -> Result<Option<ResultState>, LexError> {
    lex.accept_run_excluding(":\n");
    if !lex.has_pending_text() {
        return Err(lex.fail("expected a filename"));
    }
    lex.emit(ResultToken::FileName);
    expect_separator(lex, "filename")?;
    Ok(Some(ResultState::LineNumber))
}

fn lex_line_number(lex: &mut Lexer<'_, ResultToken>) -> Result<Option<ResultState>, LexError> {
    lex.accept_run(|c: char| c.is_ascii_digit());
    if !lex.has_pending_text() {
        return Err(lex.fail("expected line number as digits"));
    }
    match lex.pending_text().parse::<u32>() {
        Ok(0) => return Err(lex.fail("line number must be positive")),
        Ok(_) => {}
        Err(_) => return Err(lex.fail("line number is out of range")),
    }
    lex.emit(ResultToken::LineNumber);
    expect_separator(lex, "line number")?;
    Ok(Some(ResultState::Line))
}

/// The matched line may be empty (a match on a blank line).
fn lex_line(lex: &mut Lexer<'_, ResultToken>) -> Result<Option<ResultState>, LexError> {
    lex.accept_run_excluding('\n');
    lex.emit(ResultToken::Line);
    match lex.advance() {
        Some('\n') => {
            lex.discard();
            Ok(Some(ResultState::Start))
        }
        None => Ok(None),
        Some(_) => Err(lex.fail("expected newline after line")),
    }
}

/// Tokenize search runner output.
pub fn tokenize(text: &str) -> Result<Vec<Token<ResultToken>>, LexError> {
    crate::lexer::run(text, ResultState::Start)
}
