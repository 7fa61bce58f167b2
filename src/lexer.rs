//! Cursor-based scanner shared by the query and result grammars.
//!
//! A grammar is a state enum implementing [`LexState`]. [`run`] repeatedly
//! calls [`LexState::step`] on the current state until one returns `None`,
//! then hands back the emitted tokens. The scanner itself knows nothing about
//! either grammar; it only tracks three positions:
//!
//! - `start`: where the pending (not yet emitted) token begins
//! - `pos`: the scan cursor
//! - `width`: byte width of the last [`Lexer::advance`], for a one-step undo

use crate::error::LexError;

/// A lexed token: its kind and the text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<K> {
    pub kind: K,
    pub text: String,
}

impl<K> Token<K> {
    pub fn new(kind: K, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A set of characters the scanner can test membership against.
pub trait CharClass {
    fn contains(&self, c: char) -> bool;
}

impl CharClass for char {
    fn contains(&self, c: char) -> bool {
        *self == c
    }
}

impl CharClass for &str {
    fn contains(&self, c: char) -> bool {
        str::contains(self, c)
    }
}

impl<F: Fn(char) -> bool> CharClass for F {
    fn contains(&self, c: char) -> bool {
        self(c)
    }
}

/// One state of a grammar's state machine.
pub trait LexState: Copy {
    /// Token kind this grammar emits
    type Kind;

    /// Perform this state's work and return the next state, or `None` to stop.
    fn step(self, lex: &mut Lexer<'_, Self::Kind>) -> Result<Option<Self>, LexError>;
}

/// Scan `input` starting in `start`, returning every emitted token in order.
pub fn run<S: LexState>(input: &str, start: S) -> Result<Vec<Token<S::Kind>>, LexError> {
    let mut lex = Lexer::new(input);
    let mut state = Some(start);
    while let Some(current) = state {
        state = current.step(&mut lex)?;
    }
    Ok(lex.tokens)
}

/// Scanner over a single immutable string.
pub struct Lexer<'a, K> {
    input: &'a str,
    start: usize,
    pos: usize,
    width: usize,
    tokens: Vec<Token<K>>,
}

impl<'a, K> Lexer<'a, K> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            start: 0,
            pos: 0,
            width: 0,
            tokens: Vec::new(),
        }
    }

    /// Consume and return the next character, or `None` at end of input.
    pub fn advance(&mut self) -> Option<char> {
        match self.input[self.pos..].chars().next() {
            Some(c) => {
                self.width = c.len_utf8();
                self.pos += self.width;
                Some(c)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    /// Undo the most recent [`advance`](Self::advance). Single level only.
    pub fn retreat(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    pub fn peek(&mut self) -> Option<char> {
        let c = self.advance();
        self.retreat();
        c
    }

    /// Consume the next character if it is in `class`.
    pub fn accept(&mut self, class: impl CharClass) -> bool {
        match self.advance() {
            Some(c) if class.contains(c) => true,
            _ => {
                self.retreat();
                false
            }
        }
    }

    /// Consume characters while they are in `class`.
    pub fn accept_run(&mut self, class: impl CharClass) {
        loop {
            match self.advance() {
                Some(c) if class.contains(c) => {}
                _ => {
                    self.retreat();
                    break;
                }
            }
        }
    }

    /// Consume characters until one in `class` or the end of input.
    pub fn accept_run_excluding(&mut self, class: impl CharClass) {
        loop {
            match self.advance() {
                Some(c) if !class.contains(c) => {}
                _ => {
                    self.retreat();
                    break;
                }
            }
        }
    }

    pub fn pending_text(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    pub fn has_pending_text(&self) -> bool {
        self.pos > self.start
    }

    /// Emit the pending text as a token of `kind`.
    pub fn emit(&mut self, kind: K) {
        let text = self.pending_text();
        self.emit_value(kind, text);
    }

    /// Emit `value` in place of the pending text.
    pub fn emit_value(&mut self, kind: K, value: impl Into<String>) {
        self.tokens.push(Token::new(kind, value));
        self.start = self.pos;
    }

    /// Drop the pending text.
    pub fn discard(&mut self) {
        self.start = self.pos;
    }

    /// Build an error located at the cursor. Return it from a state to abort the run.
    pub fn fail(&self, message: impl Into<String>) -> LexError {
        LexError::new(message, self.pos)
    }
}
