use std::fmt;

use crate::error::{Error, Result};
use crate::lexer::Token;
use crate::query::lexer::{QueryToken, tokenize};

/// `file:` value meaning "search every file"
const ANY_FILE: &str = "*";

/// Parsed query representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    /// Literal/regex fragments and unquoted phrases, OR-ed together
    pub terms: Vec<String>,
    /// Regex restricting which filenames are searched (file:.*rs$)
    pub file_filter: Option<String>,
    /// Cleared by case:no
    pub case_sensitive: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            file_filter: None,
            case_sensitive: true,
        }
    }
}

impl Query {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_file_filter(mut self, filter: impl Into<String>) -> Self {
        self.file_filter = Some(filter.into());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The single search pattern: the lone term, or `(a|b|...)` for several.
    pub fn pattern(&self) -> Result<String> {
        match self.terms.as_slice() {
            [] => Err(Error::EmptyQuery),
            [term] => Ok(term.clone()),
            terms => Ok(format!("({})", terms.join("|"))),
        }
    }

    /// Effective file filter, with the `*` wildcard treated as no filter
    pub fn effective_file_filter(&self) -> Option<&str> {
        self.file_filter.as_deref().filter(|f| *f != ANY_FILE)
    }

    /// Argument vector for the search runner: `[-f FILTER] [-i] PATTERN`.
    pub fn to_args(&self) -> Result<Vec<String>> {
        let pattern = self.pattern()?;
        let mut args = Vec::with_capacity(4);
        if let Some(filter) = self.effective_file_filter() {
            args.push("-f".to_string());
            args.push(filter.to_string());
        }
        if !self.case_sensitive {
            args.push("-i".to_string());
        }
        args.push(pattern);
        Ok(args)
    }
}

/// Query text as it would be typed. Ordinary queries parse back to an equal `Query`.
///
/// Quoted phrases keep backslashes as typed, so a term that needs quoting and
/// has a backslash right before a `"` or at its end does not survive the trip.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.terms.iter().map(|t| display_term(t)).collect();
        if let Some(filter) = &self.file_filter {
            parts.push(format!("file:{}", display_term(filter)));
        }
        if !self.case_sensitive {
            parts.push("case:no".to_string());
        }
        f.write_str(&parts.join(" "))
    }
}

fn display_term(term: &str) -> String {
    let needs_quotes = term.is_empty()
        || term.chars().any(|c| c.is_whitespace() || c == '"' || c == ':');
    if needs_quotes {
        format!("\"{}\"", term.replace('"', "\\\""))
    } else {
        term.to_string()
    }
}

/// Parse a query string into a Query structure
///
/// Example queries:
///
/// ```text
/// "A literal string"
/// ^.*someRegex.*$
/// MyClass file:.*c$
/// myclass case:no
/// ```
pub fn parse_query(text: &str) -> Result<Query> {
    let tokens = tokenize(text)?;
    interpret(tokens)
}

/// Fold a token sequence into a query.
pub(crate) fn interpret(tokens: Vec<Token<QueryToken>>) -> Result<Query> {
    let mut query = Query::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match token.kind {
            QueryToken::Text => query.terms.push(token.text),
            QueryToken::Quote => query.terms.push(unquote(&token.text)),
            QueryToken::Flag => {
                let flag = token.text.to_lowercase();
                let value = match tokens.next() {
                    Some(t) if t.kind == QueryToken::Quote => unquote(&t.text),
                    Some(t) => t.text,
                    None => return Err(Error::MissingFlagValue(flag)),
                };
                match flag.as_str() {
                    "case" => query.case_sensitive = !value.eq_ignore_ascii_case("no"),
                    "file" => {
                        query.file_filter = (value != ANY_FILE).then_some(value);
                    }
                    _ => return Err(Error::UnsupportedFlag(flag)),
                }
            }
        }
    }

    Ok(query)
}

/// Strip the delimiters of a quoted phrase and unescape `\"`.
///
/// Other backslash sequences are regex syntax and are kept as typed.
fn unquote(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
