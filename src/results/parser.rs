use std::fmt;

use serde::Serialize;

use crate::error::{LexError, Result};
use crate::results::lexer::tokenize;

/// Width of the right-justified line-number column
const LINE_NUMBER_WIDTH: usize = 5;

/// One matched source line. Line numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchLine {
    pub line_number: u32,
    pub text: String,
}

impl MatchLine {
    pub fn new(line_number: u32, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
        }
    }
}

/// Every matched line of one file, in the order the runner printed them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatchGroup {
    filename: String,
    lines: Vec<MatchLine>,
}

impl FileMatchGroup {
    /// # Panics
    ///
    /// If `filename` or `lines` is empty.
    pub fn new(filename: impl Into<String>, lines: Vec<MatchLine>) -> Self {
        let filename = filename.into();
        assert!(!filename.is_empty(), "a match group needs a filename");
        assert!(!lines.is_empty(), "a match group needs at least one line");
        Self { filename, lines }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn lines(&self) -> &[MatchLine] {
        &self.lines
    }

    /// Rendered rows below the filename header, paired with the line each
    /// shows. Gap markers between non-contiguous lines carry `None`.
    pub fn rows(&self) -> Vec<(String, Option<&MatchLine>)> {
        let mut rows = Vec::with_capacity(self.lines.len() * 2);
        let mut prev: Option<u32> = None;
        for line in &self.lines {
            if let Some(p) = prev {
                if p.checked_add(1) != Some(line.line_number) {
                    rows.push((gap_marker(p), None));
                }
            }
            rows.push((
                format!("{:>w$}: {}", line.line_number, line.text, w = LINE_NUMBER_WIDTH),
                Some(line),
            ));
            prev = Some(line.line_number);
        }
        rows
    }
}

/// `filename:` followed by one row per line, with `.` rows marking skipped lines.
impl fmt::Display for FileMatchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.filename)?;
        for (row, _) in self.rows() {
            write!(f, "\n{row}")?;
        }
        Ok(())
    }
}

/// Number of decimal digits in `n`; 0 has one digit.
pub fn digit_count(n: u32) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

fn gap_marker(prev_line_number: u32) -> String {
    let dots = ".".repeat(digit_count(prev_line_number));
    format!("{:>w$}", dots, w = LINE_NUMBER_WIDTH)
}

/// Parse the output of the search runner into per-file groups.
///
/// The expected format is one match per line:
///
/// ```text
/// a.txt:1:Too many cooks
/// a.txt:2:TOO MANY cooks
/// b.txt:34:How to cook
/// ```
///
/// Empty output is zero groups, not an error.
pub fn parse_results(text: &str) -> Result<Vec<FileMatchGroup>> {
    let mut groups = Vec::new();
    let mut current: Option<(String, Vec<MatchLine>)> = None;

    let mut tokens = tokenize(text)?.into_iter();
    while let Some(file) = tokens.next() {
        let (Some(number), Some(line)) = (tokens.next(), tokens.next()) else {
            return Err(LexError::new("incomplete match record", text.len()).into());
        };
        let line_number: u32 = number
            .text
            .parse()
            .map_err(|_| LexError::new("line number is out of range", text.len()))?;
        let matched = MatchLine::new(line_number, line.text);

        match &mut current {
            Some((filename, lines)) if *filename == file.text => lines.push(matched),
            _ => {
                if let Some((filename, lines)) = current.take() {
                    groups.push(FileMatchGroup::new(filename, lines));
                }
                current = Some((file.text, vec![matched]));
            }
        }
    }

    if let Some((filename, lines)) = current {
        groups.push(FileMatchGroup::new(filename, lines));
    }
    Ok(groups)
}
