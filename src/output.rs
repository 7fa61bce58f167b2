//! Results pane rendering and terminal output
//!
//! The pane mirrors what an editor shows after a search:
//!
//! ```text
//! Searching for "needle"
//!
//! src/lib.rs:
//!    12: let needle = 1;
//!    ..
//!    40: needle += 1;
//!
//! 2 matches across 1 files
//! ```
//!
//! Each row remembers which file location it shows so a cursor row can be
//! turned back into `file:line:column` (go to file).

use std::collections::HashSet;
use std::fmt;
use std::io::{self, Write};
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::query::Query;
use crate::results::FileMatchGroup;

/// A position inside a searched file. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: String,
    pub line_number: u32,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line_number, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Heading,
    Blank,
    FileName,
    /// A matched line; `gutter` is the byte length of the line-number prefix
    Match { gutter: usize },
    Gap,
    Summary,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub text: String,
    pub kind: RowKind,
    pub location: Option<Location>,
    /// Byte range of the first pattern match within `text`
    pub highlight: Option<Range<usize>>,
}

impl Row {
    fn plain(kind: RowKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            location: None,
            highlight: None,
        }
    }
}

/// Rendered search results
#[derive(Debug, Clone)]
pub struct ResultsView {
    rows: Vec<Row>,
}

impl ResultsView {
    /// Lay out the pane for `groups`. `query` drives match highlighting and
    /// columns; without it every location points at column 1.
    pub fn render(query_text: &str, query: Option<&Query>, groups: &[FileMatchGroup]) -> Self {
        let matcher = query.and_then(build_matcher);
        let mut rows = vec![
            Row::plain(RowKind::Heading, format!("Searching for \"{query_text}\"")),
            Row::plain(RowKind::Blank, ""),
        ];

        if groups.is_empty() {
            rows.push(Row::plain(RowKind::Summary, "No matches found"));
            return Self { rows };
        }

        for group in groups {
            rows.push(Row::plain(RowKind::FileName, format!("{}:", group.filename())));
            for (text, line) in group.rows() {
                let Some(line) = line else {
                    rows.push(Row::plain(RowKind::Gap, text));
                    continue;
                };
                let gutter = text.len() - line.text.len();
                let span = matcher
                    .as_ref()
                    .and_then(|re| re.find(&line.text))
                    .map(|m| m.range());
                rows.push(Row {
                    kind: RowKind::Match { gutter },
                    location: Some(Location {
                        filename: group.filename().to_string(),
                        line_number: line.line_number,
                        column: span.as_ref().map_or(1, |s| s.start + 1),
                    }),
                    highlight: span.map(|s| s.start + gutter..s.end + gutter),
                    text,
                });
            }
            rows.push(Row::plain(RowKind::Blank, ""));
        }

        let match_count: usize = groups.iter().map(|g| g.lines().len()).sum();
        let file_count = groups
            .iter()
            .map(|g| g.filename())
            .collect::<HashSet<_>>()
            .len();
        rows.push(Row::plain(
            RowKind::Summary,
            format!("{match_count} matches across {file_count} files"),
        ));
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// File location shown on pane row `row` (0-based), if any.
    pub fn location_at(&self, row: usize) -> Option<&Location> {
        self.rows.get(row).and_then(|r| r.location.as_ref())
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row.text)?;
        }
        Ok(())
    }
}

/// Compile the query's pattern the way the runner will apply it.
///
/// Runner regex syntax is close to but not exactly `regex`'s; a pattern that
/// does not compile here simply goes unhighlighted.
fn build_matcher(query: &Query) -> Option<Regex> {
    let pattern = query.pattern().ok()?;
    RegexBuilder::new(&pattern)
        .case_insensitive(!query.case_sensitive)
        .build()
        .ok()
}

/// Print the pane to stdout, colored when `color` is set
pub fn print_results(view: &ResultsView, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_results(&mut stdout, view)
}

fn write_results(out: &mut impl WriteColor, view: &ResultsView) -> io::Result<()> {
    for row in view.rows() {
        match row.kind {
            RowKind::FileName => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
                write!(out, "{}", row.text)?;
                out.reset()?;
            }
            RowKind::Gap => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                write!(out, "{}", row.text)?;
                out.reset()?;
            }
            RowKind::Match { gutter } => write_match_row(out, row, gutter)?,
            RowKind::Heading | RowKind::Blank | RowKind::Summary => write!(out, "{}", row.text)?,
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_match_row(out: &mut impl WriteColor, row: &Row, gutter: usize) -> io::Result<()> {
    let (number, content) = row.text.split_at(gutter);

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", number)?;
    out.reset()?;

    match &row.highlight {
        Some(span) => {
            let start = span.start - gutter;
            let end = span.end - gutter;
            write!(out, "{}", &content[..start])?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "{}", &content[start..end])?;
            out.reset()?;
            write!(out, "{}", &content[end..])
        }
        None => write!(out, "{}", content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{MatchLine, parse_results};
    use termcolor::NoColor;

    fn sample_groups() -> Vec<FileMatchGroup> {
        vec![
            FileMatchGroup::new(
                "src/a.rs",
                vec![
                    MatchLine::new(1, "let needle = 1;"),
                    MatchLine::new(2, "needle += 1;"),
                    MatchLine::new(10, "    return NEEDLE;"),
                ],
            ),
            FileMatchGroup::new("src/b.rs", vec![MatchLine::new(12, "// needle")]),
        ]
    }

    #[test]
    fn test_pane_text() {
        let view = ResultsView::render("needle", None, &sample_groups());
        let expected = "\
Searching for \"needle\"

src/a.rs:
    1: let needle = 1;
    2: needle += 1;
    .
   10:     return NEEDLE;

src/b.rs:
   12: // needle

4 matches across 2 files
";
        assert_eq!(view.to_string(), expected);
    }

    #[test]
    fn test_single_match_pane() {
        let groups = parse_results("/p/test.py:12:_NEEDLE = 'x'\n").unwrap();
        let view = ResultsView::render("x", None, &groups);
        assert_eq!(
            view.to_string(),
            "Searching for \"x\"\n\n/p/test.py:\n   12: _NEEDLE = 'x'\n\n1 matches across 1 files\n"
        );
    }

    #[test]
    fn test_no_matches_pane() {
        let view = ResultsView::render("nothing", None, &[]);
        assert_eq!(view.to_string(), "Searching for \"nothing\"\n\nNo matches found\n");
        assert!(view.rows().iter().all(|r| r.location.is_none()));
    }

    #[test]
    fn test_location_at() {
        let query = Query::new(["needle"]);
        let view = ResultsView::render("needle", Some(&query), &sample_groups());

        assert_eq!(view.location_at(0), None);
        assert_eq!(view.location_at(2), None);
        assert_eq!(
            view.location_at(3),
            Some(&Location {
                filename: "src/a.rs".to_string(),
                line_number: 1,
                column: 5,
            })
        );
        assert_eq!(view.location_at(5), None);
        // case sensitive: NEEDLE does not match, column falls back to 1
        assert_eq!(view.location_at(6).map(|l| l.column), Some(1));
        assert_eq!(
            view.location_at(9).map(ToString::to_string),
            Some("src/b.rs:12:4".to_string())
        );
        assert_eq!(view.location_at(100), None);
    }

    #[test]
    fn test_case_insensitive_highlight() {
        let query = Query::new(["needle"]).case_insensitive();
        let view = ResultsView::render("needle case:no", Some(&query), &sample_groups());
        let row = &view.rows()[6];
        assert_eq!(row.location.as_ref().map(|l| l.column), Some(12));
        let span = row.highlight.clone().unwrap();
        assert_eq!(&row.text[span], "NEEDLE");
    }

    #[test]
    fn test_invalid_pattern_is_not_highlighted() {
        let query = Query::new(["(unclosed"]);
        let groups = parse_results("a.rs:1:(unclosed\n").unwrap();
        let view = ResultsView::render("(unclosed", Some(&query), &groups);
        assert!(view.rows().iter().all(|r| r.highlight.is_none()));
        assert_eq!(view.location_at(3).map(|l| l.column), Some(1));
    }

    #[test]
    fn test_write_results_without_color() {
        let query = Query::new(["needle"]);
        let view = ResultsView::render("needle", Some(&query), &sample_groups());
        let mut out = NoColor::new(Vec::new());
        write_results(&mut out, &view).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, view.to_string());
    }
}
