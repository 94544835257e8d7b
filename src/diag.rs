//! Source locations and the diagnostic reporter.
//!
//! Locations are four-component ranges tracked by the tokenizer and carried
//! on every token, AST node, and error. Lines and columns are zero-based
//! internally; the reporter displays them one-based.

use std::fmt;
use std::io::{self, Write};

use crate::error::Error;

/// A range of source text: first and last character positions, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Loc {
    pub first_line: usize,
    pub first_column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

impl Loc {
    pub fn new(
        first_line: usize,
        first_column: usize,
        last_line: usize,
        last_column: usize,
    ) -> Self {
        Self { first_line, first_column, last_line, last_column }
    }

    /// A single-character range.
    pub fn at(line: usize, column: usize) -> Self {
        Self::new(line, column, line, column)
    }

    /// The smallest range covering both `self` and `other`.
    pub fn to(self, other: Loc) -> Loc {
        let (first_line, first_column) =
            if (self.first_line, self.first_column) <= (other.first_line, other.first_column) {
                (self.first_line, self.first_column)
            } else {
                (other.first_line, other.first_column)
            };
        let (last_line, last_column) =
            if (self.last_line, self.last_column) >= (other.last_line, other.last_column) {
                (self.last_line, self.last_column)
            } else {
                (other.last_line, other.last_column)
            };
        Loc { first_line, first_column, last_line, last_column }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first_line + 1, self.first_column + 1)
    }
}

/// Renders errors against the source text they point into.
///
/// Located errors get the offending line and a caret underline; errors with
/// no position (I/O failures) get the header line only.
pub struct Reporter<'a> {
    file: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> Reporter<'a> {
    pub fn new(file: &'a str, source: &'a str) -> Self {
        Self { file, lines: source.lines().collect() }
    }

    /// Write a full report for `err` to `out`.
    pub fn report(&self, out: &mut dyn Write, err: &Error) -> io::Result<()> {
        match err.loc() {
            Some(loc) => self.report_at(out, loc, &err.to_string()),
            None => writeln!(out, "{}: Error: {}.", self.file, err),
        }
    }

    fn report_at(&self, out: &mut dyn Write, loc: Loc, message: &str) -> io::Result<()> {
        writeln!(
            out,
            "{}:{}:{}: Error: {}.",
            self.file,
            loc.first_line + 1,
            loc.first_column + 1,
            message
        )?;

        let Some(line) = self.lines.get(loc.first_line) else {
            return Ok(());
        };
        let lineno = (loc.first_line + 1).to_string();
        writeln!(out, "   {}\t| {}", lineno, line)?;

        // Tabs keep their width in the caret line so the underline stays
        // aligned with the source line above it.
        let column = loc.first_column.min(line.chars().count());
        let tabs = line.chars().take(column).filter(|&c| c == '\t').count();
        let indent: String = "\t".repeat(tabs) + &" ".repeat(column - tabs);
        writeln!(out, "   {}\t| {}^", " ".repeat(lineno.len()), indent)
    }
}
