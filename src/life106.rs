//! [Life 1.06](https://conwaylife.com/wiki/Life_1.06) import and export.
//!
//! The format is a `#Life 1.06` header line followed by one `row col` pair
//! per line. A blank line or end of input ends the cell list.

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;

use thiserror::Error;

use crate::sparselife::{Board, BoardScan, Coord, Visitor};

pub const HEADER: &str = "#Life 1.06";

/// Result type returned by fallible Life 1.06 routines.
pub type Life106Result<T> = Result<T, Life106Error>;

/// Error encountered during Life 1.06 import.
#[derive(Error, Debug)]
pub enum Life106Error {
    #[error("expecting input in Life 1.06 format, not {found:?}")]
    MissingHeader { found: String },
    #[error("line {line}: invalid row in {text:?}")]
    InvalidRow { line: usize, text: String },
    #[error("line {line}: invalid column in {text:?}")]
    InvalidColumn { line: usize, text: String },
    #[error("line {line}: unexpected input after column in {text:?}")]
    TrailingInput { line: usize, text: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn parse_cell(line: usize, text: &str) -> Life106Result<Coord> {
    let mut fields = text.split_whitespace();
    let row = fields
        .next()
        .and_then(|f| f.parse::<i64>().ok())
        .ok_or_else(|| Life106Error::InvalidRow {
            line,
            text: text.to_owned(),
        })?;
    let col = fields
        .next()
        .and_then(|f| f.parse::<i64>().ok())
        .ok_or_else(|| Life106Error::InvalidColumn {
            line,
            text: text.to_owned(),
        })?;
    if fields.next().is_some() {
        return Err(Life106Error::TrailingInput {
            line,
            text: text.to_owned(),
        });
    }
    Ok(Coord::new(row, col))
}

/// Seed `board` from Life 1.06 text. Returns the number of cell lines read.
pub fn read_board<R: BufRead>(reader: R, board: &mut Board) -> Life106Result<usize> {
    let mut lines = reader.lines();
    let header = lines.next().transpose()?.unwrap_or_default();
    if header.trim_end() != HEADER {
        return Err(Life106Error::MissingHeader { found: header });
    }

    let mut count = 0;
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        board.initialize(parse_cell(i + 2, &line)?);
        count += 1;
    }
    Ok(count)
}

/// Reporting visitor that writes the board as Life 1.06.
///
/// A write failure stops the traversal; it is returned by
/// [`finish`](Self::finish).
pub struct Life106Writer<W: Write> {
    out: W,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write> Life106Writer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            written: 0,
            error: None,
        }
    }

    /// Flush and return the number of cells written.
    pub fn finish(mut self) -> io::Result<usize> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.written)
    }
}

impl<W: Write> Visitor for Life106Writer<W> {
    fn on_started(&mut self, _board: &mut Board) {
        self.written = 0;
        self.error = writeln!(self.out, "{HEADER}").err();
    }

    fn visit(&mut self, _scan: &mut BoardScan<'_>, cell: Coord) -> ControlFlow<()> {
        if self.error.is_some() {
            return ControlFlow::Break(());
        }
        match writeln!(self.out, "{cell}") {
            Ok(()) => {
                self.written += 1;
                ControlFlow::Continue(())
            }
            Err(err) => {
                self.error = Some(err);
                ControlFlow::Break(())
            }
        }
    }
}

/// Write `board` as Life 1.06. Returns the number of cells written.
pub fn write_board<W: Write>(board: &mut Board, out: W) -> io::Result<usize> {
    let mut writer = Life106Writer::new(out);
    board.accept(&mut writer);
    writer.finish()
}
