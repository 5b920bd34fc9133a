// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Table loader for time-slot and strategy statistics.
//!
//! Both inputs are comma-separated text tables whose first line is a header.
//! The header is skipped without inspection; columns are matched by position.
//! Blank lines are ignored and every field is trimmed before conversion.
//!
//! Conversions follow the established trace format:
//!
//! | table      | column              | conversion                                   |
//! |------------|---------------------|----------------------------------------------|
//! | time slots | `time`              | verbatim label                               |
//! | time slots | carbon, `actual_requests` | integer                                |
//! | time slots | `forecast_requests` | decimal, truncated toward zero               |
//! | strategies | `strategy`          | verbatim name                                |
//! | strategies | `elapsed_time`      | decimal, rounded half to even                |
//! | strategies | `error`             | decimal percentage × 100, rounded half to even |
//!
//! Loading is all-or-nothing. The first malformed row aborts the load with a
//! `MalformedInputError` naming the table, the physical line and the column.

use crate::repository::{Repository, Strategy, TimeSlot};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};
use thiserror::Error;

/// The input table a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    TimeSlots,
    Strategies,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Table::TimeSlots => write!(f, "time-slot table"),
            Table::Strategies => write!(f, "strategy table"),
        }
    }
}

/// The error type for table loading.
#[derive(Debug, Error)]
pub enum MalformedInputError {
    /// A row does not have the number of columns the table requires.
    #[error("{table}, line {line}: expected {expected} fields but found {found}")]
    WrongArity {
        table: Table,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A numeric column holds something that is not a number.
    #[error("{table}, line {line}: column `{column}` is not numeric: {value:?}")]
    NonNumeric {
        table: Table,
        line: usize,
        column: &'static str,
        value: String,
    },

    /// The table could not be read.
    #[error("{table}: {source}")]
    Io {
        table: Table,
        #[source]
        source: std::io::Error,
    },
}

impl MalformedInputError {
    /// Returns the table the error refers to.
    pub fn table(&self) -> Table {
        match self {
            Self::WrongArity { table, .. }
            | Self::NonNumeric { table, .. }
            | Self::Io { table, .. } => *table,
        }
    }
}

pub type LoadResult<T> = Result<T, MalformedInputError>;

/// A single data row, split into trimmed fields.
#[derive(Debug)]
pub struct Record<'a> {
    table: Table,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    /// Returns the 1-based physical line number of this row.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the number of fields in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fails unless the row has exactly `expected` fields.
    pub fn expect_arity(&self, expected: usize) -> LoadResult<()> {
        if self.fields.len() != expected {
            return Err(MalformedInputError::WrongArity {
                table: self.table,
                line: self.line,
                expected,
                found: self.fields.len(),
            });
        }
        Ok(())
    }

    /// Returns the field at `position` verbatim.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds; call `expect_arity` first.
    #[inline]
    pub fn text(&self, position: usize) -> &'a str {
        self.fields[position]
    }

    /// Parses the field at `position` as an integer.
    pub fn integer(&self, position: usize, column: &'static str) -> LoadResult<i64> {
        let raw = self.text(position);
        raw.parse::<i64>().map_err(|_| self.non_numeric(column, raw))
    }

    /// Parses the field at `position` as a finite decimal number.
    pub fn decimal(&self, position: usize, column: &'static str) -> LoadResult<f64> {
        let raw = self.text(position);
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.non_numeric(column, raw)),
        }
    }

    /// Parses a decimal and truncates it toward zero.
    pub fn truncated(&self, position: usize, column: &'static str) -> LoadResult<i64> {
        let value = self.decimal(position, column)?;
        self.to_integer(value.trunc(), position, column)
    }

    /// Parses a decimal, scales it and rounds half to even.
    pub fn rounded(&self, position: usize, column: &'static str, scale: f64) -> LoadResult<i64> {
        let value = self.decimal(position, column)?;
        self.to_integer((value * scale).round_ties_even(), position, column)
    }

    fn to_integer(&self, value: f64, position: usize, column: &'static str) -> LoadResult<i64> {
        // `i64::MAX as f64` rounds up to 2^63, which is itself out of range.
        if value >= -(i64::MAX as f64) && value < i64::MAX as f64 {
            Ok(value as i64)
        } else {
            Err(self.non_numeric(column, self.text(position)))
        }
    }

    fn non_numeric(&self, column: &'static str, value: &str) -> MalformedInputError {
        MalformedInputError::NonNumeric {
            table: self.table,
            line: self.line,
            column,
            value: value.to_string(),
        }
    }
}

/// A row type of one of the input tables.
pub trait TableRecord: Sized {
    /// The table this record type is read from.
    const TABLE: Table;

    /// Column names in positional order, as they appear in the header.
    const COLUMNS: &'static [&'static str];

    /// Converts a data row into a record.
    fn from_record(record: &Record<'_>) -> LoadResult<Self>;
}

impl TableRecord for TimeSlot {
    const TABLE: Table = Table::TimeSlots;
    const COLUMNS: &'static [&'static str] = &[
        "time",
        "actual_carbon",
        "forecast_carbon",
        "actual_requests",
        "forecast_requests",
    ];

    fn from_record(record: &Record<'_>) -> LoadResult<Self> {
        record.expect_arity(Self::COLUMNS.len())?;
        Ok(TimeSlot {
            label: record.text(0).to_string(),
            carbon_actual: record.integer(1, Self::COLUMNS[1])?,
            carbon_forecast: record.integer(2, Self::COLUMNS[2])?,
            requests_actual: record.integer(3, Self::COLUMNS[3])?,
            requests_forecast: record.truncated(4, Self::COLUMNS[4])?,
        })
    }
}

impl TableRecord for Strategy {
    const TABLE: Table = Table::Strategies;
    const COLUMNS: &'static [&'static str] = &["strategy", "elapsed_time", "error"];

    fn from_record(record: &Record<'_>) -> LoadResult<Self> {
        record.expect_arity(Self::COLUMNS.len())?;
        Ok(Strategy {
            name: record.text(0).to_string(),
            elapsed_time: record.rounded(1, Self::COLUMNS[1], 1.0)?,
            error: record.rounded(2, Self::COLUMNS[2], 100.0)?,
        })
    }
}

/// Loader for the comma-separated input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLoader {
    has_header: bool,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self { has_header: true }
    }
}

impl TableLoader {
    /// Creates a loader that expects a header row.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures whether the first line is a header to skip.
    #[inline]
    pub fn has_header(mut self, yes: bool) -> Self {
        self.has_header = yes;
        self
    }

    /// Loads all records of type `R` from a buffered reader.
    pub fn from_bufread<R, B>(&self, rdr: B) -> LoadResult<Vec<R>>
    where
        R: TableRecord,
        B: BufRead,
    {
        let mut reader = RecordReader::new(rdr, R::TABLE, self.has_header)?;
        let mut records = Vec::new();
        while let Some(record) = reader.next_record()? {
            records.push(R::from_record(&record)?);
        }
        Ok(records)
    }

    /// Loads all records of type `R` from a file.
    #[inline]
    pub fn from_path<R, P>(&self, path: P) -> LoadResult<Vec<R>>
    where
        R: TableRecord,
        P: AsRef<Path>,
    {
        let file = File::open(path).map_err(|source| MalformedInputError::Io {
            table: R::TABLE,
            source,
        })?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads all records of type `R` from a generic reader.
    #[inline]
    pub fn from_reader<R, I>(&self, r: I) -> LoadResult<Vec<R>>
    where
        R: TableRecord,
        I: Read,
    {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads all records of type `R` from a string slice.
    #[inline]
    pub fn from_str<R>(&self, s: &str) -> LoadResult<Vec<R>>
    where
        R: TableRecord,
    {
        self.from_bufread(s.as_bytes())
    }

    /// Loads both tables of one simulated day into a `Repository`.
    pub fn load_repository<P, Q>(&self, slots_path: P, strategies_path: Q) -> LoadResult<Repository>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let slots = self.from_path::<TimeSlot, _>(slots_path)?;
        let strategies = self.from_path::<Strategy, _>(strategies_path)?;
        Ok(Repository::new(slots, strategies))
    }
}

/// Reads comma-separated rows line by line.
struct RecordReader<R> {
    rdr: R,
    buf: String,
    line: usize,
    table: Table,
}

impl<R: BufRead> RecordReader<R> {
    /// Wraps `rdr`, consuming the header line if there is one.
    fn new(rdr: R, table: Table, has_header: bool) -> LoadResult<Self> {
        let mut reader = Self {
            rdr,
            buf: String::new(),
            line: 0,
            table,
        };
        if has_header {
            reader.fill_line()?;
        }
        Ok(reader)
    }

    /// Refills the line buffer. Returns `Ok(false)` on EOF.
    #[inline]
    fn fill_line(&mut self) -> LoadResult<bool> {
        self.buf.clear();
        let n = self
            .rdr
            .read_line(&mut self.buf)
            .map_err(|source| MalformedInputError::Io {
                table: self.table,
                source,
            })?;
        if n > 0 {
            self.line += 1;
        }
        Ok(n > 0)
    }

    /// Returns the next non-blank row, or `None` at the end of the input.
    fn next_record(&mut self) -> LoadResult<Option<Record<'_>>> {
        loop {
            if !self.fill_line()? {
                return Ok(None);
            }
            if !self.buf.trim().is_empty() {
                break;
            }
        }

        let content = self.buf.trim_end_matches(['\r', '\n']);
        Ok(Some(Record {
            table: self.table,
            line: self.line,
            fields: content.split(',').map(str::trim).collect(),
        }))
    }
}
