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

//! Writer for the per-slot assignment table.
//!
//! One row per slot in slot order, carrying the slot label, the name of the
//! chosen strategy and both the actual and forecast figures of the slot. No
//! value is computed here, so identical inputs produce identical bytes.

use crate::{index::StrategyIndex, repository::Repository};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use thiserror::Error;

/// Column header of the assignment table.
pub const ASSIGNMENT_HEADER: &str =
    "time_slot,strategy,carbon_actual,carbon_forecast,requests_actual,requests_forecast";

/// The error type for exporting an assignment.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("assignment covers {found} slots but the repository has {expected}")]
    SlotCountMismatch { expected: usize, found: usize },

    #[error("slot {slot} is assigned to unknown strategy {strategy}")]
    UnknownStrategy { slot: usize, strategy: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Serializes assignments of one repository.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentExporter<'a> {
    repository: &'a Repository,
}

impl<'a> AssignmentExporter<'a> {
    #[inline]
    pub fn new(repository: &'a Repository) -> Self {
        Self { repository }
    }

    /// Writes the table for `strategies` to `writer`.
    ///
    /// The assignment is validated before the first byte is written.
    pub fn write_to<W>(&self, strategies: &[StrategyIndex], mut writer: W) -> ExportResult<()>
    where
        W: Write,
    {
        self.validate(strategies)?;

        writeln!(writer, "{}", ASSIGNMENT_HEADER)?;
        for (slot, &strategy_index) in self.repository.slots().iter().zip(strategies) {
            let strategy = self.repository.strategy(strategy_index);
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                slot.label,
                strategy.name,
                slot.carbon_actual,
                slot.carbon_forecast,
                slot.requests_actual,
                slot.requests_forecast
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Renders the table into a string.
    pub fn to_string(&self, strategies: &[StrategyIndex]) -> ExportResult<String> {
        let mut buf = Vec::new();
        self.write_to(strategies, &mut buf)?;
        // Every byte comes from `&str` or integer formatting.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes the table to `path`, creating or truncating the file.
    ///
    /// Nothing is created if the assignment does not fit the repository.
    pub fn to_path<P>(&self, strategies: &[StrategyIndex], path: P) -> ExportResult<()>
    where
        P: AsRef<Path>,
    {
        self.validate(strategies)?;
        let file = File::create(path)?;
        self.write_to(strategies, BufWriter::new(file))
    }

    fn validate(&self, strategies: &[StrategyIndex]) -> ExportResult<()> {
        if strategies.len() != self.repository.num_slots() {
            return Err(ExportError::SlotCountMismatch {
                expected: self.repository.num_slots(),
                found: strategies.len(),
            });
        }
        let num_strategies = self.repository.num_strategies();
        if let Some((slot, strategy)) = strategies
            .iter()
            .enumerate()
            .find(|(_, s)| s.get() >= num_strategies)
        {
            return Err(ExportError::UnknownStrategy {
                slot,
                strategy: strategy.get(),
            });
        }
        Ok(())
    }
}
