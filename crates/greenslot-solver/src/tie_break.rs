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

//! # Tie-Break Policies
//!
//! A tie-break picks the final assignment out of a candidate pool. Three
//! policies are provided:
//!
//! | kind              | picks                                                          |
//! |-------------------|----------------------------------------------------------------|
//! | `last-discovered` | the last pool entry, whatever its objective                    |
//! | `first-optimal`   | the earliest entry at the minimum objective                    |
//! | `lowest-error`    | minimum objective, then minimum error weight, then the latest  |
//!
//! `last-discovered` is the default and reproduces earlier outputs. It is
//! only correct while the backend reports non-increasing objectives; when the
//! last entry is not at the pool minimum a warning is logged and the entry is
//! still returned.

use crate::pool::CandidatePool;
use greenslot_model::model::Model;
use num_traits::{PrimInt, Signed};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Chooses one candidate out of a pool.
pub trait TieBreak<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str;

    /// Returns the position of the chosen candidate, or `None` for an empty pool.
    fn select(&self, model: &Model<T>, pool: &CandidatePool<T>) -> Option<usize>;
}

impl<T> std::fmt::Debug for dyn TieBreak<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TieBreak({})", self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastDiscovered;

impl<T> TieBreak<T> for LastDiscovered
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn name(&self) -> &str {
        "last-discovered"
    }

    fn select(&self, _model: &Model<T>, pool: &CandidatePool<T>) -> Option<usize> {
        let last = pool.last()?;
        if let Some(best) = pool.best_objective() {
            if last.objective_value() > best {
                warn!(
                    selected = %last.objective_value(),
                    best = %best,
                    candidates = pool.len(),
                    "last discovered candidate is not at the pool minimum"
                );
            }
        }
        Some(pool.len() - 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstOptimal;

impl<T> TieBreak<T> for FirstOptimal
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "first-optimal"
    }

    fn select(&self, _model: &Model<T>, pool: &CandidatePool<T>) -> Option<usize> {
        pool.optimal_candidates().next().map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowestError;

impl<T> TieBreak<T> for LowestError
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "lowest-error"
    }

    fn select(&self, model: &Model<T>, pool: &CandidatePool<T>) -> Option<usize> {
        let mut best: Option<(T, T, usize)> = None;
        for (index, candidate) in pool.iter().enumerate() {
            let key = (
                candidate.objective_value(),
                model.error_weight_for(candidate.strategies()),
            );
            // `<=` lets later candidates win exact ties.
            match best {
                Some((objective, error, _)) if key > (objective, error) => {}
                _ => best = Some((key.0, key.1, index)),
            }
        }
        best.map(|(_, _, index)| index)
    }
}

/// Selects a tie-break policy by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreakKind {
    #[default]
    LastDiscovered,
    FirstOptimal,
    LowestError,
}

impl TieBreakKind {
    pub const ALL: [TieBreakKind; 3] = [
        TieBreakKind::LastDiscovered,
        TieBreakKind::FirstOptimal,
        TieBreakKind::LowestError,
    ];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            TieBreakKind::LastDiscovered => "last-discovered",
            TieBreakKind::FirstOptimal => "first-optimal",
            TieBreakKind::LowestError => "lowest-error",
        }
    }

    /// Creates the policy this kind names.
    pub fn build<'a, T>(self) -> Box<dyn TieBreak<T> + 'a>
    where
        T: PrimInt + Signed + std::fmt::Display + 'a,
    {
        match self {
            TieBreakKind::LastDiscovered => Box::new(LastDiscovered),
            TieBreakKind::FirstOptimal => Box::new(FirstOptimal),
            TieBreakKind::LowestError => Box::new(LowestError),
        }
    }
}

impl std::fmt::Display for TieBreakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tie-break policy `{0}` (expected last-discovered, first-optimal or lowest-error)")]
pub struct ParseTieBreakKindError(pub String);

impl std::str::FromStr for TieBreakKind {
    type Err = ParseTieBreakKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        TieBreakKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseTieBreakKindError(s.to_string()))
    }
}
