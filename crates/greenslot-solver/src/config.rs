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

//! `greenslot.toml` configuration.
//!
//! ```toml
//! [input]
//! strategies = "strategies.csv"
//!
//! [[days]]
//! name = "2024-03-01"
//! slots = "slots/2024-03-01.csv"
//!
//! [optimizer]
//! thresholds = [5, 10]
//! time_budget_secs = 30
//! tie_break = "last-discovered"
//! branching = "greedy"
//!
//! [output]
//! directory = "results"
//!
//! [batch]
//! workers = 4
//! ```
//!
//! Relative paths are resolved against the directory of the file they were
//! read from.

use crate::{
    enumerator::{Enumerator, EnumeratorBuilder},
    tie_break::TieBreakKind,
};
use greenslot_bnb::{
    backend::BnbBackend,
    branching::{
        chronological::ChronologicalBuilder, decision::DecisionBuilder, greedy::GreedyEmissionsBuilder,
    },
};
use greenslot_search::num::SolverNumeric;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// Thresholds swept when a configuration names none, in percent.
pub const DEFAULT_THRESHOLDS: [u32; 8] = [1, 2, 4, 5, 8, 10, 12, 15];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GreenslotConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub days: Vec<DayConfig>,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Strategy table shared by all days.
    pub strategies: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayConfig {
    /// Used in the output file name.
    pub name: String,
    pub slots: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    pub thresholds: Vec<u32>,
    pub time_budget_secs: Option<u64>,
    pub tie_break: TieBreakKind,
    pub branching: BranchingKind,
    /// Also report candidates that only equal the incumbent. Their number can
    /// grow exponentially with the slot count; pair with a time budget or a
    /// candidate limit.
    pub enumerate_ties: bool,
    pub candidate_limit: Option<u64>,
    /// Seconds between two search progress log lines; off when unset.
    pub progress_log_secs: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            time_budget_secs: None,
            tie_break: TieBreakKind::default(),
            branching: BranchingKind::default(),
            enumerate_ties: false,
            candidate_limit: None,
            progress_log_secs: None,
        }
    }
}

impl OptimizerConfig {
    #[inline]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }

    /// Builds an enumerator with the branch-and-bound backend described by
    /// this section.
    pub fn enumerator<'a, T>(&self) -> Enumerator<'a, T>
    where
        T: SolverNumeric + 'a,
    {
        let mut builder = EnumeratorBuilder::<T>::new().with_tie_break(self.tie_break);
        builder = match self.branching {
            BranchingKind::Greedy => builder.with_backend(
                self.configure(BnbBackend::<T, _>::new(GreedyEmissionsBuilder::<T>::new())),
            ),
            BranchingKind::Chronological => {
                builder.with_backend(self.configure(BnbBackend::<T, _>::new(ChronologicalBuilder::new())))
            }
        };
        if let Some(budget) = self.time_budget() {
            builder = builder.with_time_budget(budget);
        }
        if let Some(limit) = self.candidate_limit {
            builder = builder.with_candidate_limit(limit);
        }
        builder.build()
    }

    fn configure<T, B>(&self, backend: BnbBackend<T, B>) -> BnbBackend<T, B>
    where
        T: SolverNumeric,
        B: DecisionBuilder<T>,
    {
        let backend = backend.with_tie_enumeration(self.enumerate_ties);
        match self.progress_log_secs {
            Some(secs) => backend.with_progress_log(Duration::from_secs(secs)),
            None => backend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("results"),
        }
    }
}

impl OutputConfig {
    /// `<directory>/<threshold>/assignment_<day>.csv`
    pub fn assignment_path(&self, threshold: u32, day: &str) -> PathBuf {
        self.directory
            .join(threshold.to_string())
            .join(format!("assignment_{}.csv", day))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Selects the branching order of the branch-and-bound backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchingKind {
    /// Widest emission spread first, cheapest strategy first.
    #[default]
    Greedy,
    /// Slots in order, strategies in index order.
    Chronological,
}

impl BranchingKind {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            BranchingKind::Greedy => "greedy",
            BranchingKind::Chronological => "chronological",
        }
    }
}

impl std::fmt::Display for BranchingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown branching `{0}` (expected greedy or chronological)")]
pub struct ParseBranchingKindError(pub String);

impl std::str::FromStr for BranchingKind {
    type Err = ParseBranchingKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(BranchingKind::Greedy),
            "chronological" => Ok(BranchingKind::Chronological),
            _ => Err(ParseBranchingKindError(s.to_string())),
        }
    }
}

impl GreenslotConfig {
    /// Reads, resolves and validates a configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parses and validates a configuration without touching the filesystem.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: GreenslotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.optimizer.thresholds.is_empty(),
            "`optimizer.thresholds` must name at least one threshold"
        );
        anyhow::ensure!(self.batch.workers > 0, "`batch.workers` must be at least 1");
        if let Some(limit) = self.optimizer.candidate_limit {
            anyhow::ensure!(limit > 0, "`optimizer.candidate_limit` must be at least 1");
        }
        for (i, day) in self.days.iter().enumerate() {
            anyhow::ensure!(!day.name.trim().is_empty(), "day #{} has an empty name", i);
            if let Some(other) = self.days[..i].iter().find(|d| d.name == day.name) {
                anyhow::bail!("day name `{}` is used twice", other.name);
            }
        }
        Ok(())
    }

    /// Makes every relative path relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.input.strategies);
        for day in &mut self.days {
            resolve(&mut day.slots);
        }
        resolve(&mut self.output.directory);
    }
}
