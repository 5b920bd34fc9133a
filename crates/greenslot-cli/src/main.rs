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

//! Greenslot CLI
//!
//! - `optimize`: one day under one error threshold.
//! - `batch`: every (threshold, day) job of a `greenslot.toml`.
//!
//! Binary: greenslot

use anyhow::Context;
use clap::{Parser, Subcommand};
use greenslot_solver::{
    batch::run_batch,
    config::{BranchingKind, GreenslotConfig, OptimizerConfig},
    pipeline::{DayJob, run_day},
    tie_break::TieBreakKind,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Carbon-aware strategy selection per time slot
#[derive(Parser)]
#[command(name = "greenslot", version)]
#[command(about = "Picks the lowest-emission strategy per time slot under an error bound", long_about = None)]
struct Cli {
    /// Log debug output of the solver crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a single day
    Optimize {
        /// Time slot table
        #[arg(long)]
        slots: PathBuf,

        /// Strategy table
        #[arg(long)]
        strategies: PathBuf,

        /// Maximum average error in percent
        #[arg(long)]
        threshold: u32,

        /// Where the assignment table is written
        #[arg(long)]
        output: PathBuf,

        /// Abort the search after this many seconds
        #[arg(long)]
        time_budget_secs: Option<u64>,

        /// last-discovered, first-optimal or lowest-error
        #[arg(long, default_value_t = TieBreakKind::default())]
        tie_break: TieBreakKind,

        /// greedy or chronological
        #[arg(long, default_value_t = BranchingKind::default())]
        branching: BranchingKind,

        /// Also report candidates that only equal the incumbent
        #[arg(long)]
        enumerate_ties: bool,

        /// Log search progress every N seconds
        #[arg(long)]
        progress_log_secs: Option<u64>,
    },

    /// Run every job of a configuration file
    Batch {
        /// Config file path
        #[arg(short, long, default_value = "greenslot.toml")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,greenslot_solver=debug,greenslot_bnb=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Optimize {
            slots,
            strategies,
            threshold,
            output,
            time_budget_secs,
            tie_break,
            branching,
            enumerate_ties,
            progress_log_secs,
        } => {
            let optimizer = OptimizerConfig {
                thresholds: vec![threshold],
                time_budget_secs,
                tie_break,
                branching,
                enumerate_ties,
                progress_log_secs,
                ..OptimizerConfig::default()
            };
            let day = slots
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "day".to_string());
            let job = DayJob {
                day,
                slots,
                strategies,
                threshold,
                output,
            };

            let mut enumerator = optimizer.enumerator::<i64>();
            info!(
                backend = enumerator.backend_name(),
                tie_break = enumerator.tie_break_name(),
                "optimizing"
            );
            let report = run_day(&job, &mut enumerator)
                .with_context(|| format!("failed to optimize {}", job.slots.display()))?;
            println!("{}", report);
        }
        Commands::Batch { config } => {
            let config = GreenslotConfig::from_file(&config)
                .with_context(|| format!("failed to read config {}", config.display()))?;
            let summary = run_batch(&config);
            println!("{}", summary);
            anyhow::ensure!(
                summary.is_success(),
                "{} of {} jobs failed",
                summary.failed.len(),
                summary.num_jobs()
            );
        }
    }

    Ok(())
}
