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

//! # Batch Driver
//!
//! Runs every (threshold, day) pair of a configuration. Jobs share no state:
//! each worker thread owns its own `Enumerator` and pulls the next job index
//! from an atomic counter. A failed job is logged and recorded, and the batch
//! continues with the next one.
//!
//! Results are returned in job order (thresholds outer, days inner), whatever
//! order the workers finished in.

use crate::{
    config::GreenslotConfig,
    enumerator::Enumerator,
    error::OptimizeError,
    pipeline::{DayJob, run_day},
};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use tracing::{info, warn};

/// A job that produced an assignment file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedJob {
    pub job: DayJob,
    pub emissions: i64,
    pub average_error: f64,
    pub solve_time: Duration,
    pub candidates: usize,
}

/// A job that was skipped.
#[derive(Debug)]
pub struct FailedJob {
    pub job: DayJob,
    pub error: OptimizeError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub completed: Vec<CompletedJob>,
    pub failed: Vec<FailedJob>,
    pub elapsed: Duration,
}

impl BatchSummary {
    #[inline]
    pub fn num_jobs(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Batch Summary:")?;
        writeln!(f, "  Jobs: {}", self.num_jobs())?;
        writeln!(f, "  Completed: {}", self.completed.len())?;
        writeln!(f, "  Failed: {}", self.failed.len())?;
        for failed in &self.failed {
            writeln!(
                f,
                "    {} @ {}%: {}",
                failed.job.day, failed.job.threshold, failed.error
            )?;
        }
        write!(f, "  Elapsed (secs): {:.3}", self.elapsed.as_secs_f64())
    }
}

/// Expands a configuration into its jobs, thresholds outer and days inner.
pub fn plan_jobs(config: &GreenslotConfig) -> Vec<DayJob> {
    config
        .optimizer
        .thresholds
        .iter()
        .flat_map(|&threshold| {
            config.days.iter().map(move |day| DayJob {
                day: day.name.clone(),
                slots: day.slots.clone(),
                strategies: config.input.strategies.clone(),
                threshold,
                output: config.output.assignment_path(threshold, &day.name),
            })
        })
        .collect()
}

type JobOutcome = Result<CompletedJob, FailedJob>;

/// Runs every job of `config` on `config.batch.workers` threads.
pub fn run_batch(config: &GreenslotConfig) -> BatchSummary {
    let start_time = Instant::now();
    let jobs = plan_jobs(config);
    let workers = config.batch.workers.clamp(1, jobs.len().max(1));
    info!(jobs = jobs.len(), workers, "batch started");

    let next_job = AtomicUsize::new(0);
    let mut outcomes: Vec<(usize, JobOutcome)> = Vec::with_capacity(jobs.len());

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let jobs = &jobs;
                let next_job = &next_job;
                scope.spawn(move || {
                    let mut enumerator = config.optimizer.enumerator::<i64>();
                    let mut finished = Vec::new();
                    loop {
                        let index = next_job.fetch_add(1, Ordering::Relaxed);
                        let Some(job) = jobs.get(index) else {
                            break;
                        };
                        finished.push((index, execute(job, &mut enumerator)));
                    }
                    finished
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(finished) => outcomes.extend(finished),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
    });

    outcomes.sort_unstable_by_key(|(index, _)| *index);
    let mut summary = BatchSummary::default();
    for (_, outcome) in outcomes {
        match outcome {
            Ok(completed) => summary.completed.push(completed),
            Err(failed) => summary.failed.push(failed),
        }
    }
    summary.elapsed = start_time.elapsed();

    info!(
        completed = summary.completed.len(),
        failed = summary.failed.len(),
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "batch finished"
    );
    summary
}

fn execute(job: &DayJob, enumerator: &mut Enumerator<'_, i64>) -> JobOutcome {
    match run_day(job, enumerator) {
        Ok(report) => Ok(CompletedJob {
            job: job.clone(),
            emissions: report.emissions,
            average_error: report.average_error,
            solve_time: report.solve_time,
            candidates: report.candidates,
        }),
        Err(error) => {
            warn!(day = %job.day, threshold = job.threshold, error = %error, "job skipped");
            Err(FailedJob {
                job: job.clone(),
                error,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DayConfig, InputConfig};
    use std::path::{Path, PathBuf};

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config(dir: &Path, workers: usize) -> GreenslotConfig {
        let strategies = write(
            dir,
            "strategies.csv",
            "strategy,elapsed_time,error\nfast,10,5\nbalanced,14,2\nprecise,20,0\n",
        );
        let monday = write(
            dir,
            "monday.csv",
            "time,actual_carbon,forecast_carbon,actual_requests,forecast_requests\n\
             00:00,100,100,10,10\n00:30,200,200,5,5\n01:00,150,140,8,8\n",
        );
        let tuesday = write(
            dir,
            "tuesday.csv",
            "time,actual_carbon,forecast_carbon,actual_requests,forecast_requests\n\
             00:00,90,95,12,12\n00:30,300,280,3,3\n",
        );
        let broken = write(dir, "broken.csv", "time,actual_carbon\n00:00,1\n");

        let mut config = GreenslotConfig {
            input: InputConfig { strategies },
            days: vec![
                DayConfig { name: "monday".into(), slots: monday },
                DayConfig { name: "tuesday".into(), slots: tuesday },
                DayConfig { name: "broken".into(), slots: broken },
            ],
            optimizer: Default::default(),
            output: Default::default(),
            batch: Default::default(),
        };
        config.optimizer.thresholds = vec![0, 3, 10];
        config.output.directory = dir.join("results");
        config.batch.workers = workers;
        config
    }

    #[test]
    fn test_plan_orders_thresholds_outer() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = plan_jobs(&config(dir.path(), 1));
        let order: Vec<(u32, &str)> = jobs.iter().map(|j| (j.threshold, j.day.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (0, "monday"),
                (0, "tuesday"),
                (0, "broken"),
                (3, "monday"),
                (3, "tuesday"),
                (3, "broken"),
                (10, "monday"),
                (10, "tuesday"),
                (10, "broken"),
            ]
        );
        assert_eq!(
            jobs[3].output,
            dir.path().join("results").join("3").join("assignment_monday.csv")
        );
    }

    #[test]
    fn test_failed_jobs_are_skipped_and_others_complete() {
        let dir = tempfile::tempdir().unwrap();
        let summary = run_batch(&config(dir.path(), 3));

        assert_eq!(summary.num_jobs(), 9);
        assert_eq!(summary.completed.len(), 6);
        assert_eq!(summary.failed.len(), 3);
        assert!(!summary.is_success());
        assert!(summary
            .failed
            .iter()
            .all(|f| f.job.day == "broken" && matches!(f.error, OptimizeError::MalformedInput(_))));

        for completed in &summary.completed {
            assert!(completed.job.output.exists());
            assert!(completed.average_error <= completed.job.threshold as f64 / 100.0);
        }
        let thresholds: Vec<u32> = summary.completed.iter().map(|c| c.job.threshold).collect();
        assert_eq!(thresholds, vec![0, 0, 3, 3, 10, 10]);
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();
        let single = run_batch(&config(first_dir.path(), 1));
        let parallel = run_batch(&config(second_dir.path(), 4));

        assert_eq!(single.completed.len(), parallel.completed.len());
        for (a, b) in single.completed.iter().zip(&parallel.completed) {
            assert_eq!(a.job.day, b.job.day);
            assert_eq!(a.job.threshold, b.job.threshold);
            assert_eq!(a.emissions, b.emissions);
            assert_eq!(
                std::fs::read(&a.job.output).unwrap(),
                std::fs::read(&b.job.output).unwrap()
            );
        }
    }
}
