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

//! One simulated day, from tables to exported assignment.
//!
//! `optimize_day` builds the model, enumerates and scores the chosen
//! assignment. `run_day` adds loading and export around it. The steps are
//! strictly sequential and nothing is written unless the solve succeeded.

use crate::{
    enumerator::Enumerator,
    error::{OptimizeError, OptimizeResult},
};
use greenslot_model::{
    assignment::Assignment,
    export::{AssignmentExporter, ExportError},
    loading::TableLoader,
    model::ModelBuilder,
    repository::Repository,
    score,
};
use greenslot_search::num::SolverNumeric;
use num_traits::{PrimInt, Signed};
use std::{path::PathBuf, time::Duration};
use tracing::{debug, info};

/// Inputs and output location of one (day, threshold) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayJob {
    pub day: String,
    pub slots: PathBuf,
    pub strategies: PathBuf,
    pub threshold: u32,
    pub output: PathBuf,
}

/// The optimized assignment of one day and its scores.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport<T> {
    pub assignment: Assignment<T>,
    /// Forecast emissions of the assignment.
    pub emissions: i64,
    /// Request-weighted mean error as a fraction.
    pub average_error: f64,
    pub solve_time: Duration,
    /// Number of candidates the backend reported.
    pub candidates: usize,
}

impl<T> std::fmt::Display for DayReport<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Best assignment:")?;
        write!(f, "{}", self.assignment)?;
        writeln!(f, "CO2: {}", self.emissions)?;
        writeln!(f, "Average error: {:.5}", self.average_error)?;
        write!(f, "Solve time (secs): {:.3}", self.solve_time.as_secs_f64())
    }
}

/// Optimizes one day under `threshold` percent average error.
pub fn optimize_day<T>(
    repository: &Repository,
    threshold: u32,
    enumerator: &mut Enumerator<'_, T>,
) -> OptimizeResult<DayReport<T>>
where
    T: SolverNumeric,
{
    let model = ModelBuilder::new(repository)
        .error_threshold(threshold)
        .build::<T>()?;
    debug!(model = %model, search_space = %model.complexity(), "model built");

    let enumeration = enumerator.enumerate(&model)?;
    let solve_time = enumeration.statistics().solve_duration;
    let candidates = enumeration.num_candidates();
    let assignment = enumeration.into_assignment();
    debug_assert!(model.is_within_capacity(assignment.strategies()));

    let emissions = score::emissions(repository, assignment.strategies());
    let average_error = score::average_error(repository, assignment.strategies());

    info!(
        slots = repository.num_slots(),
        threshold,
        emissions,
        average_error,
        solve_secs = solve_time.as_secs_f64(),
        candidates,
        "day optimized"
    );

    Ok(DayReport {
        assignment,
        emissions,
        average_error,
        solve_time,
        candidates,
    })
}

/// Loads the tables of `job`, optimizes and writes the assignment table.
pub fn run_day<T>(job: &DayJob, enumerator: &mut Enumerator<'_, T>) -> OptimizeResult<DayReport<T>>
where
    T: SolverNumeric,
{
    let repository = TableLoader::new().load_repository(&job.slots, &job.strategies)?;
    debug!(
        day = %job.day,
        slots = repository.num_slots(),
        strategies = repository.num_strategies(),
        "tables loaded"
    );

    let report = optimize_day(&repository, job.threshold, enumerator)?;

    if let Some(parent) = job.output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| OptimizeError::Export(ExportError::Io(e)))?;
    }
    AssignmentExporter::new(&repository).to_path(report.assignment.strategies(), &job.output)?;
    info!(day = %job.day, threshold = job.threshold, output = %job.output.display(), "assignment written");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::EnumeratorBuilder;
    use greenslot_model::{
        index::StrategyIndex,
        repository::{Strategy, TimeSlot},
    };

    type IntegerType = i64;

    fn write(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_optimize_day_scores_the_chosen_assignment() {
        let repository = Repository::new(
            vec![
                TimeSlot::new("00:00", 120, 100, 11, 10),
                TimeSlot::new("00:30", 180, 200, 4, 5),
            ],
            vec![Strategy::new("fast", 10, 500), Strategy::new("precise", 20, 0)],
        );
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new().build();

        let report = optimize_day(&repository, 10, &mut enumerator).unwrap();
        assert_eq!(
            report.assignment.strategies(),
            &[StrategyIndex::new(0), StrategyIndex::new(0)]
        );
        assert_eq!(report.emissions, 20_000);
        assert_eq!(report.average_error, 0.05);
        assert!(report.candidates >= 1);
        assert!(report.to_string().contains("CO2: 20000"));
    }

    #[test]
    fn test_run_day_writes_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let slots = write(
            dir.path(),
            "slots.csv",
            "time,actual_carbon,forecast_carbon,actual_requests,forecast_requests\n\
             00:00,120,100,11,10.7\n\
             00:30,180,200,4,5\n",
        );
        let strategies = write(
            dir.path(),
            "strategies.csv",
            "strategy,elapsed_time,error\nfast,10,5\nprecise,20,0\n",
        );
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new().build();

        let job = DayJob {
            day: "d1".into(),
            slots,
            strategies,
            threshold: 10,
            output: dir.path().join("10").join("assignment_d1.csv"),
        };
        run_day(&job, &mut enumerator).unwrap();
        let written = std::fs::read_to_string(&job.output).unwrap();
        assert_eq!(
            written,
            "time_slot,strategy,carbon_actual,carbon_forecast,requests_actual,requests_forecast\n\
             00:00,fast,120,100,11,10\n\
             00:30,fast,180,200,4,5\n"
        );

        let strict = DayJob {
            strategies: write(dir.path(), "only_fast.csv", "strategy,elapsed_time,error\nfast,10,5\n"),
            threshold: 0,
            output: dir.path().join("0").join("assignment_d1.csv"),
            ..job
        };
        let err = run_day(&strict, &mut enumerator).unwrap_err();
        assert!(err.is_infeasible());
        assert!(!strict.output.exists());
        assert!(!dir.path().join("0").exists());
    }

    #[test]
    fn test_run_day_reports_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let job = DayJob {
            day: "bad".into(),
            slots: write(dir.path(), "slots.csv", "time,a,b,c,d\n00:00,1,2,3\n"),
            strategies: write(dir.path(), "strategies.csv", "strategy,elapsed_time,error\nfast,10,5\n"),
            threshold: 5,
            output: dir.path().join("out.csv"),
        };
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new().build();
        assert!(matches!(
            run_day(&job, &mut enumerator),
            Err(OptimizeError::MalformedInput(_))
        ));
        assert!(!job.output.exists());
    }
}
