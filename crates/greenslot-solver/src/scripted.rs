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

//! A backend that replays a fixed sequence of candidates.
//!
//! `ScriptedBackend` reports its script through the monitor exactly like a
//! real search would and then finishes with a configured status. It lets the
//! enumerator and the tie-break policies be exercised against orderings a
//! real backend would never produce, such as a worse candidate reported last.

use greenslot_model::assignment::Assignment;
use greenslot_search::{
    backend::{BackendContext, BackendOutcome, SolvingBackend},
    monitor::search_monitor::SearchCommand,
    result::{SolverResult, TerminationReason},
    stats::SolverStatisticsBuilder,
};
use num_traits::{PrimInt, Signed};
use std::time::Instant;

/// How a scripted run ends after the script is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptedFinish {
    /// Claim optimality of the best scripted candidate, or infeasibility if
    /// the script is empty.
    #[default]
    Optimal,
    /// Claim infeasibility.
    Infeasible,
    /// Stop without a proof.
    Unknown,
    /// Keep stepping until a monitor asks to terminate.
    UntilTerminated,
}

#[derive(Debug, Clone)]
pub struct ScriptedBackend<T> {
    script: Vec<Assignment<T>>,
    finish: ScriptedFinish,
}

impl<T> ScriptedBackend<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(script: Vec<Assignment<T>>) -> Self {
        Self {
            script,
            finish: ScriptedFinish::Optimal,
        }
    }

    #[inline]
    pub fn finish_with(mut self, finish: ScriptedFinish) -> Self {
        self.finish = finish;
        self
    }

    #[inline]
    pub fn script(&self) -> &[Assignment<T>] {
        &self.script
    }

    fn best(&self, reported: usize) -> Option<Assignment<T>> {
        self.script[..reported]
            .iter()
            .min_by_key(|a| a.objective_value())
            .cloned()
    }
}

impl<T> SolvingBackend<T> for ScriptedBackend<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "ScriptedBackend"
    }

    fn solve(&mut self, context: BackendContext<'_, T>) -> BackendOutcome<T> {
        let BackendContext { model, monitor } = context;
        let start_time = Instant::now();
        let mut steps: u64 = 0;
        let mut reported = 0usize;

        monitor.on_enter_search(model);

        let mut abort: Option<String> = None;
        for candidate in &self.script {
            monitor.on_step();
            steps += 1;
            if let SearchCommand::Terminate(reason) = monitor.search_command() {
                abort = Some(reason);
                break;
            }
            monitor.on_solution_found(candidate);
            reported += 1;
        }

        if abort.is_none() && self.finish == ScriptedFinish::UntilTerminated {
            abort = loop {
                monitor.on_step();
                steps += 1;
                if let SearchCommand::Terminate(reason) = monitor.search_command() {
                    break Some(reason);
                }
                std::hint::spin_loop();
            };
        }

        monitor.on_exit_search();

        let statistics = SolverStatisticsBuilder::new()
            .solutions_found(reported as u64)
            .nodes_explored(steps)
            .solve_duration(start_time.elapsed())
            .build();

        let best = self.best(reported);
        match (abort, self.finish) {
            (Some(reason), _) => BackendOutcome::aborted(best, reason, statistics),
            (None, ScriptedFinish::Optimal) => match best {
                Some(assignment) => BackendOutcome::optimal(assignment, statistics),
                None => BackendOutcome::infeasible(statistics),
            },
            (None, ScriptedFinish::Infeasible) => BackendOutcome::infeasible(statistics),
            (None, _) => BackendOutcome::new(
                SolverResult::Unknown,
                TerminationReason::Aborted("script exhausted".to_string()),
                statistics,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::{index::StrategyIndex, model::ModelBuilder, repository::Repository};
    use greenslot_search::{
        monitor::{
            search_monitor::SilentMonitor,
            solution_limit::{SOLUTION_LIMIT_REASON, SolutionLimitMonitor},
        },
        result::SolveStatus,
    };

    type IntegerType = i64;

    fn script() -> Vec<Assignment<IntegerType>> {
        vec![
            Assignment::new(9, vec![]),
            Assignment::new(4, vec![]),
            Assignment::new(6, vec![]),
        ]
    }

    fn empty_model() -> greenslot_model::model::Model<IntegerType> {
        ModelBuilder::new(&Repository::default())
            .build()
            .expect("empty model should build")
    }

    #[test]
    fn test_optimal_finish_claims_best_candidate() {
        let model = empty_model();
        let mut backend = ScriptedBackend::new(script());
        let outcome = backend.solve(BackendContext::new(&model, &mut SilentMonitor));

        assert_eq!(outcome.status(), SolveStatus::Optimal);
        assert_eq!(
            outcome.result.assignment().map(|a| a.objective_value()),
            Some(4)
        );
        assert_eq!(outcome.statistics.solutions_found, 3);
    }

    #[test]
    fn test_empty_script_is_infeasible() {
        let model = empty_model();
        let mut backend = ScriptedBackend::<IntegerType>::new(vec![]);
        let outcome = backend.solve(BackendContext::new(&model, &mut SilentMonitor));
        assert_eq!(outcome.status(), SolveStatus::Infeasible);
    }

    #[test]
    fn test_monitor_can_cut_the_script_short() {
        let model = empty_model();
        let mut limit = SolutionLimitMonitor::<IntegerType>::new(1);
        let mut backend = ScriptedBackend::new(script());
        let outcome = backend.solve(BackendContext::new(&model, &mut limit));

        assert_eq!(outcome.status(), SolveStatus::Feasible);
        assert_eq!(
            outcome.reason,
            TerminationReason::Aborted(SOLUTION_LIMIT_REASON.to_string())
        );
        assert_eq!(outcome.statistics.solutions_found, 1);
    }

    #[test]
    fn test_unknown_finish() {
        let model = empty_model();
        let mut backend = ScriptedBackend::new(vec![Assignment::new(1, vec![StrategyIndex::new(0)])])
            .finish_with(ScriptedFinish::Unknown);
        let outcome = backend.solve(BackendContext::new(&model, &mut SilentMonitor));
        assert_eq!(outcome.status(), SolveStatus::Unknown);
        assert!(outcome.reason.is_aborted());
    }
}
