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

//! `SolvingBackend` adapter for the branch-and-bound solver.
//!
//! `BnbBackend` owns a `BnbSolver` and a decision builder. Each run wraps the
//! caller's `SearchMonitor` in a `WrapperMonitor`, optionally next to a
//! `LogTreeSearchMonitor`, and converts the outcome into a `BackendOutcome`.

use crate::{
    bnb::BnbSolver,
    branching::decision::DecisionBuilder,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::LogTreeSearchMonitor, wrapper::WrapperMonitor,
    },
};
use greenslot_search::{
    backend::{BackendContext, BackendOutcome, SolvingBackend},
    num::SolverNumeric,
};
use num_traits::{PrimInt, Signed};
use std::time::Duration;

/// Nodes between two clock reads of the progress logger.
const PROGRESS_CLOCK_CHECK_MASK: u64 = 0x0FFF;

/// The exact branch-and-bound backend.
#[derive(Debug, Clone)]
pub struct BnbBackend<T, B>
where
    T: PrimInt + Signed,
{
    solver: BnbSolver<T>,
    builder: B,
    progress_interval: Option<Duration>,
    name: String,
}

impl<T, B> BnbBackend<T, B>
where
    T: PrimInt + Signed,
    B: DecisionBuilder<T>,
{
    /// Creates a backend that branches with `builder` and reports strict
    /// improvements only.
    pub fn new(builder: B) -> Self {
        let name = format!("BnbBackend({})", builder.name());
        Self {
            solver: BnbSolver::new(),
            builder,
            progress_interval: None,
            name,
        }
    }

    /// Sets whether candidates that only equal the incumbent are reported.
    pub fn with_tie_enumeration(mut self, enumerate_ties: bool) -> Self {
        self.solver = self.solver.with_tie_enumeration(enumerate_ties);
        self
    }

    /// Logs search progress through `tracing` at most once per `interval`.
    pub fn with_progress_log(mut self, interval: Duration) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    #[inline]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    #[inline]
    pub fn enumerates_ties(&self) -> bool {
        self.solver.enumerates_ties()
    }
}

impl<T, B> SolvingBackend<T> for BnbBackend<T, B>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self, context: BackendContext<'_, T>) -> BackendOutcome<T> {
        let BackendContext { model, monitor } = context;
        let wrapper = WrapperMonitor::new(monitor);

        let outcome = match self.progress_interval {
            Some(interval) => {
                let mut composite = CompositeTreeSearchMonitor::with_capacity(2);
                composite.add_monitor(wrapper);
                composite.add_monitor(LogTreeSearchMonitor::new(interval, PROGRESS_CLOCK_CHECK_MASK));
                self.solver.solve(model, &mut self.builder, composite)
            }
            None => self.solver.solve(model, &mut self.builder, wrapper),
        };

        outcome.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branching::{chronological::ChronologicalBuilder, greedy::GreedyEmissionsBuilder};
    use greenslot_model::{
        assignment::Assignment,
        model::{Model, ModelBuilder},
        repository::{Repository, Strategy, TimeSlot},
    };
    use greenslot_search::{
        monitor::{
            search_monitor::{SearchCommand, SearchMonitor},
            solution_limit::SolutionLimitMonitor,
        },
        result::{SolveStatus, TerminationReason},
    };

    #[derive(Default)]
    struct Collector {
        objectives: Vec<i64>,
        entered: bool,
        exited: bool,
    }

    impl SearchMonitor<i64> for Collector {
        fn name(&self) -> &str {
            "Collector"
        }
        fn on_enter_search(&mut self, _model: &Model<i64>) {
            self.entered = true;
        }
        fn on_exit_search(&mut self) {
            self.exited = true;
        }
        fn on_solution_found(&mut self, assignment: &Assignment<i64>) {
            self.objectives.push(assignment.objective_value());
        }
        fn on_step(&mut self) {}
        fn search_command(&self) -> SearchCommand {
            SearchCommand::Continue
        }
    }

    fn model() -> Model<i64> {
        let repository = Repository::new(
            vec![
                TimeSlot::new("t0", 100, 100, 10, 10),
                TimeSlot::new("t1", 300, 300, 20, 20),
                TimeSlot::new("t2", 200, 200, 15, 15),
            ],
            vec![
                Strategy::new("precise", 10, 0),
                Strategy::new("fast", 3, 500),
                Strategy::new("balanced", 6, 200),
            ],
        );
        ModelBuilder::new(&repository)
            .error_threshold(3)
            .build()
            .expect("model should build")
    }

    #[test]
    fn test_backend_reports_candidates_through_context_monitor() {
        let model = model();
        let mut collector = Collector::default();
        let mut backend = BnbBackend::<i64, _>::new(GreedyEmissionsBuilder::new())
            .with_progress_log(Duration::from_millis(10));
        assert_eq!(backend.name(), "BnbBackend(GreedyEmissionsBuilder)");

        let outcome = backend.solve(BackendContext::new(&model, &mut collector));
        assert!(collector.entered && collector.exited);
        assert_eq!(outcome.status(), SolveStatus::Optimal);
        assert_eq!(outcome.statistics.solutions_found, collector.objectives.len() as u64);

        let best = outcome
            .result
            .assignment()
            .map(|a| a.objective_value())
            .expect("optimal assignment");
        assert_eq!(collector.objectives.last(), Some(&best));
    }

    #[test]
    fn test_builders_agree_on_the_optimum() {
        let model = model();
        let mut greedy = BnbBackend::<i64, _>::new(GreedyEmissionsBuilder::new());
        let mut chronological = BnbBackend::<i64, _>::new(ChronologicalBuilder::new());

        let mut first = Collector::default();
        let mut second = Collector::default();
        let a = greedy.solve(BackendContext::new(&model, &mut first));
        let b = chronological.solve(BackendContext::new(&model, &mut second));

        let objective = |outcome: &BackendOutcome<i64>| {
            outcome.result.assignment().map(|a| a.objective_value())
        };
        assert_eq!(objective(&a), objective(&b));

        let assignment = a.result.assignment().expect("optimal assignment");
        assert!(model.is_within_capacity(assignment.strategies()));
    }

    #[test]
    fn test_candidate_limit_aborts_with_incumbent() {
        let model = model();
        let mut limit = SolutionLimitMonitor::<i64>::new(1);
        let mut backend = BnbBackend::<i64, _>::new(ChronologicalBuilder::new());
        assert!(!backend.enumerates_ties());
        assert!(
            BnbBackend::<i64, _>::new(ChronologicalBuilder::new())
                .with_tie_enumeration(true)
                .enumerates_ties()
        );

        let outcome = backend.solve(BackendContext::new(&model, &mut limit));
        assert_eq!(outcome.status(), SolveStatus::Feasible);
        assert!(matches!(outcome.reason, TerminationReason::Aborted(_)));
    }
}
