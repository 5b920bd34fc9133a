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

//! # Optimal-Solution Enumerator
//!
//! The enumerator is the only component that talks to a solving backend. For
//! every run it:
//!
//! 1. Builds a `CompositeMonitor` from a `CandidateCollector` and the optional
//!    `TimeLimitMonitor` and `SolutionLimitMonitor`.
//! 2. Hands the model and the monitor to the backend.
//! 3. Accepts only a proven optimum. Anything else becomes an `OptimizeError`
//!    carrying the run's `FailureContext`.
//! 4. Lets the configured `TieBreak` pick the final assignment out of the pool.
//!
//! ## Usage
//!
//! ```rust
//! use greenslot_model::{model::ModelBuilder, repository::{Repository, Strategy, TimeSlot}};
//! use greenslot_solver::{enumerator::EnumeratorBuilder, tie_break::TieBreakKind};
//! use std::time::Duration;
//!
//! let repository = Repository::new(
//!     vec![TimeSlot::new("00:00", 100, 100, 10, 10)],
//!     vec![Strategy::new("fast", 10, 500), Strategy::new("precise", 20, 0)],
//! );
//! let model = ModelBuilder::new(&repository).error_threshold(10).build::<i64>().unwrap();
//!
//! let mut enumerator = EnumeratorBuilder::<i64>::new()
//!     .with_time_budget(Duration::from_secs(5))
//!     .with_tie_break(TieBreakKind::LowestError)
//!     .build();
//! let enumeration = enumerator.enumerate(&model).unwrap();
//! assert_eq!(enumeration.assignment().objective_value(), 10_000);
//! ```

use crate::{
    collector::CandidateCollector,
    error::{FailureContext, OptimizeError, OptimizeResult},
    pool::CandidatePool,
    tie_break::{TieBreak, TieBreakKind},
};
use greenslot_bnb::{backend::BnbBackend, branching::greedy::GreedyEmissionsBuilder};
use greenslot_model::{assignment::Assignment, model::Model};
use greenslot_search::{
    backend::{BackendContext, SolvingBackend},
    monitor::{
        composite::CompositeMonitor,
        solution_limit::SolutionLimitMonitor,
        time_limit::{TIME_LIMIT_REASON, TimeLimitMonitor},
    },
    num::SolverNumeric,
    result::{SolveStatus, SolverResult, TerminationReason},
    stats::SolverStatistics,
};
use std::time::{Duration, Instant};
use tracing::debug;

/// The outcome of a successful enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration<T> {
    assignment: Assignment<T>,
    status: SolveStatus,
    num_candidates: usize,
    num_optimal_candidates: usize,
    selected_position: usize,
    statistics: SolverStatistics,
}

impl<T> Enumeration<T> {
    #[inline]
    pub fn assignment(&self) -> &Assignment<T> {
        &self.assignment
    }

    #[inline]
    pub fn into_assignment(self) -> Assignment<T> {
        self.assignment
    }

    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Number of candidates the backend reported.
    #[inline]
    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    /// Number of reported candidates at the optimal objective.
    #[inline]
    pub fn num_optimal_candidates(&self) -> usize {
        self.num_optimal_candidates
    }

    /// Position of the chosen assignment in discovery order.
    #[inline]
    pub fn selected_position(&self) -> usize {
        self.selected_position
    }

    #[inline]
    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }
}

pub struct Enumerator<'a, T>
where
    T: SolverNumeric,
{
    backend: Box<dyn SolvingBackend<T> + 'a>,
    tie_break: Box<dyn TieBreak<T> + 'a>,
    time_budget: Option<Duration>,
    candidate_limit: Option<u64>,
    pool: CandidatePool<T>,
}

impl<T> std::fmt::Debug for Enumerator<'_, T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumerator")
            .field("backend", &self.backend.name())
            .field("tie_break", &self.tie_break.name())
            .field("time_budget", &self.time_budget)
            .field("candidate_limit", &self.candidate_limit)
            .finish()
    }
}

impl<'a, T> Enumerator<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    #[inline]
    pub fn tie_break_name(&self) -> &str {
        self.tie_break.name()
    }

    #[inline]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    #[inline]
    pub fn candidate_limit(&self) -> Option<u64> {
        self.candidate_limit
    }

    /// The candidates collected by the last run, in discovery order.
    #[inline]
    pub fn pool(&self) -> &CandidatePool<T> {
        &self.pool
    }

    /// Finds an optimal assignment of `model`.
    ///
    /// # Errors
    ///
    /// - `InfeasibleModel` if the backend proved that no assignment exists.
    /// - `Timeout` if the time budget ran out first.
    /// - `NoOptimalSolution` for every other run that ended without proof.
    pub fn enumerate(&mut self, model: &Model<T>) -> OptimizeResult<Enumeration<T>> {
        let start_time = Instant::now();
        debug!(
            backend = self.backend.name(),
            tie_break = self.tie_break.name(),
            slots = model.num_slots(),
            strategies = model.num_strategies(),
            threshold = model.error_threshold(),
            "enumeration started"
        );

        let outcome = {
            let mut monitor = CompositeMonitor::<T>::with_capacity(3);
            monitor.add_monitor(CandidateCollector::new(&mut self.pool));
            if let Some(budget) = self.time_budget {
                monitor.add_monitor(TimeLimitMonitor::new(budget));
            }
            if let Some(limit) = self.candidate_limit {
                monitor.add_monitor(SolutionLimitMonitor::new(limit));
            }
            self.backend.solve(BackendContext::new(model, &mut monitor))
        };

        let elapsed = start_time.elapsed();
        let context = FailureContext::from_model(model, elapsed);
        debug!(
            status = %outcome.status(),
            reason = %outcome.reason,
            candidates = self.pool.len(),
            nodes = outcome.statistics.nodes_explored,
            elapsed_secs = elapsed.as_secs_f64(),
            "enumeration finished"
        );

        match outcome.result {
            SolverResult::Optimal(proven) => {
                // A backend that proves optimality without reporting still
                // yields its assignment.
                if self.pool.is_empty() {
                    self.pool.push(proven);
                }
                self.select(model, outcome.statistics)
            }
            SolverResult::Infeasible => Err(OptimizeError::InfeasibleModel { context }),
            result => match self.time_budget {
                Some(budget) if is_timeout(&outcome.reason, elapsed, budget) => {
                    Err(OptimizeError::Timeout { budget, context })
                }
                _ => Err(OptimizeError::NoOptimalSolution {
                    status: result.status(),
                    reason: outcome.reason.to_string(),
                    context,
                }),
            },
        }
    }

    fn select(
        &self,
        model: &Model<T>,
        statistics: SolverStatistics,
    ) -> OptimizeResult<Enumeration<T>> {
        let num_candidates = self.pool.len();
        let num_optimal_candidates = self.pool.num_optimal();

        let chosen = self
            .tie_break
            .select(model, &self.pool)
            .and_then(|position| self.pool.get(position).map(|a| (position, a.clone())));

        match chosen {
            Some((selected_position, assignment)) => {
                debug!(
                    objective = %assignment.objective_value(),
                    position = selected_position,
                    candidates = num_candidates,
                    optimal_candidates = num_optimal_candidates,
                    "candidate selected"
                );
                Ok(Enumeration {
                    assignment,
                    status: SolveStatus::Optimal,
                    num_candidates,
                    num_optimal_candidates,
                    selected_position,
                    statistics,
                })
            }
            None => Err(OptimizeError::NoOptimalSolution {
                status: SolveStatus::Optimal,
                reason: format!("tie-break `{}` selected no candidate", self.tie_break.name()),
                context: FailureContext::from_model(model, statistics.solve_duration),
            }),
        }
    }
}

/// An abort counts as a timeout when the time limit fired, or when any abort
/// happened after the budget was already spent.
#[inline]
fn is_timeout(reason: &TerminationReason, elapsed: Duration, budget: Duration) -> bool {
    match reason {
        TerminationReason::Aborted(message) => message == TIME_LIMIT_REASON || elapsed >= budget,
        _ => false,
    }
}

/// Builder for an [`Enumerator`].
pub struct EnumeratorBuilder<'a, T>
where
    T: SolverNumeric,
{
    backend: Option<Box<dyn SolvingBackend<T> + 'a>>,
    tie_break: Option<Box<dyn TieBreak<T> + 'a>>,
    time_budget: Option<Duration>,
    candidate_limit: Option<u64>,
}

impl<'a, T> Default for EnumeratorBuilder<'a, T>
where
    T: SolverNumeric + 'a,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> EnumeratorBuilder<'a, T>
where
    T: SolverNumeric + 'a,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            backend: None,
            tie_break: None,
            time_budget: None,
            candidate_limit: None,
        }
    }

    #[inline]
    pub fn with_backend<B>(mut self, backend: B) -> Self
    where
        B: SolvingBackend<T> + 'a,
    {
        self.backend = Some(Box::new(backend));
        self
    }

    #[inline]
    pub fn with_backend_boxed(mut self, backend: Box<dyn SolvingBackend<T> + 'a>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[inline]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Stops the search after `limit` reported candidates. A run cut short
    /// this way never counts as optimal.
    #[inline]
    pub fn with_candidate_limit(mut self, limit: u64) -> Self {
        self.candidate_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_tie_break(mut self, kind: TieBreakKind) -> Self {
        self.tie_break = Some(kind.build());
        self
    }

    #[inline]
    pub fn with_tie_break_policy<P>(mut self, policy: P) -> Self
    where
        P: TieBreak<T> + 'a,
    {
        self.tie_break = Some(Box::new(policy));
        self
    }

    pub fn build(self) -> Enumerator<'a, T> {
        let backend = self
            .backend
            .unwrap_or_else(|| Box::new(BnbBackend::<T, _>::new(GreedyEmissionsBuilder::<T>::new())));
        let tie_break = self
            .tie_break
            .unwrap_or_else(|| TieBreakKind::default().build());

        Enumerator {
            backend,
            tie_break,
            time_budget: self.time_budget,
            candidate_limit: self.candidate_limit,
            pool: CandidatePool::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        scripted::{ScriptedBackend, ScriptedFinish},
        tie_break::FirstOptimal,
    };
    use greenslot_bnb::branching::chronological::ChronologicalBuilder;
    use greenslot_model::{
        index::StrategyIndex,
        model::ModelBuilder,
        repository::{Repository, Strategy, TimeSlot},
    };

    type IntegerType = i64;

    fn repository() -> Repository {
        Repository::new(
            vec![
                TimeSlot::new("00:00", 100, 100, 10, 10),
                TimeSlot::new("00:30", 200, 200, 5, 5),
            ],
            vec![Strategy::new("fast", 10, 500), Strategy::new("precise", 20, 0)],
        )
    }

    fn model(threshold: u32) -> Model<IntegerType> {
        ModelBuilder::new(&repository())
            .error_threshold(threshold)
            .build()
            .expect("model should build")
    }

    /// A day in which every assignment is optimal: 48 identical slots and two
    /// strategies with the same cost and no error.
    fn interchangeable_model() -> Model<IntegerType> {
        let repository = Repository::new(
            (0..48)
                .map(|t| TimeSlot::new(format!("t{t}"), 100, 100, 10, 10))
                .collect(),
            vec![Strategy::new("a", 10, 0), Strategy::new("b", 10, 0)],
        );
        ModelBuilder::new(&repository)
            .error_threshold(9)
            .build()
            .expect("model should build")
    }

    fn candidate(model: &Model<IntegerType>, strategies: &[usize]) -> Assignment<IntegerType> {
        let strategies: Vec<StrategyIndex> =
            strategies.iter().copied().map(StrategyIndex::new).collect();
        Assignment::new(model.objective_for(&strategies), strategies)
    }

    #[test]
    fn test_default_enumerator_finds_the_optimum() {
        let model = model(10);
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new().build();
        assert_eq!(enumerator.backend_name(), "BnbBackend(GreedyEmissionsBuilder)");
        assert_eq!(enumerator.tie_break_name(), "last-discovered");

        let enumeration = enumerator.enumerate(&model).expect("optimal");
        assert_eq!(enumeration.status(), SolveStatus::Optimal);
        assert_eq!(enumeration.assignment().objective_value(), 20_000);
        assert_eq!(
            enumeration.assignment().strategies(),
            &[StrategyIndex::new(0), StrategyIndex::new(0)]
        );
        assert_eq!(enumeration.num_candidates(), enumerator.pool().len());
        assert_eq!(enumeration.selected_position(), enumeration.num_candidates() - 1);
    }

    #[test]
    fn test_zero_threshold_is_infeasible_only_without_zero_error_strategy() {
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new().build();
        let enumeration = enumerator.enumerate(&model(0)).expect("precise is feasible");
        assert_eq!(enumeration.assignment().objective_value(), 40_000);

        let repository = Repository::new(
            vec![TimeSlot::new("00:00", 100, 100, 10, 10)],
            vec![Strategy::new("fast", 10, 500)],
        );
        let model = ModelBuilder::new(&repository).build().expect("model should build");
        match enumerator.enumerate(&model) {
            Err(OptimizeError::InfeasibleModel { context }) => {
                assert_eq!(context.num_slots, 1);
                assert_eq!(context.num_strategies, 1);
                assert_eq!(context.error_threshold, 0);
            }
            other => panic!("expected InfeasibleModel, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_break_decides_between_scripted_ties() {
        let model = model(10);
        let script = vec![
            candidate(&model, &[1, 1]),
            candidate(&model, &[0, 1]),
            candidate(&model, &[0, 1]),
        ];

        let mut last = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(ScriptedBackend::new(script.clone()))
            .build();
        assert_eq!(last.enumerate(&model).expect("optimal").selected_position(), 2);

        let mut first = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(ScriptedBackend::new(script))
            .with_tie_break_policy(FirstOptimal)
            .build();
        let enumeration = first.enumerate(&model).expect("optimal");
        assert_eq!(enumeration.selected_position(), 1);
        assert_eq!(enumeration.num_candidates(), 3);
        assert_eq!(enumeration.num_optimal_candidates(), 2);
    }

    #[test]
    fn test_last_discovered_keeps_a_worse_last_candidate() {
        let model = model(10);
        let script = vec![candidate(&model, &[0, 0]), candidate(&model, &[1, 1])];

        let mut last = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(ScriptedBackend::new(script.clone()))
            .build();
        assert_eq!(
            last.enumerate(&model).expect("optimal").assignment().objective_value(),
            40_000
        );

        let mut explicit = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(ScriptedBackend::new(script))
            .with_tie_break(TieBreakKind::LowestError)
            .build();
        assert_eq!(
            explicit.enumerate(&model).expect("optimal").assignment().objective_value(),
            20_000
        );
    }

    #[test]
    fn test_non_optimal_outcomes_are_errors() {
        let model = model(10);
        let mut unknown = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(
                ScriptedBackend::new(vec![candidate(&model, &[1, 1])])
                    .finish_with(ScriptedFinish::Unknown),
            )
            .build();
        match unknown.enumerate(&model) {
            Err(OptimizeError::NoOptimalSolution { status, .. }) => {
                assert_eq!(status, SolveStatus::Unknown)
            }
            other => panic!("expected NoOptimalSolution, got {:?}", other),
        }

        let mut limited = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(BnbBackend::<IntegerType, _>::new(ChronologicalBuilder::new()))
            .with_candidate_limit(1)
            .build();
        match limited.enumerate(&model) {
            Err(OptimizeError::NoOptimalSolution { status, reason, .. }) => {
                assert_eq!(status, SolveStatus::Feasible);
                assert_eq!(reason, "Aborted: candidate limit reached");
            }
            other => panic!("expected NoOptimalSolution, got {:?}", other),
        }
    }

    #[test]
    fn test_time_budget_reports_timeout() {
        let model = model(10);
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(ScriptedBackend::new(vec![]).finish_with(ScriptedFinish::UntilTerminated))
            .with_time_budget(Duration::from_millis(5))
            .build();

        match enumerator.enumerate(&model) {
            Err(OptimizeError::Timeout { budget, context }) => {
                assert_eq!(budget, Duration::from_millis(5));
                assert!(context.elapsed >= budget);
                assert_eq!(context.error_threshold, 10);
            }
            other => panic!("expected Timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_interchangeable_strategies_are_solved_within_budget() {
        let model = interchangeable_model();
        for kind in TieBreakKind::ALL {
            let mut enumerator = EnumeratorBuilder::<IntegerType>::new()
                .with_time_budget(Duration::from_secs(3))
                .with_tie_break(kind)
                .build();

            let enumeration = enumerator.enumerate(&model).expect("optimal");
            assert_eq!(enumeration.status(), SolveStatus::Optimal);
            assert_eq!(enumeration.num_candidates(), 1);
            assert_eq!(enumeration.assignment().num_slots(), 48);
            assert_eq!(enumeration.assignment().objective_value(), 48 * 100 * 10 * 10);
            assert!(enumeration.statistics().solve_duration < Duration::from_secs(3));
        }
    }

    #[test]
    fn test_tie_enumeration_past_the_budget_is_a_timeout() {
        let model = interchangeable_model();
        let budget = Duration::from_millis(50);
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(
                BnbBackend::<IntegerType, _>::new(GreedyEmissionsBuilder::<IntegerType>::new())
                    .with_tie_enumeration(true),
            )
            .with_time_budget(budget)
            .build();

        match enumerator.enumerate(&model) {
            Err(OptimizeError::Timeout { budget: reported, context }) => {
                assert_eq!(reported, budget);
                assert_eq!(context.num_slots, 48);
                assert!(context.elapsed >= budget);
            }
            other => panic!("expected Timeout, got {:?}", other.map(|e| e.num_candidates())),
        }
        assert!(enumerator.pool().len() > 1);
    }

    #[test]
    fn test_tie_enumeration_past_the_candidate_limit_is_not_optimal() {
        let model = interchangeable_model();
        let mut enumerator = EnumeratorBuilder::<IntegerType>::new()
            .with_backend(
                BnbBackend::<IntegerType, _>::new(ChronologicalBuilder::new()).with_tie_enumeration(true),
            )
            .with_candidate_limit(100)
            .build();

        match enumerator.enumerate(&model) {
            Err(OptimizeError::NoOptimalSolution { status, reason, .. }) => {
                assert_eq!(status, SolveStatus::Feasible);
                assert_eq!(reason, "Aborted: candidate limit reached");
            }
            other => panic!("expected NoOptimalSolution, got {:?}", other.map(|e| e.num_candidates())),
        }
        assert_eq!(enumerator.pool().len(), 100);
    }
}
