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

//! # Solving Backends
//!
//! A backend turns a `Model` into a `BackendOutcome`. While it searches it
//! reports every improving-or-equal assignment to the monitor it was handed,
//! so the caller can collect candidates without knowing how they were found.
//!
//! The contract a backend must honor:
//!
//! - Call `on_enter_search` once before the first step and `on_exit_search`
//!   once after the last one.
//! - Report candidates through `on_solution_found` in a stable order. Objective
//!   values of reported candidates never increase.
//! - Poll `search_command` regularly and stop with
//!   `TerminationReason::Aborted` when asked to.
//! - Return `SolverResult::Optimal` only when optimality was proven.

use crate::{
    monitor::search_monitor::SearchMonitor,
    result::{SolveStatus, SolverResult, TerminationReason},
    stats::SolverStatistics,
};
use greenslot_model::{assignment::Assignment, model::Model};
use num_traits::{PrimInt, Signed};

/// Everything a backend needs for one run.
pub struct BackendContext<'a, T>
where
    T: PrimInt + Signed,
{
    /// The model to optimize.
    pub model: &'a Model<T>,
    /// The monitor receiving lifecycle events and candidates.
    pub monitor: &'a mut dyn SearchMonitor<T>,
}

impl<'a, T> BackendContext<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(model: &'a Model<T>, monitor: &'a mut dyn SearchMonitor<T>) -> Self {
        Self { model, monitor }
    }
}

impl<T> std::fmt::Debug for BackendContext<'_, T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendContext")
            .field("num_slots", &self.model.num_slots())
            .field("num_strategies", &self.model.num_strategies())
            .field("monitor", &self.monitor.name())
            .finish()
    }
}

/// The outcome of a backend run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutcome<T> {
    pub result: SolverResult<T>,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}

impl<T> BackendOutcome<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(
        result: SolverResult<T>,
        reason: TerminationReason,
        statistics: SolverStatistics,
    ) -> Self {
        Self {
            result,
            reason,
            statistics,
        }
    }

    /// The search was exhausted and `assignment` is optimal.
    #[inline]
    pub fn optimal(assignment: Assignment<T>, statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Optimal(assignment),
            TerminationReason::OptimalityProven,
            statistics,
        )
    }

    /// The search was exhausted without finding any assignment.
    #[inline]
    pub fn infeasible(statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Infeasible,
            TerminationReason::InfeasibilityProven,
            statistics,
        )
    }

    /// The search was cut short, possibly after finding an incumbent.
    #[inline]
    pub fn aborted<R>(
        incumbent: Option<Assignment<T>>,
        reason: R,
        statistics: SolverStatistics,
    ) -> Self
    where
        R: Into<String>,
    {
        let result = match incumbent {
            Some(assignment) => SolverResult::Feasible(assignment),
            None => SolverResult::Unknown,
        };
        Self::new(result, TerminationReason::Aborted(reason.into()), statistics)
    }

    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.result.status()
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }

    #[inline]
    pub fn has_assignment(&self) -> bool {
        self.result.assignment().is_some()
    }
}

impl<T> std::fmt::Display for BackendOutcome<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.reason)?;
        write!(f, "{}", self.statistics)
    }
}

/// A search engine able to optimize a `Model`.
pub trait SolvingBackend<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str;
    fn solve(&mut self, context: BackendContext<'_, T>) -> BackendOutcome<T>;
}

impl<T> std::fmt::Debug for dyn SolvingBackend<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SolvingBackend({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::search_monitor::SilentMonitor;
    use greenslot_model::{
        index::StrategyIndex,
        model::ModelBuilder,
        repository::{Repository, Strategy, TimeSlot},
    };

    type IntegerType = i64;

    /// Reports strategy 0 everywhere and claims optimality.
    struct FirstStrategyBackend;

    impl SolvingBackend<IntegerType> for FirstStrategyBackend {
        fn name(&self) -> &str {
            "FirstStrategyBackend"
        }

        fn solve(&mut self, context: BackendContext<'_, IntegerType>) -> BackendOutcome<IntegerType> {
            context.monitor.on_enter_search(context.model);
            let strategies = vec![StrategyIndex::new(0); context.model.num_slots()];
            let objective = context.model.objective_for(&strategies);
            let assignment = Assignment::new(objective, strategies);
            context.monitor.on_solution_found(&assignment);
            context.monitor.on_exit_search();
            BackendOutcome::optimal(assignment, SolverStatistics::default())
        }
    }

    #[test]
    fn test_backend_through_trait_object() {
        let repo = Repository::new(
            vec![TimeSlot::new("t0", 1, 2, 3, 4)],
            vec![Strategy::new("nop", 5, 0)],
        );
        let model = ModelBuilder::new(&repo).build::<IntegerType>().unwrap();
        let mut monitor = SilentMonitor;
        let mut backend: Box<dyn SolvingBackend<IntegerType>> = Box::new(FirstStrategyBackend);

        let outcome = backend.solve(BackendContext::new(&model, &mut monitor));
        assert!(outcome.is_optimal());
        assert_eq!(outcome.status(), SolveStatus::Optimal);
        assert_eq!(
            outcome.result.assignment().map(|a| a.objective_value()),
            Some(40)
        );
        assert_eq!(format!("{:?}", backend), "SolvingBackend(FirstStrategyBackend)");
    }

    #[test]
    fn test_aborted_maps_incumbent_to_feasible() {
        let with = BackendOutcome::aborted(
            Some(Assignment::new(3i64, vec![])),
            "time limit reached",
            SolverStatistics::default(),
        );
        assert_eq!(with.status(), SolveStatus::Feasible);
        assert!(with.has_assignment());
        assert_eq!(
            with.reason,
            TerminationReason::Aborted("time limit reached".to_string())
        );

        let without = BackendOutcome::<IntegerType>::aborted(None, "stop", SolverStatistics::default());
        assert_eq!(without.status(), SolveStatus::Unknown);
        assert!(!without.has_assignment());
    }

    #[test]
    fn test_infeasible_outcome() {
        let outcome = BackendOutcome::<IntegerType>::infeasible(SolverStatistics::default());
        assert!(outcome.is_infeasible());
        assert_eq!(outcome.reason, TerminationReason::InfeasibilityProven);
        let rendered = outcome.to_string();
        assert!(rendered.starts_with("Result: Infeasible\nTermination: Infeasibility Proven\n"));
    }
}
