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

use crate::stats::BnbSolverStatistics;
use greenslot_model::assignment::Assignment;
use greenslot_search::{
    backend::BackendOutcome,
    result::{SolveStatus, SolverResult, TerminationReason},
};
use num_traits::{PrimInt, Signed};

/// Result of the branch-and-bound solver after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<T> {
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
}

impl<T> BnbSolverOutcome<T> {
    #[inline]
    pub fn optimal(assignment: Assignment<T>, statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Optimal(assignment),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    /// The search was stopped early. Without an incumbent nothing is known
    /// about feasibility, so the result is `Unknown` rather than `Infeasible`.
    #[inline]
    pub fn aborted<R>(
        incumbent: Option<Assignment<T>>,
        reason: R,
        statistics: BnbSolverStatistics,
    ) -> Self
    where
        R: Into<String>,
    {
        let result = match incumbent {
            Some(assignment) => SolverResult::Feasible(assignment),
            None => SolverResult::Unknown,
        };
        Self {
            result,
            termination_reason: TerminationReason::Aborted(reason.into()),
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.result.status()
    }
}

impl<T> From<BnbSolverOutcome<T>> for BackendOutcome<T>
where
    T: PrimInt + Signed,
{
    fn from(outcome: BnbSolverOutcome<T>) -> Self {
        BackendOutcome::new(
            outcome.result,
            outcome.termination_reason,
            outcome.statistics.into(),
        )
    }
}

impl<T> std::fmt::Display for BnbSolverOutcome<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.termination_reason)?;
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::index::StrategyIndex;

    #[test]
    fn test_aborted_without_incumbent_is_unknown() {
        let outcome = BnbSolverOutcome::<i64>::aborted(None, "time limit reached", BnbSolverStatistics::default());
        assert_eq!(outcome.status(), SolveStatus::Unknown);
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::Aborted("time limit reached".into())
        );
    }

    #[test]
    fn test_aborted_with_incumbent_is_feasible() {
        let assignment = Assignment::new(5i64, vec![StrategyIndex::new(0)]);
        let outcome = BnbSolverOutcome::aborted(Some(assignment.clone()), "stop", BnbSolverStatistics::default());
        assert_eq!(outcome.status(), SolveStatus::Feasible);
        assert_eq!(outcome.result().assignment(), Some(&assignment));
    }

    #[test]
    fn test_conversion_into_backend_outcome() {
        let mut stats = BnbSolverStatistics::default();
        stats.on_node_explored();
        stats.on_solution_found();
        let assignment = Assignment::new(3i64, vec![StrategyIndex::new(1)]);

        let backend: BackendOutcome<i64> = BnbSolverOutcome::optimal(assignment, stats).into();
        assert!(backend.is_optimal());
        assert_eq!(backend.reason, TerminationReason::OptimalityProven);
        assert_eq!(backend.statistics.nodes_explored, 1);
        assert_eq!(backend.statistics.solutions_found, 1);

        let infeasible: BackendOutcome<i64> =
            BnbSolverOutcome::infeasible(BnbSolverStatistics::default()).into();
        assert!(infeasible.is_infeasible());
    }
}
