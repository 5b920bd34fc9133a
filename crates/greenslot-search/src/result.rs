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

use greenslot_model::assignment::Assignment;
use num_traits::{PrimInt, Signed};

/// The result of a single backend run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult<T> {
    /// We have proven that no assignment satisfies the quality constraint.
    Infeasible,
    /// We have found an assignment and proven its optimality.
    Optimal(Assignment<T>),
    /// We have found an assignment, but not proven its optimality.
    Feasible(Assignment<T>),
    /// The backend terminated without finding an assignment and
    /// without proving infeasibility.
    Unknown,
}

impl<T> SolverResult<T> {
    /// Returns the status code of this result.
    #[inline]
    pub fn status(&self) -> SolveStatus {
        match self {
            SolverResult::Infeasible => SolveStatus::Infeasible,
            SolverResult::Optimal(_) => SolveStatus::Optimal,
            SolverResult::Feasible(_) => SolveStatus::Feasible,
            SolverResult::Unknown => SolveStatus::Unknown,
        }
    }

    /// Returns the assignment carried by this result, if any.
    #[inline]
    pub fn assignment(&self) -> Option<&Assignment<T>> {
        match self {
            SolverResult::Optimal(a) | SolverResult::Feasible(a) => Some(a),
            SolverResult::Infeasible | SolverResult::Unknown => None,
        }
    }
}

impl<T> std::fmt::Display for SolverResult<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(assignment) => {
                write!(f, "Optimal(objective={})", assignment.objective_value())
            }
            SolverResult::Feasible(assignment) => {
                write!(f, "Feasible(objective={})", assignment.objective_value())
            }
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The terminal status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    /// Returns `true` only for a proven optimum.
    #[inline]
    pub fn is_optimal(self) -> bool {
        self == SolveStatus::Optimal
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The backend found and proved optimality of an assignment.
    OptimalityProven,
    /// The backend proved that the problem is infeasible.
    InfeasibilityProven,
    /// The backend aborted due to a search limit (time, candidates, etc.).
    /// The string names the limit that fired.
    Aborted(String),
}

impl TerminationReason {
    /// Returns `true` if the search was cut short.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, TerminationReason::Aborted(_))
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}
