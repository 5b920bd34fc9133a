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

//! Error taxonomy of an optimization run.
//!
//! Input and build failures are wrapped as they are. Every failure of the
//! solve itself carries a [`FailureContext`], which is what tells "no
//! feasible assignment exists" apart from "the search did not finish".

use greenslot_model::{
    export::ExportError, loading::MalformedInputError, model::Model, model::ModelBuildError,
};
use greenslot_search::result::SolveStatus;
use num_traits::{PrimInt, Signed};
use std::time::Duration;
use thiserror::Error;

/// Size, threshold and wall-clock time of a failed solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureContext {
    pub num_slots: usize,
    pub num_strategies: usize,
    pub error_threshold: u32,
    pub elapsed: Duration,
}

impl FailureContext {
    #[inline]
    pub fn new(
        num_slots: usize,
        num_strategies: usize,
        error_threshold: u32,
        elapsed: Duration,
    ) -> Self {
        Self {
            num_slots,
            num_strategies,
            error_threshold,
            elapsed,
        }
    }

    /// Captures the dimensions of `model` together with `elapsed`.
    #[inline]
    pub fn from_model<T>(model: &Model<T>, elapsed: Duration) -> Self
    where
        T: PrimInt + Signed,
    {
        Self::new(
            model.num_slots(),
            model.num_strategies(),
            model.error_threshold(),
            elapsed,
        )
    }
}

impl std::fmt::Display for FailureContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} slots, {} strategies, threshold {}%, after {:.3}s",
            self.num_slots,
            self.num_strategies,
            self.error_threshold,
            self.elapsed.as_secs_f64()
        )
    }
}

/// The error type for optimizing one day.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInputError),

    #[error("model construction failed: {0}")]
    ModelBuild(#[from] ModelBuildError),

    /// The search was exhausted without finding any assignment.
    #[error("no assignment satisfies the error threshold ({context})")]
    InfeasibleModel { context: FailureContext },

    /// The backend stopped without proving optimality, for a reason other
    /// than the time budget.
    #[error("no optimal assignment was certified: backend reported {status} ({reason}; {context})")]
    NoOptimalSolution {
        status: SolveStatus,
        reason: String,
        context: FailureContext,
    },

    #[error("time budget of {:.3}s exhausted before optimality was proven ({context})", .budget.as_secs_f64())]
    Timeout {
        budget: Duration,
        context: FailureContext,
    },

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl OptimizeError {
    /// Returns the solve context, if the failure happened during the solve.
    pub fn context(&self) -> Option<&FailureContext> {
        match self {
            OptimizeError::InfeasibleModel { context }
            | OptimizeError::NoOptimalSolution { context, .. }
            | OptimizeError::Timeout { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Returns `true` if the search proved that no assignment exists.
    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, OptimizeError::InfeasibleModel { .. })
    }

    /// Returns `true` if the search ran out of time.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, OptimizeError::Timeout { .. })
    }
}

pub type OptimizeResult<T> = Result<T, OptimizeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::loading::Table;

    fn context() -> FailureContext {
        FailureContext::new(48, 4, 5, Duration::from_millis(1500))
    }

    #[test]
    fn test_solve_failures_carry_context() {
        let infeasible = OptimizeError::InfeasibleModel { context: context() };
        assert!(infeasible.is_infeasible());
        assert_eq!(infeasible.context(), Some(&context()));
        assert_eq!(
            infeasible.to_string(),
            "no assignment satisfies the error threshold (48 slots, 4 strategies, threshold 5%, after 1.500s)"
        );

        let timeout = OptimizeError::Timeout {
            budget: Duration::from_secs(1),
            context: context(),
        };
        assert!(timeout.is_timeout());
        assert!(timeout.to_string().starts_with("time budget of 1.000s exhausted"));

        let unknown = OptimizeError::NoOptimalSolution {
            status: SolveStatus::Unknown,
            reason: "candidate limit reached".into(),
            context: context(),
        };
        assert!(!unknown.is_infeasible() && !unknown.is_timeout());
        assert!(unknown.to_string().contains("backend reported UNKNOWN"));
    }

    #[test]
    fn test_input_failures_have_no_context() {
        let err: OptimizeError = MalformedInputError::WrongArity {
            table: Table::TimeSlots,
            line: 3,
            expected: 5,
            found: 4,
        }
        .into();
        assert!(matches!(err, OptimizeError::MalformedInput(_)));
        assert_eq!(err.context(), None);
    }
}
