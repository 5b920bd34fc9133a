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

use crate::pool::CandidatePool;
use greenslot_model::{assignment::Assignment, model::Model};
use greenslot_search::monitor::search_monitor::{SearchCommand, SearchMonitor};
use num_traits::{PrimInt, Signed};
use tracing::trace;

/// A `SearchMonitor` that appends every reported candidate to a pool.
///
/// The pool is cleared when a search starts, so one collector can observe
/// several runs. It never asks the backend to stop.
#[derive(Debug)]
pub struct CandidateCollector<'p, T> {
    pool: &'p mut CandidatePool<T>,
}

impl<'p, T> CandidateCollector<'p, T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(pool: &'p mut CandidatePool<T>) -> Self {
        Self { pool }
    }

    #[inline]
    pub fn pool(&self) -> &CandidatePool<T> {
        self.pool
    }
}

impl<T> SearchMonitor<T> for CandidateCollector<'_, T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn name(&self) -> &str {
        "CandidateCollector"
    }

    fn on_enter_search(&mut self, _model: &Model<T>) {
        self.pool.clear();
    }

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, assignment: &Assignment<T>) {
        trace!(
            objective = %assignment.objective_value(),
            position = self.pool.len(),
            "candidate collected"
        );
        self.pool.push(assignment.clone());
    }

    fn on_step(&mut self) {}

    fn search_command(&self) -> SearchCommand {
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::{index::StrategyIndex, model::ModelBuilder, repository::Repository};

    #[test]
    fn test_collects_in_order_and_clears_on_enter() {
        let model = ModelBuilder::new(&Repository::default())
            .build::<i64>()
            .expect("empty model should build");
        let mut pool = CandidatePool::new();
        pool.push(Assignment::new(99, vec![]));

        {
            let mut collector = CandidateCollector::new(&mut pool);
            collector.on_enter_search(&model);
            assert!(collector.pool().is_empty());

            collector.on_solution_found(&Assignment::new(7, vec![StrategyIndex::new(1)]));
            collector.on_solution_found(&Assignment::new(5, vec![StrategyIndex::new(0)]));
            assert_eq!(collector.search_command(), SearchCommand::Continue);
        }

        let objectives: Vec<i64> = pool.iter().map(|a| a.objective_value()).collect();
        assert_eq!(objectives, vec![7, 5]);
    }
}
