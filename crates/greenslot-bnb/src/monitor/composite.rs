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

//! Fan-out monitor for tree search
//!
//! `CompositeTreeSearchMonitor` forwards every event to its children in
//! insertion order. `search_command` short-circuits on the first
//! non-`Continue` answer, so stricter stop conditions belong first.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use greenslot_model::{assignment::Assignment, model::Model};
use greenslot_search::monitor::search_monitor::SearchCommand;
use num_traits::{PrimInt, Signed};

/// A tree search monitor that forwards events to several monitors.
pub struct CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    monitors: Vec<Box<dyn TreeSearchMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<T> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor<T> + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T> TreeSearchMonitor<T> for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_enter_search(model, statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(
        &mut self,
        state: &SearchState<T>,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        for monitor in self.monitors.iter_mut() {
            let command = monitor.search_command(state, statistics);
            if command != SearchCommand::Continue {
                return command;
            }
        }
        SearchCommand::Continue
    }

    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_step(state, statistics);
        }
    }

    fn on_lower_bound_computed(
        &mut self,
        state: &SearchState<T>,
        lower_bound: T,
        estimated_remaining: T,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_lower_bound_computed(state, lower_bound, estimated_remaining, statistics);
        }
    }

    fn on_prune(
        &mut self,
        state: &SearchState<T>,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_prune(state, reason, statistics);
        }
    }

    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState<T>,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_decisions_enqueued(state, count, statistics);
        }
    }

    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        decision: Decision<T>,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_descend(state, decision, statistics);
        }
    }

    fn on_backtrack(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_backtrack(state, statistics);
        }
    }

    fn on_solution_found(&mut self, assignment: &Assignment<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_solution_found(assignment, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;

    struct StopAfter {
        remaining: usize,
    }

    impl TreeSearchMonitor<i64> for StopAfter {
        fn name(&self) -> &str {
            "StopAfter"
        }
        fn on_enter_search(&mut self, _model: &Model<i64>, _statistics: &BnbSolverStatistics) {}
        fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}
        fn search_command(
            &mut self,
            _state: &SearchState<i64>,
            _statistics: &BnbSolverStatistics,
        ) -> SearchCommand {
            if self.remaining == 0 {
                SearchCommand::Terminate("done".into())
            } else {
                SearchCommand::Continue
            }
        }
        fn on_step(&mut self, _state: &SearchState<i64>, _statistics: &BnbSolverStatistics) {
            self.remaining = self.remaining.saturating_sub(1);
        }
        fn on_lower_bound_computed(
            &mut self,
            _state: &SearchState<i64>,
            _lower_bound: i64,
            _estimated_remaining: i64,
            _statistics: &BnbSolverStatistics,
        ) {
        }
        fn on_prune(
            &mut self,
            _state: &SearchState<i64>,
            _reason: PruneReason,
            _statistics: &BnbSolverStatistics,
        ) {
        }
        fn on_decisions_enqueued(
            &mut self,
            _state: &SearchState<i64>,
            _count: usize,
            _statistics: &BnbSolverStatistics,
        ) {
        }
        fn on_descend(
            &mut self,
            _state: &SearchState<i64>,
            _decision: Decision<i64>,
            _statistics: &BnbSolverStatistics,
        ) {
        }
        fn on_backtrack(&mut self, _state: &SearchState<i64>, _statistics: &BnbSolverStatistics) {}
        fn on_solution_found(
            &mut self,
            _assignment: &Assignment<i64>,
            _statistics: &BnbSolverStatistics,
        ) {
        }
    }

    #[test]
    fn test_first_terminate_wins_and_steps_fan_out() {
        let mut composite = CompositeTreeSearchMonitor::with_capacity(2);
        assert!(composite.is_empty());
        composite.add_monitor(NoOperationMonitor::<i64>::new());
        composite.add_monitor_boxed(Box::new(StopAfter { remaining: 2 }));
        assert_eq!(composite.len(), 2);

        let state = SearchState::<i64>::new(0);
        let stats = BnbSolverStatistics::default();
        assert_eq!(composite.search_command(&state, &stats), SearchCommand::Continue);
        composite.on_step(&state, &stats);
        composite.on_step(&state, &stats);
        assert_eq!(
            composite.search_command(&state, &stats),
            SearchCommand::Terminate("done".into())
        );
    }
}
