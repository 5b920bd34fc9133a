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

//! Progress logging for branch-and-bound
//!
//! `LogTreeSearchMonitor` emits a `tracing` event when the search starts, a
//! progress event at most once per `log_interval`, one event per accepted
//! candidate and a summary when the search ends. The clock is only read when
//! `nodes_explored & clock_check_mask == 0`, which keeps the hot loop free of
//! system calls.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use greenslot_model::{assignment::Assignment, model::Model};
use num_traits::{PrimInt, Signed};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_objective: Option<T>,
}

impl<T> LogTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            log_interval,
            clock_check_mask,
            best_objective: None,
        }
    }

    /// Returns the objective of the last accepted candidate.
    #[inline]
    pub fn best_objective(&self) -> Option<T> {
        self.best_objective
    }

    #[inline]
    pub fn log_interval(&self) -> Duration {
        self.log_interval
    }

    fn log_progress(&mut self, state: &SearchState<T>, stats: &BnbSolverStatistics) {
        let now = Instant::now();
        debug!(
            elapsed_secs = now.duration_since(self.start_time).as_secs_f64(),
            nodes = stats.nodes_explored,
            depth = state.num_assigned_slots(),
            best = %DisplayBest(self.best_objective),
            current = %state.current_objective(),
            backtracks = stats.backtracks,
            pruned = stats.prunings_total(),
            "branch-and-bound progress"
        );
        self.last_log_time = now;
    }
}

/// Renders `None` as `inf` in log fields.
struct DisplayBest<T>(Option<T>);

impl<T> std::fmt::Display for DisplayBest<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "inf"),
        }
    }
}

impl<T> Default for LogTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl<T> std::fmt::Display for LogTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(log_interval: {}ms, clock_check_mask: {})",
            self.log_interval.as_millis(),
            self.clock_check_mask
        )
    }
}

impl<T> TreeSearchMonitor<T> for LogTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model<T>, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_objective = None;
        debug!(
            slots = model.num_slots(),
            strategies = model.num_strategies(),
            error_capacity = %model.error_capacity(),
            search_space = %model.complexity(),
            "branch-and-bound search started"
        );
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        debug!(
            nodes = statistics.nodes_explored,
            backtracks = statistics.backtracks,
            pruned_bound = statistics.prunings_bound,
            pruned_infeasible = statistics.prunings_infeasible,
            candidates = statistics.solutions_found,
            max_depth = statistics.max_depth,
            best = %DisplayBest(self.best_objective),
            "branch-and-bound search finished"
        );
    }

    fn on_step(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {}

    fn on_lower_bound_computed(
        &mut self,
        _state: &SearchState<T>,
        _lower_bound: T,
        _estimated_remaining: T,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_prune(
        &mut self,
        _state: &SearchState<T>,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_decisions_enqueued(
        &mut self,
        _state: &SearchState<T>,
        _count: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        _decision: Decision<T>,
        statistics: &BnbSolverStatistics,
    ) {
        if (statistics.nodes_explored & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_progress(state, statistics);
        }
    }

    fn on_backtrack(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {}

    fn on_solution_found(&mut self, assignment: &Assignment<T>, statistics: &BnbSolverStatistics) {
        let objective = assignment.objective_value();
        self.best_objective = Some(objective);
        trace!(
            objective = %objective,
            nodes = statistics.nodes_explored,
            "candidate accepted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::index::StrategyIndex;

    #[test]
    fn test_tracks_best_objective_and_resets_on_enter() {
        let mut monitor = LogTreeSearchMonitor::<i64>::new(Duration::from_millis(250), 0);
        let stats = BnbSolverStatistics::default();
        assert_eq!(monitor.best_objective(), None);

        monitor.on_solution_found(&Assignment::new(12, vec![StrategyIndex::new(0)]), &stats);
        assert_eq!(monitor.best_objective(), Some(12));
        monitor.on_solution_found(&Assignment::new(9, vec![StrategyIndex::new(1)]), &stats);
        assert_eq!(monitor.best_objective(), Some(9));

        assert_eq!(
            monitor.to_string(),
            "LogTreeSearchMonitor(log_interval: 250ms, clock_check_mask: 0)"
        );
        assert_eq!(DisplayBest::<i64>(None).to_string(), "inf");
    }
}
