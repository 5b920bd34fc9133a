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

//! Counters collected by the branch-and-bound session.
//!
//! `BnbSolverStatistics` is updated in the hot loop, so every mutator is a
//! saturating increment and `#[inline(always)]`. At the end of a run the
//! counters are folded into the backend-independent `SolverStatistics`.

use greenslot_search::stats::{SolverStatistics, SolverStatisticsBuilder};

/// Statistics of a single branch-and-bound run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BnbSolverStatistics {
    /// Number of nodes that were created and entered.
    pub nodes_explored: u64,
    /// Number of times the search undid a level.
    pub backtracks: u64,
    /// Number of branching decisions produced by the decision builder.
    pub decisions_generated: u64,
    /// Deepest level reached, the root being level zero.
    pub max_depth: u64,
    /// Number of children discarded because the error capacity could not be met.
    pub prunings_infeasible: u64,
    /// Number of children discarded because their bound could not reach the incumbent.
    pub prunings_bound: u64,
    /// Number of candidates reported to the monitor.
    pub solutions_found: u64,
    /// Wall time of the run.
    pub time_total: std::time::Duration,
}

impl BnbSolverStatistics {
    #[inline(always)]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline(always)]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline(always)]
    pub fn on_decisions_generated(&mut self, count: u64) {
        self.decisions_generated = self.decisions_generated.saturating_add(count);
    }

    #[inline(always)]
    pub fn on_depth_update(&mut self, depth: u64) {
        if depth > self.max_depth {
            self.max_depth = depth;
        }
    }

    #[inline(always)]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline(always)]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline(always)]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline(always)]
    pub fn set_total_time(&mut self, duration: std::time::Duration) {
        self.time_total = duration;
    }

    /// Total number of pruned children, regardless of the reason.
    #[inline]
    pub fn prunings_total(&self) -> u64 {
        self.prunings_infeasible.saturating_add(self.prunings_bound)
    }
}

impl From<BnbSolverStatistics> for SolverStatistics {
    fn from(statistics: BnbSolverStatistics) -> Self {
        SolverStatisticsBuilder::new()
            .solutions_found(statistics.solutions_found)
            .nodes_explored(statistics.nodes_explored)
            .used_threads(1)
            .solve_duration(statistics.time_total)
            .build()
    }
}

impl std::fmt::Display for BnbSolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Greenslot-BnB Solver Statistics:")?;
        writeln!(f, "  Nodes Explored:        {}", self.nodes_explored)?;
        writeln!(f, "  Backtracks:            {}", self.backtracks)?;
        writeln!(f, "  Decisions Generated:   {}", self.decisions_generated)?;
        writeln!(f, "  Max Depth:             {}", self.max_depth)?;
        writeln!(f, "  Prunings (Infeasible): {}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (Bound):      {}", self.prunings_bound)?;
        writeln!(f, "  Solutions Found:       {}", self.solutions_found)?;
        write!(
            f,
            "  Total Time (secs):     {:.3}",
            self.time_total.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_saturate_and_track_depth() {
        let mut stats = BnbSolverStatistics {
            nodes_explored: u64::MAX,
            ..Default::default()
        };
        stats.on_node_explored();
        assert_eq!(stats.nodes_explored, u64::MAX);

        stats.on_depth_update(3);
        stats.on_depth_update(1);
        assert_eq!(stats.max_depth, 3);

        stats.on_pruning_bound();
        stats.on_pruning_infeasible();
        stats.on_pruning_bound();
        assert_eq!(stats.prunings_total(), 3);
    }

    #[test]
    fn test_conversion_into_solver_statistics() {
        let mut stats = BnbSolverStatistics::default();
        stats.on_node_explored();
        stats.on_node_explored();
        stats.on_solution_found();
        stats.set_total_time(std::time::Duration::from_millis(5));

        let converted: SolverStatistics = stats.into();
        assert_eq!(converted.nodes_explored, 2);
        assert_eq!(converted.solutions_found, 1);
        assert_eq!(converted.used_threads, 1);
        assert_eq!(converted.solve_duration, std::time::Duration::from_millis(5));
    }

    #[test]
    fn test_display_header() {
        let text = BnbSolverStatistics::default().to_string();
        assert!(text.starts_with("Greenslot-BnB Solver Statistics:"));
        assert!(text.contains("Prunings (Bound):"));
    }
}
