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

//! Branch-and-bound solver for strategy-per-slot assignment.
//!
//! `BnbSolver` explores the tree in which every level fixes the strategy of
//! one slot. Two admissible tests run on every child before it is entered:
//!
//! - **Error look-ahead**: the child's error weight plus the smallest error
//!   weight every open slot must still add may not exceed the capacity.
//! - **Emission bound**: the child's emissions plus the cheapest emission of
//!   every open slot must still be able to reach the incumbent.
//!
//! By default a child is discarded as soon as it cannot beat the incumbent,
//! so only strict improvements are reported and the last one is optimal. With
//! tie enumeration enabled the bound only discards children that are strictly
//! worse, so every optimal assignment is reached and reported. A day with
//! interchangeable strategies has exponentially many of those. Reported
//! objectives never increase in either mode.
//!
//! The solver keeps its trail and stack between runs, so repeated solves
//! reuse their allocations.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    result::BnbSolverOutcome,
    stack::SearchStack,
    state::{RunningSums, SearchState},
    stats::BnbSolverStatistics,
    trail::SearchTrail,
};
use greenslot_model::{
    assignment::Assignment,
    index::{SlotIndex, StrategyIndex},
    model::Model,
};
use greenslot_search::{
    monitor::search_monitor::SearchCommand, num::SolverNumeric, result::TerminationReason,
};
use num_traits::{PrimInt, Signed};

/// An exact branch-and-bound solver. The shape of the tree is left to a
/// `DecisionBuilder`; the solver only applies, bounds and undoes decisions.
#[derive(Clone, Debug)]
pub struct BnbSolver<T>
where
    T: PrimInt + Signed,
{
    trail: SearchTrail<T>,
    stack: SearchStack<T>,
    enumerate_ties: bool,
}

impl<T> Default for BnbSolver<T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BnbSolver<T>
where
    T: PrimInt + Signed,
{
    /// Creates a solver that reports strict improvements only.
    #[inline]
    pub fn new() -> Self {
        Self {
            trail: SearchTrail::new(),
            stack: SearchStack::new(),
            enumerate_ties: false,
        }
    }

    /// Creates a solver with storage for the given problem size.
    ///
    /// The solver grows its storage on demand anyway; this only moves the
    /// allocations to construction time.
    #[inline]
    pub fn preallocated(num_slots: usize, num_strategies: usize) -> Self {
        Self {
            trail: SearchTrail::preallocated(num_slots),
            stack: SearchStack::preallocated(num_slots, num_strategies),
            enumerate_ties: false,
        }
    }

    /// Sets whether assignments that merely equal the incumbent are explored
    /// and reported. Without tie enumeration only strict improvements are.
    #[inline]
    pub fn with_tie_enumeration(mut self, enumerate_ties: bool) -> Self {
        self.enumerate_ties = enumerate_ties;
        self
    }

    #[inline]
    pub fn enumerates_ties(&self) -> bool {
        self.enumerate_ties
    }

    /// Solves `model`, branching with `builder` and reporting to `monitor`.
    pub fn solve<B, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        mut monitor: S,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let session = BnbSolverSearchSession::new(self, model, builder, &mut monitor);
        let outcome = session.run();
        self.reset();
        outcome
    }

    /// Clears the trail and stack, keeping their capacity.
    #[inline]
    fn reset(&mut self) {
        self.trail.reset();
        self.stack.reset();
    }
}

/// A child that passed both pruning tests.
#[derive(Clone, Copy, Debug)]
struct ChildNode<T> {
    sums: RunningSums<T>,
    slot_index: SlotIndex,
    strategy_index: StrategyIndex,
}

/// The per-run state of one `BnbSolver::solve` call.
struct BnbSolverSearchSession<'a, T, B, S>
where
    T: SolverNumeric,
{
    solver: &'a mut BnbSolver<T>,
    model: &'a Model<T>,
    builder: &'a mut B,
    monitor: &'a mut S,
    state: SearchState<T>,
    best_objective: Option<T>,
    best_assignment: Option<Assignment<T>>,
    enumerate_ties: bool,
    stats: BnbSolverStatistics,
    start_time: std::time::Instant,
}

impl<'a, T, B, S> std::fmt::Debug for BnbSolverSearchSession<'a, T, B, S>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BnbSolverSearchSession")
            .field("state", &self.state)
            .field("best_objective", &self.best_objective)
            .field("enumerate_ties", &self.enumerate_ties)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<'a, T, B, S> BnbSolverSearchSession<'a, T, B, S>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
    S: TreeSearchMonitor<T>,
{
    #[inline]
    fn new(
        solver: &'a mut BnbSolver<T>,
        model: &'a Model<T>,
        builder: &'a mut B,
        monitor: &'a mut S,
    ) -> Self {
        let enumerate_ties = solver.enumerate_ties;
        Self {
            solver,
            model,
            builder,
            monitor,
            state: SearchState::from_model(model),
            best_objective: None,
            best_assignment: None,
            enumerate_ties,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome<T> {
        self.monitor.on_enter_search(self.model, &self.stats);

        if !self.initialize() {
            self.stats.set_total_time(self.start_time.elapsed());
            self.monitor.on_exit_search(&self.stats);
            return self.finalize_result(TerminationReason::InfeasibilityProven);
        }

        let termination_reason = loop {
            self.monitor.on_step(&self.state, &self.stats);

            if let SearchCommand::Terminate(message) =
                self.monitor.search_command(&self.state, &self.stats)
            {
                break TerminationReason::Aborted(message);
            }

            if self.solver.stack.is_current_level_empty() {
                if self.solver.stack.depth() <= 1 {
                    break if self.best_assignment.is_some() {
                        TerminationReason::OptimalityProven
                    } else {
                        TerminationReason::InfeasibilityProven
                    };
                }
                self.backtrack_step();
            } else {
                self.process_next_decision();
            }
        };

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        self.finalize_result(termination_reason)
    }

    fn finalize_result(self, reason: TerminationReason) -> BnbSolverOutcome<T> {
        match reason {
            TerminationReason::OptimalityProven => match self.best_assignment {
                Some(assignment) => BnbSolverOutcome::optimal(assignment, self.stats),
                None => BnbSolverOutcome::infeasible(self.stats),
            },
            TerminationReason::InfeasibilityProven => BnbSolverOutcome::infeasible(self.stats),
            TerminationReason::Aborted(message) => {
                BnbSolverOutcome::aborted(self.best_assignment, message, self.stats)
            }
        }
    }

    /// Sets up the root level. Returns `false` if the model is infeasible
    /// before a single decision is made.
    fn initialize(&mut self) -> bool {
        let num_slots = self.model.num_slots();
        let num_strategies = self.model.num_strategies();

        self.solver.trail.ensure_capacity(num_slots);
        self.solver.stack.ensure_capacity(num_slots, num_strategies);
        self.builder.initialize(self.model);

        // A slot without strategies can never be filled, and the cheapest
        // errors alone may already exceed the capacity.
        if (num_slots > 0 && num_strategies == 0)
            || self.state.error_lower_bound() > self.model.error_capacity()
        {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            return false;
        }

        // Root frame. It has to exist before decisions are pushed.
        self.solver.trail.push_frame();
        self.solver.stack.push_frame();
        self.stats.on_node_explored();
        self.monitor.on_lower_bound_computed(
            &self.state,
            self.state.lower_bound(),
            self.state.remaining_min_emission(),
            &self.stats,
        );

        if self.state.is_complete() {
            let objective = self.state.current_objective();
            self.handle_complete_solution(objective);
            return true;
        }

        self.enqueue_decisions();
        true
    }

    #[inline]
    fn enqueue_decisions(&mut self) {
        let decisions = self.builder.next_decision(self.model, &self.state);

        let count_before = self.solver.stack.num_entries();
        self.solver.stack.extend(decisions);
        let added = self.solver.stack.num_entries() - count_before;

        self.stats.on_decisions_generated(added as u64);
        self.monitor
            .on_decisions_enqueued(&self.state, added, &self.stats);
    }

    #[inline]
    fn backtrack_step(&mut self) {
        self.stats.on_backtrack();
        self.monitor.on_backtrack(&self.state, &self.stats);

        self.solver.trail.backtrack(&mut self.state);
        self.solver.stack.pop_frame();
    }

    #[inline(always)]
    fn process_next_decision(&mut self) {
        let Some(decision) = self.solver.stack.pop() else {
            return;
        };

        if let Some(child) = self.build_child(decision) {
            self.descend(child, decision);
        }
    }

    /// Returns `true` if a subtree whose objective is at least `bound` cannot
    /// produce a candidate.
    #[inline(always)]
    fn is_dominated(&self, bound: T) -> bool {
        match self.best_objective {
            None => false,
            Some(best) if self.enumerate_ties => bound > best,
            Some(best) => bound >= best,
        }
    }

    /// Computes the sums of the child `decision` leads to, or `None` if the
    /// child is pruned.
    #[inline(always)]
    fn build_child(&mut self, decision: Decision<T>) -> Option<ChildNode<T>> {
        let slot_index = decision.slot_index();
        let current = self.state.running_sums();

        let sums = RunningSums {
            objective: current.objective.saturating_add_val(decision.cost_delta()),
            error: current.error.saturating_add_val(decision.error_delta()),
            remaining_min_emission: current
                .remaining_min_emission
                .saturating_sub_val(self.model.slot_min_emission(slot_index)),
            remaining_min_error: current
                .remaining_min_error
                .saturating_sub_val(self.model.slot_min_error_weight(slot_index)),
        };

        if sums.error.saturating_add_val(sums.remaining_min_error) > self.model.error_capacity() {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            return None;
        }

        let bound = sums.objective.saturating_add_val(sums.remaining_min_emission);
        if self.is_dominated(bound) {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return None;
        }

        Some(ChildNode {
            sums,
            slot_index,
            strategy_index: decision.strategy_index(),
        })
    }

    #[inline(always)]
    fn descend(&mut self, child: ChildNode<T>, decision: Decision<T>) {
        self.solver.trail.push_frame();
        self.solver.trail.apply_assignment(
            &mut self.state,
            child.slot_index,
            child.strategy_index,
            child.sums,
        );
        self.solver.stack.push_frame();

        self.stats.on_node_explored();
        self.stats
            .on_depth_update(self.state.num_assigned_slots() as u64);
        self.monitor.on_descend(&self.state, decision, &self.stats);

        if self.state.is_complete() {
            self.handle_complete_solution(child.sums.objective);
            return;
        }

        self.monitor.on_lower_bound_computed(
            &self.state,
            self.state.lower_bound(),
            self.state.remaining_min_emission(),
            &self.stats,
        );
        self.enqueue_decisions();
    }

    /// Reports the complete assignment in the state if it is not dominated.
    fn handle_complete_solution(&mut self, objective: T) {
        if self.is_dominated(objective) {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }

        match Assignment::try_from(&self.state) {
            Ok(assignment) => {
                self.best_objective = Some(objective);
                self.stats.on_solution_found();
                self.monitor.on_solution_found(&assignment, &self.stats);
                self.best_assignment = Some(assignment);
            }
            Err(_) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            }
        }
    }
}
