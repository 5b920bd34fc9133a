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

//! Incremental search state of the branch-and-bound tree.
//!
//! `SearchState` holds the partial assignment of strategies to slots together
//! with the running sums the pruning rules need:
//!
//! - `current_objective`: emissions of the assigned slots.
//! - `current_error`: error weight of the assigned slots.
//! - `remaining_min_emission`: sum of the cheapest emission of every unassigned slot.
//! - `remaining_min_error`: sum of the smallest error weight of every unassigned slot.
//!
//! All four are kept up to date by the trail, so the lower bound of a node is
//! available in constant time as `current_objective + remaining_min_emission`.
//!
//! Invariants (debug-checked):
//! - `num_assigned_slots <= num_slots`
//! - A slot's entry in `slot_strategies` is only meaningful while the slot is
//!   marked in `slot_assignments`.

use fixedbitset::FixedBitSet;
use greenslot_model::{
    assignment::Assignment,
    index::{SlotIndex, StrategyIndex},
    model::Model,
};
use num_traits::{PrimInt, Signed};

/// The sums a node carries besides its assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunningSums<T> {
    pub objective: T,
    pub error: T,
    pub remaining_min_emission: T,
    pub remaining_min_error: T,
}

/// The partial assignment and its running sums.
#[derive(Debug, Clone)]
pub struct SearchState<T> {
    slot_strategies: Vec<StrategyIndex>,
    slot_assignments: FixedBitSet,

    current_objective: T,
    current_error: T,
    remaining_min_emission: T,
    remaining_min_error: T,

    num_slots: usize,
    num_assigned_slots: usize,
}

impl<T> SearchState<T>
where
    T: PrimInt + Signed,
{
    /// Creates an empty state for `num_slots` slots with all sums at zero.
    #[inline]
    pub fn new(num_slots: usize) -> Self {
        Self {
            slot_strategies: vec![StrategyIndex::new(0); num_slots],
            slot_assignments: FixedBitSet::with_capacity(num_slots),
            current_objective: T::zero(),
            current_error: T::zero(),
            remaining_min_emission: T::zero(),
            remaining_min_error: T::zero(),
            num_slots,
            num_assigned_slots: 0,
        }
    }

    /// Creates the root state of `model`: nothing assigned, and the remaining
    /// sums seeded with the per-slot minima.
    pub fn from_model(model: &Model<T>) -> Self {
        let mut state = Self::new(model.num_slots());
        state.remaining_min_emission = model
            .slot_min_emissions()
            .iter()
            .fold(T::zero(), |acc, &value| acc + value);
        state.remaining_min_error = model
            .slot_min_error_weights()
            .iter()
            .fold(T::zero(), |acc, &value| acc + value);
        state
    }

    #[inline]
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    #[inline]
    pub fn num_assigned_slots(&self) -> usize {
        self.num_assigned_slots
    }

    /// Returns `true` if every slot has a strategy.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.num_assigned_slots == self.num_slots
    }

    #[inline]
    pub fn current_objective(&self) -> T {
        self.current_objective
    }

    #[inline]
    pub fn set_current_objective(&mut self, objective: T) {
        self.current_objective = objective;
    }

    #[inline]
    pub fn current_error(&self) -> T {
        self.current_error
    }

    #[inline]
    pub fn set_current_error(&mut self, error: T) {
        self.current_error = error;
    }

    #[inline]
    pub fn remaining_min_emission(&self) -> T {
        self.remaining_min_emission
    }

    #[inline]
    pub fn set_remaining_min_emission(&mut self, value: T) {
        self.remaining_min_emission = value;
    }

    #[inline]
    pub fn remaining_min_error(&self) -> T {
        self.remaining_min_error
    }

    #[inline]
    pub fn set_remaining_min_error(&mut self, value: T) {
        self.remaining_min_error = value;
    }

    /// Returns all four running sums at once.
    #[inline]
    pub fn running_sums(&self) -> RunningSums<T> {
        RunningSums {
            objective: self.current_objective,
            error: self.current_error,
            remaining_min_emission: self.remaining_min_emission,
            remaining_min_error: self.remaining_min_error,
        }
    }

    /// Overwrites all four running sums.
    #[inline]
    pub fn set_running_sums(&mut self, sums: RunningSums<T>) {
        self.current_objective = sums.objective;
        self.current_error = sums.error;
        self.remaining_min_emission = sums.remaining_min_emission;
        self.remaining_min_error = sums.remaining_min_error;
    }

    /// The objective no completion of this partial assignment can beat.
    #[inline]
    pub fn lower_bound(&self) -> T {
        self.current_objective + self.remaining_min_emission
    }

    /// The error weight every completion of this partial assignment carries at least.
    #[inline]
    pub fn error_lower_bound(&self) -> T {
        self.current_error + self.remaining_min_error
    }

    /// Checks if the specified slot has a strategy.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds `0..num_slots`.
    #[inline]
    pub fn is_slot_assigned(&self, slot_index: SlotIndex) -> bool {
        let index = slot_index.get();
        assert!(
            index < self.num_slots,
            "called `SearchState::is_slot_assigned` with slot index out of bounds: the len is {} but the index is {}",
            self.num_slots,
            index
        );

        self.slot_assignments.contains(index)
    }

    /// Returns the strategy of an assigned slot, or `None` if the slot is open.
    #[inline]
    pub fn slot_strategy(&self, slot_index: SlotIndex) -> Option<StrategyIndex> {
        if self.is_slot_assigned(slot_index) {
            Some(self.slot_strategies[slot_index.get()])
        } else {
            None
        }
    }

    /// Returns the lowest-indexed slot without a strategy.
    #[inline]
    pub fn first_unassigned_slot(&self) -> Option<SlotIndex> {
        self.slot_assignments
            .zeroes()
            .next()
            .filter(|&index| index < self.num_slots)
            .map(SlotIndex::new)
    }

    /// Assigns `strategy_index` to `slot_index`. The running sums are left
    /// untouched; the trail updates them.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds. In debug mode, also panics if
    /// the slot is already assigned.
    #[inline]
    pub fn assign_slot(&mut self, slot_index: SlotIndex, strategy_index: StrategyIndex) {
        let index = slot_index.get();
        assert!(
            index < self.num_slots,
            "called `SearchState::assign_slot` with slot index out of bounds: the len is {} but the index is {}",
            self.num_slots,
            index
        );
        debug_assert!(
            !self.slot_assignments.contains(index),
            "called `SearchState::assign_slot` with slot {} already assigned",
            index
        );

        self.slot_assignments.insert(index);
        self.slot_strategies[index] = strategy_index;
        self.num_assigned_slots += 1;
    }

    /// Removes the strategy of `slot_index`.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds. In debug mode, also panics if
    /// the slot is not assigned.
    #[inline]
    pub fn unassign_slot(&mut self, slot_index: SlotIndex) {
        let index = slot_index.get();
        assert!(
            index < self.num_slots,
            "called `SearchState::unassign_slot` with slot index out of bounds: the len is {} but the index is {}",
            self.num_slots,
            index
        );
        debug_assert!(
            self.slot_assignments.contains(index),
            "called `SearchState::unassign_slot` with slot {} not assigned",
            index
        );

        self.slot_assignments.set(index, false);
        self.num_assigned_slots -= 1;
    }

    /// Clears every assignment and zeroes the running sums.
    pub fn reset(&mut self) {
        self.slot_assignments.clear();
        self.num_assigned_slots = 0;
        self.current_objective = T::zero();
        self.current_error = T::zero();
        self.remaining_min_emission = T::zero();
        self.remaining_min_error = T::zero();
    }
}

/// Returned when converting a state that still has open slots into an `Assignment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteAssignmentError {
    num_slots: usize,
    num_assigned_slots: usize,
}

impl IncompleteAssignmentError {
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    #[inline]
    pub fn num_assigned_slots(&self) -> usize {
        self.num_assigned_slots
    }
}

impl std::fmt::Display for IncompleteAssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "search state is incomplete: {} of {} slots assigned",
            self.num_assigned_slots, self.num_slots
        )
    }
}

impl std::error::Error for IncompleteAssignmentError {}

impl<T> TryFrom<&SearchState<T>> for Assignment<T>
where
    T: PrimInt + Signed,
{
    type Error = IncompleteAssignmentError;

    fn try_from(state: &SearchState<T>) -> Result<Self, Self::Error> {
        if !state.is_complete() {
            return Err(IncompleteAssignmentError {
                num_slots: state.num_slots,
                num_assigned_slots: state.num_assigned_slots,
            });
        }

        Ok(Assignment::new(
            state.current_objective,
            state.slot_strategies.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::{
        model::ModelBuilder,
        repository::{Repository, Strategy, TimeSlot},
    };

    fn model() -> Model<i64> {
        let repository = Repository::new(
            vec![
                TimeSlot::new("t0", 100, 100, 10, 10),
                TimeSlot::new("t1", 300, 300, 20, 20),
            ],
            vec![
                Strategy::new("s0", 10, 0),
                Strategy::new("s1", 3, 500),
            ],
        );
        ModelBuilder::new(&repository)
            .error_threshold(5)
            .build()
            .expect("model should build")
    }

    #[test]
    fn test_root_state_seeds_remaining_sums() {
        let model = model();
        let state = SearchState::from_model(&model);
        assert_eq!(state.num_slots(), 2);
        assert_eq!(state.num_assigned_slots(), 0);
        assert_eq!(state.remaining_min_emission(), 3_000 + 18_000);
        assert_eq!(state.remaining_min_error(), 0);
        assert_eq!(state.lower_bound(), 21_000);
        assert_eq!(state.first_unassigned_slot(), Some(SlotIndex::new(0)));
    }

    #[test]
    fn test_assign_and_unassign() {
        let mut state = SearchState::<i64>::new(3);
        state.assign_slot(SlotIndex::new(1), StrategyIndex::new(2));
        assert!(state.is_slot_assigned(SlotIndex::new(1)));
        assert_eq!(
            state.slot_strategy(SlotIndex::new(1)),
            Some(StrategyIndex::new(2))
        );
        assert_eq!(state.slot_strategy(SlotIndex::new(0)), None);
        assert_eq!(state.first_unassigned_slot(), Some(SlotIndex::new(0)));

        state.unassign_slot(SlotIndex::new(1));
        assert!(!state.is_slot_assigned(SlotIndex::new(1)));
        assert_eq!(state.num_assigned_slots(), 0);
    }

    #[test]
    fn test_conversion_requires_complete_state() {
        let mut state = SearchState::<i64>::new(2);
        state.assign_slot(SlotIndex::new(0), StrategyIndex::new(1));
        let err = Assignment::try_from(&state).unwrap_err();
        assert_eq!(err.num_slots(), 2);
        assert_eq!(err.num_assigned_slots(), 1);
        assert_eq!(
            err.to_string(),
            "search state is incomplete: 1 of 2 slots assigned"
        );

        state.assign_slot(SlotIndex::new(1), StrategyIndex::new(0));
        state.set_current_objective(42);
        let assignment = Assignment::try_from(&state).expect("state is complete");
        assert_eq!(assignment.objective_value(), 42);
        assert_eq!(
            assignment.strategies(),
            &[StrategyIndex::new(1), StrategyIndex::new(0)]
        );
    }

    #[test]
    fn test_first_unassigned_slot_on_full_state() {
        let mut state = SearchState::<i64>::new(1);
        state.assign_slot(SlotIndex::new(0), StrategyIndex::new(0));
        assert!(state.is_complete());
        assert_eq!(state.first_unassigned_slot(), None);
    }

    #[test]
    #[should_panic(expected = "slot index out of bounds")]
    fn test_out_of_bounds_slot_panics() {
        let state = SearchState::<i64>::new(1);
        state.is_slot_assigned(SlotIndex::new(5));
    }
}
