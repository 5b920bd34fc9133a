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

//! Undo log for the search state.
//!
//! Every assignment applied while descending is recorded as a `TrailEntry`
//! holding the slot and the running sums it overwrote. Frames mark decision
//! levels, so backtracking one level replays the entries of the top frame in
//! reverse and restores the state exactly as it was before the level began.

use crate::state::{RunningSums, SearchState};
use greenslot_model::index::{SlotIndex, StrategyIndex};
use num_traits::{PrimInt, Signed};

/// A single undoable assignment: the slot it filled and the sums it replaced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TrailEntry<T> {
    old_sums: RunningSums<T>,
    slot_index: SlotIndex,
}

impl<T> TrailEntry<T>
where
    T: Copy,
{
    /// Returns the running sums in effect before the assignment.
    #[inline]
    pub fn old_sums(&self) -> RunningSums<T> {
        self.old_sums
    }

    /// Returns the slot the assignment filled.
    #[inline]
    pub fn slot_index(&self) -> SlotIndex {
        self.slot_index
    }
}

impl<T> std::fmt::Display for TrailEntry<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TrailEntry(slot: {}, old objective: {}, old error: {})",
            self.slot_index, self.old_sums.objective, self.old_sums.error
        )
    }
}

/// Frame-structured log of applied assignments.
///
/// `frames[i]` is the index into `entries` where decision level `i` began.
#[derive(Debug, Clone)]
pub struct SearchTrail<T> {
    entries: Vec<TrailEntry<T>>,
    frames: Vec<usize>,
}

impl<T> Default for SearchTrail<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchTrail<T> {
    /// Creates a new, empty `SearchTrail`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Creates a trail with room for one entry per slot and one frame per level.
    #[inline]
    pub fn preallocated(num_slots: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_slots),
            frames: Vec::with_capacity(num_slots + 1),
        }
    }

    /// Grows the buffers so a search over `num_slots` slots never reallocates.
    pub fn ensure_capacity(&mut self, num_slots: usize) {
        if self.entries.capacity() < num_slots {
            self.entries.reserve(num_slots - self.entries.len());
        }
        if self.frames.capacity() < num_slots + 1 {
            self.frames.reserve((num_slots + 1) - self.frames.len());
        }
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of open decision levels.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Opens a new decision level.
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Assigns `strategy_index` to `slot_index` in `state`, installs `new_sums`
    /// and records what was overwritten.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds for `state`, or in debug builds
    /// if the slot is already assigned.
    pub fn apply_assignment(
        &mut self,
        state: &mut SearchState<T>,
        slot_index: SlotIndex,
        strategy_index: StrategyIndex,
        new_sums: RunningSums<T>,
    ) where
        T: PrimInt + Signed,
    {
        self.entries.push(TrailEntry {
            old_sums: state.running_sums(),
            slot_index,
        });

        state.assign_slot(slot_index, strategy_index);
        state.set_running_sums(new_sums);
    }

    /// Closes the top decision level and undoes every assignment made in it.
    pub fn backtrack(&mut self, state: &mut SearchState<T>)
    where
        T: PrimInt + Signed,
    {
        let Some(start) = self.frames.pop() else {
            return;
        };

        while self.entries.len() > start {
            let Some(entry) = self.entries.pop() else {
                break;
            };
            state.unassign_slot(entry.slot_index);
            state.set_running_sums(entry.old_sums);
        }
    }

    /// Forgets all entries and frames without touching any state.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }

    #[inline]
    pub fn iter_entries(&self) -> std::slice::Iter<'_, TrailEntry<T>> {
        self.entries.iter()
    }
}

impl<T> std::fmt::Display for SearchTrail<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchTrail(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums(objective: i64, error: i64, emission: i64, remaining_error: i64) -> RunningSums<i64> {
        RunningSums {
            objective,
            error,
            remaining_min_emission: emission,
            remaining_min_error: remaining_error,
        }
    }

    #[test]
    fn test_backtrack_restores_state_of_the_level() {
        let mut state = SearchState::<i64>::new(3);
        state.set_running_sums(sums(0, 0, 30, 3));
        let mut trail = SearchTrail::preallocated(3);

        trail.push_frame();
        trail.apply_assignment(&mut state, SlotIndex::new(0), StrategyIndex::new(1), sums(12, 1, 20, 2));

        trail.push_frame();
        trail.apply_assignment(&mut state, SlotIndex::new(2), StrategyIndex::new(0), sums(20, 4, 10, 1));
        assert_eq!(trail.depth(), 2);
        assert_eq!(state.num_assigned_slots(), 2);

        trail.backtrack(&mut state);
        assert_eq!(trail.depth(), 1);
        assert!(!state.is_slot_assigned(SlotIndex::new(2)));
        assert!(state.is_slot_assigned(SlotIndex::new(0)));
        assert_eq!(state.running_sums(), sums(12, 1, 20, 2));

        trail.backtrack(&mut state);
        assert!(trail.is_empty());
        assert_eq!(state.num_assigned_slots(), 0);
        assert_eq!(state.running_sums(), sums(0, 0, 30, 3));
    }

    #[test]
    fn test_backtrack_on_empty_trail_is_noop() {
        let mut state = SearchState::<i64>::new(1);
        let mut trail = SearchTrail::new();
        trail.backtrack(&mut state);
        assert_eq!(trail.num_entries(), 0);
        assert_eq!(state.num_assigned_slots(), 0);
    }

    #[test]
    fn test_empty_frame_backtracks_cleanly() {
        let mut state = SearchState::<i64>::new(2);
        let mut trail = SearchTrail::new();
        trail.push_frame();
        trail.push_frame();
        trail.backtrack(&mut state);
        assert_eq!(trail.depth(), 1);
        assert_eq!(trail.to_string(), "SearchTrail(entries: 0, frames: 1)");
    }
}
