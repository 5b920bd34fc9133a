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

use crate::branching::decision::Decision;

/// A frame-structured LIFO stack of pending decisions.
///
/// `SearchStack` stores all enqueued `Decision`s linearly and uses a `frames`
/// index stack to mark decision-level boundaries. Popping a frame truncates
/// `entries` back to the recorded start index, dropping the siblings that
/// were not explored.
#[derive(Clone, Debug)]
pub struct SearchStack<T> {
    entries: Vec<Decision<T>>,
    /// `frames[i]` stores the index in `entries` where depth `i` began.
    frames: Vec<usize>,
}

impl<T> Default for SearchStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchStack<T> {
    /// Creates a new, empty `SearchStack`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Creates a stack sized for a full dive: one level per slot, each holding
    /// at most one decision per strategy.
    #[inline]
    pub fn preallocated(num_slots: usize, num_strategies: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_slots.saturating_mul(num_strategies)),
            frames: Vec::with_capacity(num_slots.saturating_add(1)),
        }
    }

    /// Ensures the stack has capacity for the given problem size.
    #[inline]
    pub fn ensure_capacity(&mut self, num_slots: usize, num_strategies: usize) {
        let entry_capacity = num_slots.saturating_mul(num_strategies);
        let frame_capacity = num_slots.saturating_add(1);

        if self.entries.capacity() < entry_capacity {
            self.entries.reserve(entry_capacity - self.entries.len());
        }
        if self.frames.capacity() < frame_capacity {
            self.frames.reserve(frame_capacity - self.frames.len());
        }
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Returns the current search depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if there are no frames tracked (search exhausted).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Opens a new decision level.
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Pops the current frame, truncating `entries` back to the
    /// start index recorded for this depth.
    #[inline]
    pub fn pop_frame(&mut self) -> Option<()> {
        let start = self.frames.pop()?;
        self.entries.truncate(start);
        Some(())
    }

    #[inline]
    pub fn push(&mut self, decision: Decision<T>) {
        self.entries.push(decision);
    }

    #[inline]
    pub fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = Decision<T>>,
    {
        self.entries.extend(iter);
    }

    /// Pops the next decision (LIFO) from the stack.
    #[inline]
    pub fn pop(&mut self) -> Option<Decision<T>> {
        self.entries.pop()
    }

    /// Clears all entries and frames, but keeps allocated capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }

    /// Returns `true` if the current level has no remaining decisions.
    #[inline]
    pub fn is_current_level_empty(&self) -> bool {
        match self.frames.last() {
            Some(&start) => self.entries.len() == start,
            None => true,
        }
    }

    /// Returns the pending decisions of the current level.
    #[inline]
    pub fn current_frame_entries(&self) -> &[Decision<T>] {
        match self.frames.last() {
            Some(&start) => &self.entries[start..],
            None => &[],
        }
    }
}

impl<T> std::fmt::Display for SearchStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchStack(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::{
        index::{SlotIndex, StrategyIndex},
        model::{Model, ModelBuilder},
        repository::{Repository, Strategy, TimeSlot},
    };

    fn decisions() -> Vec<Decision<i64>> {
        let repository = Repository::new(
            vec![TimeSlot::new("t0", 1, 1, 1, 1)],
            vec![Strategy::new("a", 1, 0), Strategy::new("b", 2, 0)],
        );
        let model: Model<i64> = ModelBuilder::new(&repository)
            .build()
            .expect("model should build");
        StrategyIndex::range(2)
            .map(|s| Decision::new(&model, SlotIndex::new(0), s))
            .collect()
    }

    #[test]
    fn test_frames_bound_the_levels() {
        let decisions = decisions();
        let mut stack = SearchStack::preallocated(1, 2);
        assert!(stack.is_current_level_empty());

        stack.push_frame();
        stack.extend(decisions.iter().copied());
        assert_eq!(stack.current_frame_entries().len(), 2);

        stack.push_frame();
        assert!(stack.is_current_level_empty());
        stack.push(decisions[0]);
        assert_eq!(stack.depth(), 2);

        stack.pop_frame();
        assert_eq!(stack.num_entries(), 2);
        assert_eq!(stack.pop(), Some(decisions[1]));
        assert_eq!(stack.pop(), Some(decisions[0]));
        assert!(stack.is_current_level_empty());

        stack.pop_frame();
        assert!(stack.is_empty());
        assert_eq!(stack.pop_frame(), None);
    }

    #[test]
    fn test_pop_frame_drops_unexplored_siblings() {
        let decisions = decisions();
        let mut stack = SearchStack::new();
        stack.push_frame();
        stack.push(decisions[0]);
        stack.push_frame();
        stack.extend(decisions.iter().copied());
        stack.pop_frame();
        assert_eq!(stack.current_frame_entries(), &[decisions[0]]);
        assert_eq!(stack.to_string(), "SearchStack(entries: 1, frames: 1)");
    }
}
