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

use crate::state::SearchState;
use greenslot_model::{
    index::{SlotIndex, StrategyIndex},
    model::Model,
};
use num_traits::{PrimInt, Signed};
use std::iter::FusedIterator;

/// A decision to run one slot with one strategy, together with what that
/// choice adds to the objective and to the error weight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decision<T> {
    /// The emissions the strategy adds in this slot.
    cost_delta: T,
    /// The error weight the strategy adds in this slot.
    error_delta: T,
    slot_index: SlotIndex,
    strategy_index: StrategyIndex,
}

impl<T> std::fmt::Display for Decision<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decision(slot: {}, strategy: {}, cost_delta: {}, error_delta: {})",
            self.slot_index, self.strategy_index, self.cost_delta, self.error_delta
        )
    }
}

impl<T> Decision<T>
where
    T: PrimInt + Signed,
{
    /// Creates the decision of running `slot_index` with `strategy_index`,
    /// reading both deltas from `model`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds for `model`.
    #[inline]
    pub fn new(model: &Model<T>, slot_index: SlotIndex, strategy_index: StrategyIndex) -> Self {
        Self {
            cost_delta: model.emission(slot_index, strategy_index),
            error_delta: model.error_weight(slot_index, strategy_index),
            slot_index,
            strategy_index,
        }
    }

    /// Creates a decision without bounds checking the indices.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `slot_index` is within `0..model.num_slots()`
    /// and `strategy_index` is within `0..model.num_strategies()`.
    #[inline]
    pub unsafe fn new_unchecked(
        model: &Model<T>,
        slot_index: SlotIndex,
        strategy_index: StrategyIndex,
    ) -> Self {
        debug_assert!(
            slot_index.get() < model.num_slots(),
            "called `Decision::new_unchecked` with slot index out of bounds: the len is {} but the index is {}",
            model.num_slots(),
            slot_index.get()
        );
        debug_assert!(
            strategy_index.get() < model.num_strategies(),
            "called `Decision::new_unchecked` with strategy index out of bounds: the len is {} but the index is {}",
            model.num_strategies(),
            strategy_index.get()
        );

        unsafe {
            Self {
                cost_delta: model.emission_unchecked(slot_index, strategy_index),
                error_delta: model.error_weight_unchecked(slot_index, strategy_index),
                slot_index,
                strategy_index,
            }
        }
    }

    #[inline(always)]
    pub const fn slot_index(&self) -> SlotIndex {
        self.slot_index
    }

    #[inline(always)]
    pub const fn strategy_index(&self) -> StrategyIndex {
        self.strategy_index
    }

    #[inline(always)]
    pub const fn cost_delta(&self) -> T {
        self.cost_delta
    }

    #[inline(always)]
    pub const fn error_delta(&self) -> T {
        self.error_delta
    }
}

/// Produces the children of a search node.
///
/// Every node branches on exactly one open slot, and the builder yields one
/// decision per strategy of that slot. The session pushes the decisions on a
/// LIFO stack, so the decision yielded **last** is explored **first**.
/// Yielding the same slot for every node of a level keeps the tree free of
/// duplicate complete assignments.
pub trait DecisionBuilder<T>
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>: Iterator<Item = Decision<T>> + FusedIterator + 'a
    where
        Self: 'a,
        T: 'a;

    fn name(&self) -> &str;

    /// Prepares per-model data before the search starts.
    fn initialize(&mut self, _model: &Model<T>) {}

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        search_state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::{
        model::ModelBuilder,
        repository::{Repository, Strategy, TimeSlot},
    };

    #[test]
    fn test_decision_reads_deltas_from_model() {
        let repository = Repository::new(
            vec![TimeSlot::new("t0", 10, 20, 5, 4)],
            vec![Strategy::new("fast", 3, 150)],
        );
        let model: Model<i64> = ModelBuilder::new(&repository)
            .error_threshold(2)
            .build()
            .expect("model should build");

        let decision = Decision::new(&model, SlotIndex::new(0), StrategyIndex::new(0));
        assert_eq!(decision.cost_delta(), 20 * 4 * 3);
        assert_eq!(decision.error_delta(), 4 * 150);
        assert_eq!(decision.slot_index(), SlotIndex::new(0));
        assert_eq!(decision.strategy_index(), StrategyIndex::new(0));

        let unchecked =
            unsafe { Decision::new_unchecked(&model, SlotIndex::new(0), StrategyIndex::new(0)) };
        assert_eq!(decision, unchecked);
    }
}
