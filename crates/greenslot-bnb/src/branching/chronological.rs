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

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    state::SearchState,
};
use greenslot_model::{
    index::{SlotIndex, StrategyIndex},
    model::Model,
};
use num_traits::{PrimInt, Signed};
use std::iter::FusedIterator;

/// A decision builder that fills slots in index order and tries strategies
/// in index order.
///
/// The lowest open slot is branched on, and the children are yielded from the
/// highest strategy index down so that strategy `0` is explored first. This
/// is the plain lexicographic enumeration of all assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChronologicalBuilder;

impl ChronologicalBuilder {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<T> DecisionBuilder<T> for ChronologicalBuilder
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>
        = ChronologicalIter<'a, T>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "ChronologicalBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        match state.first_unassigned_slot() {
            Some(slot_index) => ChronologicalIter {
                model,
                slot_index,
                remaining: model.num_strategies(),
            },
            None => ChronologicalIter {
                model,
                slot_index: SlotIndex::new(0),
                remaining: 0,
            },
        }
    }
}

/// Iterator over the strategies of one slot, from the last index down to `0`.
#[derive(Debug, Clone)]
pub struct ChronologicalIter<'a, T>
where
    T: PrimInt + Signed,
{
    model: &'a Model<T>,
    slot_index: SlotIndex,
    remaining: usize,
}

impl<'a, T> Iterator for ChronologicalIter<'a, T>
where
    T: PrimInt + Signed,
{
    type Item = Decision<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        // `remaining` starts at `num_strategies` and the slot came from the state,
        // so both indices are in bounds.
        Some(unsafe {
            Decision::new_unchecked(
                self.model,
                self.slot_index,
                StrategyIndex::new(self.remaining),
            )
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for ChronologicalIter<'a, T> where T: PrimInt + Signed {}

impl<'a, T> FusedIterator for ChronologicalIter<'a, T> where T: PrimInt + Signed {}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::{
        model::ModelBuilder,
        repository::{Repository, Strategy, TimeSlot},
    };

    fn build_model() -> Model<i64> {
        let repository = Repository::new(
            vec![
                TimeSlot::new("t0", 1, 1, 1, 1),
                TimeSlot::new("t1", 2, 2, 1, 1),
            ],
            vec![
                Strategy::new("s0", 1, 0),
                Strategy::new("s1", 2, 0),
                Strategy::new("s2", 3, 0),
            ],
        );
        ModelBuilder::new(&repository)
            .error_threshold(1)
            .build()
            .expect("model should build")
    }

    #[test]
    fn test_branches_on_first_open_slot_in_reverse_strategy_order() {
        let model = build_model();
        let state = SearchState::from_model(&model);
        let mut builder = ChronologicalBuilder::new();

        let decisions: Vec<_> = builder.next_decision(&model, &state).collect();
        let strategies: Vec<usize> = decisions.iter().map(|d| d.strategy_index().get()).collect();
        assert_eq!(strategies, vec![2, 1, 0]);
        assert!(decisions.iter().all(|d| d.slot_index() == SlotIndex::new(0)));
        assert_eq!(decisions[2].cost_delta(), 1);
    }

    #[test]
    fn test_moves_to_next_slot_and_stops_when_complete() {
        let model = build_model();
        let mut state = SearchState::from_model(&model);
        let mut builder = ChronologicalBuilder::new();

        state.assign_slot(SlotIndex::new(0), StrategyIndex::new(1));
        {
            let mut iter = builder.next_decision(&model, &state);
            assert_eq!(iter.len(), 3);
            let first = iter.next().expect("three decisions expected");
            assert_eq!(first.slot_index(), SlotIndex::new(1));
            assert_eq!(first.cost_delta(), 2 * 3);
        }

        state.assign_slot(SlotIndex::new(1), StrategyIndex::new(0));
        let mut iter = builder.next_decision(&model, &state);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }
}
