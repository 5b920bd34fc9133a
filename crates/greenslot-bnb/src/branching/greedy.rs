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
use smallvec::SmallVec;
use std::iter::FusedIterator;

/// Candidate wrapper ordering decisions by emissions, then error weight,
/// then strategy index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GreedyCandidate<T> {
    decision: Decision<T>,
}

impl<T> PartialOrd for GreedyCandidate<T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for GreedyCandidate<T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.decision
            .cost_delta()
            .cmp(&other.decision.cost_delta())
            .then_with(|| self.decision.error_delta().cmp(&other.decision.error_delta()))
            .then_with(|| {
                self.decision
                    .strategy_index()
                    .cmp(&other.decision.strategy_index())
            })
    }
}

/// A decision builder that steers the search towards low emissions early.
///
/// 1. Slots are branched on in order of decreasing emission spread (the gap
///    between their most and least expensive strategy), so the choices that
///    matter most are fixed near the root. Ties keep slot index order.
/// 2. Within a slot, the cheapest strategy is explored first, with lower error
///    weight and then lower index breaking ties.
///
/// A cheap first incumbent lets the bound prune most of the tree.
#[derive(Debug, Clone, Default)]
pub struct GreedyEmissionsBuilder<T> {
    slot_order: Vec<SlotIndex>,
    candidates: SmallVec<[GreedyCandidate<T>; 16]>,
}

impl<T> GreedyEmissionsBuilder<T> {
    /// Creates a new `GreedyEmissionsBuilder` with empty buffers.
    #[inline]
    pub fn new() -> Self {
        Self {
            slot_order: Vec::new(),
            candidates: SmallVec::new(),
        }
    }

    /// Returns the slot order computed for the last model, outermost first.
    #[inline]
    pub fn slot_order(&self) -> &[SlotIndex] {
        &self.slot_order
    }
}

impl<T> GreedyEmissionsBuilder<T>
where
    T: PrimInt + Signed,
{
    fn compute_slot_order(&mut self, model: &Model<T>) {
        let mut spreads: Vec<(T, SlotIndex)> = SlotIndex::range(model.num_slots())
            .map(|slot_index| {
                let emissions = model.slot_emissions(slot_index);
                let max = emissions.iter().copied().max().unwrap_or_else(T::zero);
                (max - model.slot_min_emission(slot_index), slot_index)
            })
            .collect();

        spreads.sort_by(|(spread_a, slot_a), (spread_b, slot_b)| {
            spread_b.cmp(spread_a).then_with(|| slot_a.cmp(slot_b))
        });

        self.slot_order.clear();
        self.slot_order
            .extend(spreads.into_iter().map(|(_, slot_index)| slot_index));
    }
}

impl<T> DecisionBuilder<T> for GreedyEmissionsBuilder<T>
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>
        = GreedyEmissionsIter<'a, T>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "GreedyEmissionsBuilder"
    }

    fn initialize(&mut self, model: &Model<T>) {
        self.compute_slot_order(model);
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        if self.slot_order.len() != model.num_slots() {
            self.compute_slot_order(model);
        }

        self.candidates.clear();

        // Every node of depth `d` has exactly the first `d` slots of the order assigned.
        if let Some(&slot_index) = self.slot_order.get(state.num_assigned_slots()) {
            debug_assert!(
                !state.is_slot_assigned(slot_index),
                "called `GreedyEmissionsBuilder::next_decision` on a state that was not built in slot order"
            );

            for strategy_index in StrategyIndex::range(model.num_strategies()) {
                let decision = unsafe { Decision::new_unchecked(model, slot_index, strategy_index) };
                self.candidates.push(GreedyCandidate { decision });
            }
            self.candidates.sort_unstable();
        }

        GreedyEmissionsIter {
            iter: self.candidates.iter().rev(),
        }
    }
}

/// Yields the buffered decisions from the most expensive to the cheapest, so
/// the cheapest ends up on top of the search stack.
pub struct GreedyEmissionsIter<'a, T> {
    iter: std::iter::Rev<std::slice::Iter<'a, GreedyCandidate<T>>>,
}

impl<'a, T> Iterator for GreedyEmissionsIter<'a, T>
where
    T: Copy,
{
    type Item = Decision<T>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|candidate| candidate.decision)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, T> FusedIterator for GreedyEmissionsIter<'a, T> where T: Copy {}

#[cfg(test)]
mod tests {
    use super::*;
    use greenslot_model::{
        model::ModelBuilder,
        repository::{Repository, Strategy, TimeSlot},
    };

    // Emission = carbon * requests * elapsed.
    // t0: spread 10 * (3 - 1) = 20
    // t1: spread 50 * (3 - 1) = 100
    // t2: spread 20 * (3 - 1) = 40
    fn build_model() -> Model<i64> {
        let repository = Repository::new(
            vec![
                TimeSlot::new("t0", 10, 10, 1, 1),
                TimeSlot::new("t1", 50, 50, 1, 1),
                TimeSlot::new("t2", 20, 20, 1, 1),
            ],
            vec![
                Strategy::new("slow", 3, 0),
                Strategy::new("fast", 1, 200),
                Strategy::new("fast-precise", 1, 100),
            ],
        );
        ModelBuilder::new(&repository)
            .error_threshold(10)
            .build()
            .expect("model should build")
    }

    #[test]
    fn test_slot_order_follows_emission_spread() {
        let model = build_model();
        let mut builder = GreedyEmissionsBuilder::new();
        builder.initialize(&model);
        assert_eq!(
            builder.slot_order(),
            &[SlotIndex::new(1), SlotIndex::new(2), SlotIndex::new(0)]
        );
    }

    #[test]
    fn test_cheapest_strategy_is_yielded_last() {
        let model = build_model();
        let state = SearchState::from_model(&model);
        let mut builder = GreedyEmissionsBuilder::new();
        builder.initialize(&model);

        let decisions: Vec<_> = builder.next_decision(&model, &state).collect();
        assert!(decisions.iter().all(|d| d.slot_index() == SlotIndex::new(1)));

        // "fast" and "fast-precise" cost the same; the lower error weight wins.
        let strategies: Vec<usize> = decisions.iter().map(|d| d.strategy_index().get()).collect();
        assert_eq!(strategies, vec![0, 1, 2]);
    }

    #[test]
    fn test_follows_slot_order_with_depth() {
        let model = build_model();
        let mut state = SearchState::from_model(&model);
        let mut builder = GreedyEmissionsBuilder::new();

        state.assign_slot(SlotIndex::new(1), StrategyIndex::new(2));
        let first = builder
            .next_decision(&model, &state)
            .next()
            .expect("slot 2 has decisions");
        assert_eq!(first.slot_index(), SlotIndex::new(2));

        state.assign_slot(SlotIndex::new(2), StrategyIndex::new(2));
        state.assign_slot(SlotIndex::new(0), StrategyIndex::new(2));
        assert_eq!(builder.next_decision(&model, &state).count(), 0);
    }
}
