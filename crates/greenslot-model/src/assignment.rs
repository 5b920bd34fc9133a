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

use crate::index::{SlotIndex, StrategyIndex};
use num_traits::{PrimInt, Signed};

/// One strategy per time slot, together with the objective it achieves.
///
/// `strategies[t]` is the strategy chosen for slot `t`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Assignment<T> {
    /// The forecast emissions of this assignment.
    objective_value: T,

    /// The chosen strategy for each slot.
    strategies: Vec<StrategyIndex>,
}

impl<T> Assignment<T>
where
    T: PrimInt + Signed,
{
    /// Constructs a new `Assignment`.
    #[inline]
    pub fn new(objective_value: T, strategies: Vec<StrategyIndex>) -> Self {
        Self {
            objective_value,
            strategies,
        }
    }

    /// Returns the strategy chosen for `slot_index`.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds.
    #[inline]
    pub fn strategy_for_slot(&self, slot_index: SlotIndex) -> StrategyIndex {
        let index = slot_index.get();
        assert!(
            index < self.num_slots(),
            "called `Assignment::strategy_for_slot` with slot index out of bounds: the len is {} but the index is {}",
            self.num_slots(),
            index
        );

        self.strategies[index]
    }

    /// Returns the number of slots covered.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.strategies.len()
    }

    /// Returns the objective value.
    #[inline]
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    /// Returns the chosen strategies in slot order.
    #[inline]
    pub fn strategies(&self) -> &[StrategyIndex] {
        &self.strategies
    }

    /// Consumes the assignment and returns the strategy vector.
    #[inline]
    pub fn into_strategies(self) -> Vec<StrategyIndex> {
        self.strategies
    }
}

impl<T> std::fmt::Display for Assignment<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Assignment Summary")?;
        writeln!(f, "   Objective Value: {}", self.objective_value)?;
        writeln!(f)?;

        if self.strategies.is_empty() {
            writeln!(f, "   (No slots assigned)")?;
            return Ok(());
        }

        writeln!(f, "   {:<10} | {:<10}", "Slot", "Strategy")?;
        writeln!(f, "   {:-<10}-+-{:-<10}", "", "")?;
        for (t, strategy) in self.strategies.iter().enumerate() {
            writeln!(f, "   {:<10} | {:<10}", t, strategy.get())?;
        }

        Ok(())
    }
}
