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

//! In-memory records of one simulated day.
//!
//! A `Repository` owns the time slots and the strategy catalogue in input
//! row order: row `i` of a table is index `i` of its collection. Nothing is
//! validated beyond what the loader already checked; callers are expected to
//! supply sane figures.

use crate::index::{SlotIndex, StrategyIndex};

/// A fixed-duration interval of a simulated day.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    /// Free-form label, usually the slot start timestamp.
    pub label: String,
    /// Observed carbon intensity.
    pub carbon_actual: i64,
    /// Forecast carbon intensity, used by the optimizer.
    pub carbon_forecast: i64,
    /// Observed number of requests.
    pub requests_actual: i64,
    /// Forecast number of requests, used by the optimizer.
    pub requests_forecast: i64,
}

impl TimeSlot {
    /// Creates a new time slot record.
    #[inline]
    pub fn new<L>(
        label: L,
        carbon_actual: i64,
        carbon_forecast: i64,
        requests_actual: i64,
        requests_forecast: i64,
    ) -> Self
    where
        L: Into<String>,
    {
        Self {
            label: label.into(),
            carbon_actual,
            carbon_forecast,
            requests_actual,
            requests_forecast,
        }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TimeSlot({}, carbon: {}/{}, requests: {}/{})",
            self.label,
            self.carbon_actual,
            self.carbon_forecast,
            self.requests_actual,
            self.requests_forecast
        )
    }
}

/// A named execution policy with an observed latency and forecasting error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Strategy {
    /// Strategy name as written to the output table.
    pub name: String,
    /// Elapsed time in milliseconds, rounded.
    pub elapsed_time: i64,
    /// Error percentage scaled by 100 (`5.25%` is stored as `525`).
    pub error: i64,
}

impl Strategy {
    /// Creates a new strategy record.
    #[inline]
    pub fn new<N>(name: N, elapsed_time: i64, error: i64) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            elapsed_time,
            error,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Strategy({}, elapsed: {}ms, error: {}.{:02}%)",
            self.name,
            self.elapsed_time,
            self.error / 100,
            (self.error % 100).abs()
        )
    }
}

/// The immutable time slots and strategies of one simulated day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Repository {
    slots: Vec<TimeSlot>,
    strategies: Vec<Strategy>,
}

impl Repository {
    /// Creates a repository, keeping the given order as index order.
    #[inline]
    pub fn new(slots: Vec<TimeSlot>, strategies: Vec<Strategy>) -> Self {
        Self { slots, strategies }
    }

    /// Returns the number of time slots.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of strategies.
    #[inline]
    pub fn num_strategies(&self) -> usize {
        self.strategies.len()
    }

    /// Returns all time slots in index order.
    #[inline]
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Returns all strategies in index order.
    #[inline]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Returns the time slot at `slot_index`.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds `0..num_slots()`.
    #[inline]
    pub fn slot(&self, slot_index: SlotIndex) -> &TimeSlot {
        let index = slot_index.get();
        assert!(
            index < self.slots.len(),
            "called `Repository::slot` with slot index out of bounds: the len is {} but the index is {}",
            self.slots.len(),
            index
        );

        &self.slots[index]
    }

    /// Returns the strategy at `strategy_index`.
    ///
    /// # Panics
    ///
    /// Panics if `strategy_index` is out of bounds `0..num_strategies()`.
    #[inline]
    pub fn strategy(&self, strategy_index: StrategyIndex) -> &Strategy {
        let index = strategy_index.get();
        assert!(
            index < self.strategies.len(),
            "called `Repository::strategy` with strategy index out of bounds: the len is {} but the index is {}",
            self.strategies.len(),
            index
        );

        &self.strategies[index]
    }

    /// Returns the sum of forecast requests over all slots, saturating.
    #[inline]
    pub fn total_forecast_requests(&self) -> i64 {
        self.slots
            .iter()
            .fold(0i64, |acc, slot| acc.saturating_add(slot.requests_forecast))
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repository(slots: {}, strategies: {})",
            self.num_slots(),
            self.num_strategies()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> Repository {
        Repository::new(
            vec![
                TimeSlot::new("00:00", 110, 100, 9, 10),
                TimeSlot::new("00:30", 190, 200, 6, 5),
            ],
            vec![Strategy::new("nop", 10, 500), Strategy::new("avg", 20, 0)],
        )
    }

    #[test]
    fn test_accessors_preserve_order() {
        let repo = repository();
        assert_eq!(repo.num_slots(), 2);
        assert_eq!(repo.num_strategies(), 2);
        assert_eq!(repo.slot(SlotIndex::new(1)).label, "00:30");
        assert_eq!(repo.strategy(StrategyIndex::new(0)).name, "nop");
        assert_eq!(repo.total_forecast_requests(), 15);
    }

    #[test]
    #[should_panic(expected = "called `Repository::slot` with slot index out of bounds")]
    fn test_slot_out_of_bounds_panics() {
        let repo = repository();
        let _ = repo.slot(SlotIndex::new(2));
    }

    #[test]
    fn test_display() {
        let repo = repository();
        assert_eq!(format!("{}", repo), "Repository(slots: 2, strategies: 2)");
        assert_eq!(
            format!("{}", repo.strategy(StrategyIndex::new(0))),
            "Strategy(nop, elapsed: 10ms, error: 5.00%)"
        );
    }

    #[test]
    fn test_empty_repository_has_zero_requests() {
        let repo = Repository::default();
        assert_eq!(repo.num_slots(), 0);
        assert_eq!(repo.total_forecast_requests(), 0);
    }
}
