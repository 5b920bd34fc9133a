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

//! Scoring of complete assignments.
//!
//! All scores are computed from forecast figures, which are the figures the
//! optimizer minimizes over. Error values are stored as percentages scaled by
//! 100, so a stored `500` means 5%.

use crate::{
    index::{SlotIndex, StrategyIndex},
    repository::Repository,
};

/// Number of decimals `average_error` is rounded to.
pub const AVERAGE_ERROR_DECIMALS: i32 = 5;

/// Scale of stored error values relative to a percentage.
pub const ERROR_SCALE: i64 = 100;

/// Returns the forecast emissions of running `strategy` in `slot`.
///
/// This is `carbon_forecast * requests_forecast * elapsed_time`, saturating.
///
/// # Panics
///
/// Panics if either index is out of bounds.
#[inline]
pub fn slot_emissions(repository: &Repository, slot: SlotIndex, strategy: StrategyIndex) -> i64 {
    let time_slot = repository.slot(slot);
    let strategy = repository.strategy(strategy);
    time_slot
        .carbon_forecast
        .saturating_mul(time_slot.requests_forecast)
        .saturating_mul(strategy.elapsed_time)
}

/// Returns the total forecast emissions of an assignment.
///
/// `strategies[t]` is the strategy chosen for slot `t`.
///
/// # Panics
///
/// Panics if `strategies` does not have one entry per slot of `repository`,
/// or if any entry is out of bounds.
pub fn emissions(repository: &Repository, strategies: &[StrategyIndex]) -> i64 {
    assert_complete(repository, strategies);

    strategies
        .iter()
        .enumerate()
        .fold(0i64, |acc, (t, &s)| {
            acc.saturating_add(slot_emissions(repository, SlotIndex::new(t), s))
        })
}

/// Returns `Σ requests_forecast[t] * error[strategies[t]]`, saturating.
///
/// This is the left side of the quality constraint, in the scaled encoding.
///
/// # Panics
///
/// Panics under the same conditions as [`emissions`].
pub fn weighted_error(repository: &Repository, strategies: &[StrategyIndex]) -> i64 {
    assert_complete(repository, strategies);

    strategies
        .iter()
        .zip(repository.slots())
        .fold(0i64, |acc, (&s, slot)| {
            acc.saturating_add(slot.requests_forecast.saturating_mul(repository.strategy(s).error))
        })
}

/// Returns the request-weighted mean error of an assignment as a fraction.
///
/// A mean error of 5% is returned as `0.05`. The value is rounded to
/// [`AVERAGE_ERROR_DECIMALS`] decimals, half to even. If the day carries no
/// forecast requests at all the mean is defined as `0.0`.
///
/// # Panics
///
/// Panics under the same conditions as [`emissions`].
pub fn average_error(repository: &Repository, strategies: &[StrategyIndex]) -> f64 {
    let percent = mean_error_percent(repository, strategies);
    round_decimals(percent / 100.0, AVERAGE_ERROR_DECIMALS)
}

/// Returns the request-weighted mean error of an assignment in percent.
///
/// A mean error of 5% is returned as `5.0`, rounded to
/// [`AVERAGE_ERROR_DECIMALS`] decimals.
///
/// # Panics
///
/// Panics under the same conditions as [`emissions`].
pub fn average_error_percent(repository: &Repository, strategies: &[StrategyIndex]) -> f64 {
    round_decimals(
        mean_error_percent(repository, strategies),
        AVERAGE_ERROR_DECIMALS,
    )
}

fn mean_error_percent(repository: &Repository, strategies: &[StrategyIndex]) -> f64 {
    let weighted = weighted_error(repository, strategies);
    let total = repository.total_forecast_requests();
    if total == 0 {
        return 0.0;
    }
    weighted as f64 / (total as f64 * ERROR_SCALE as f64)
}

#[inline]
fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[inline]
fn assert_complete(repository: &Repository, strategies: &[StrategyIndex]) {
    assert_eq!(
        strategies.len(),
        repository.num_slots(),
        "assignment covers {} slots but the repository has {}",
        strategies.len(),
        repository.num_slots()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Strategy, TimeSlot};

    fn two_slot_day() -> Repository {
        Repository::new(
            vec![
                TimeSlot::new("t0", 90, 100, 12, 10),
                TimeSlot::new("t1", 210, 200, 4, 5),
            ],
            vec![Strategy::new("nop", 10, 500), Strategy::new("full", 20, 0)],
        )
    }

    fn indices(raw: &[usize]) -> Vec<StrategyIndex> {
        raw.iter().copied().map(StrategyIndex::new).collect()
    }

    #[test]
    fn test_emissions_use_forecast_figures() {
        let repo = two_slot_day();
        assert_eq!(emissions(&repo, &indices(&[0, 0])), 20_000);
        assert_eq!(emissions(&repo, &indices(&[1, 1])), 40_000);
        assert_eq!(emissions(&repo, &indices(&[0, 1])), 10_000 + 20_000);
    }

    #[test]
    fn test_slot_emissions() {
        let repo = two_slot_day();
        let e = slot_emissions(&repo, SlotIndex::new(1), StrategyIndex::new(1));
        assert_eq!(e, 200 * 5 * 20);
    }

    #[test]
    fn test_average_error_is_a_fraction() {
        let repo = two_slot_day();
        assert_eq!(weighted_error(&repo, &indices(&[0, 0])), 7_500);
        assert_eq!(average_error(&repo, &indices(&[0, 0])), 0.05);
        assert_eq!(average_error_percent(&repo, &indices(&[0, 0])), 5.0);
        assert_eq!(average_error(&repo, &indices(&[1, 1])), 0.0);
    }

    #[test]
    fn test_average_error_is_rounded_to_five_decimals() {
        let repo = Repository::new(
            vec![
                TimeSlot::new("t0", 1, 1, 1, 1),
                TimeSlot::new("t1", 1, 1, 1, 1),
                TimeSlot::new("t2", 1, 1, 1, 1),
            ],
            vec![Strategy::new("a", 1, 100), Strategy::new("b", 1, 0)],
        );
        // 1% over a third of the requests.
        let value = average_error(&repo, &indices(&[0, 1, 1]));
        assert_eq!(value, 0.00333);
    }

    #[test]
    fn test_zero_requests_yield_zero_error() {
        let repo = Repository::new(
            vec![TimeSlot::new("t0", 100, 100, 0, 0)],
            vec![Strategy::new("nop", 10, 500)],
        );
        assert_eq!(average_error(&repo, &indices(&[0])), 0.0);
        assert_eq!(average_error_percent(&repo, &indices(&[0])), 0.0);
    }

    #[test]
    fn test_empty_day_scores_zero() {
        let repo = Repository::new(vec![], vec![Strategy::new("nop", 10, 500)]);
        assert_eq!(emissions(&repo, &[]), 0);
        assert_eq!(average_error(&repo, &[]), 0.0);
    }

    #[test]
    fn test_emissions_saturate() {
        let repo = Repository::new(
            vec![TimeSlot::new("t0", 1, i64::MAX, 1, 2)],
            vec![Strategy::new("slow", 3, 0)],
        );
        assert_eq!(emissions(&repo, &indices(&[0])), i64::MAX);
    }

    #[test]
    #[should_panic(expected = "assignment covers 1 slots but the repository has 2")]
    fn test_incomplete_assignment_panics() {
        let repo = two_slot_day();
        emissions(&repo, &indices(&[0]));
    }
}
