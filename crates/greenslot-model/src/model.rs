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

//! The optimization model handed to solving backends.
//!
//! A `Model` is the integral, solver-facing view of one day: for every
//! (slot, strategy) pair it stores the emission coefficient
//! `carbon_forecast * requests_forecast * elapsed_time` and the error weight
//! `requests_forecast * error`, together with the error capacity
//! `Σ requests_forecast * threshold * 100` that bounds the summed weights.
//! Coefficient tables are flattened slot-major.
//!
//! The builder never decides feasibility. It only refuses models whose
//! numbers do not fit the chosen integer type, which lets backends use plain
//! arithmetic during search.

use crate::{
    index::{SlotIndex, StrategyIndex},
    repository::Repository,
};
use num_traits::{FromPrimitive, PrimInt, Signed};
use thiserror::Error;

#[inline(always)]
fn flatten_index(num_strategies: usize, slot_index: SlotIndex, strategy_index: StrategyIndex) -> usize {
    slot_index.get() * num_strategies + strategy_index.get()
}

/// The size of the search tree of an assignment problem, in log space.
///
/// A complete tree over `T` slots with `S` strategies each has
/// `1 + S + S^2 + ... + S^T` nodes. For realistic days this overflows every
/// primitive type, so the value is kept as a base-10 logarithm.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Complexity {
    log_val: f64,
}

impl Complexity {
    /// Calculates the complexity for a given number of slots and strategies.
    pub fn new(num_slots: usize, num_strategies: usize) -> Self {
        if num_slots == 0 || num_strategies == 0 {
            return Complexity { log_val: 0.0 };
        }

        let s_log = (num_strategies as f64).log10();

        // log10(10^a + 10^b)
        let log10_add = |a: f64, b: f64| -> f64 {
            let max = a.max(b);
            let min = a.min(b);
            max + (1.0 + 10.0_f64.powf(min - max)).log10()
        };

        let mut level_log = 0.0;
        let mut total_log = 0.0;
        for _ in 0..num_slots {
            level_log += s_log;
            total_log = log10_add(total_log, level_log);
        }

        Complexity { log_val: total_log }
    }

    /// Returns the percentage of the tree covered by `nodes_explored` nodes.
    ///
    /// Trees larger than `10^15` nodes report `0.0`.
    pub fn coverage(&self, nodes_explored: u64) -> f64 {
        if self.log_val > 15.0 {
            return 0.0;
        }
        let total = 10.0_f64.powf(self.log_val);
        (nodes_explored as f64 / total) * 100.0
    }

    /// Returns the order of magnitude.
    #[inline]
    pub fn exponent(&self) -> u64 {
        self.log_val.floor() as u64
    }

    /// Returns the coefficient in front of the power of ten.
    #[inline]
    pub fn mantissa(&self) -> f64 {
        10.0_f64.powf(self.log_val - self.log_val.floor())
    }

    /// Returns the raw base-10 logarithm.
    #[inline]
    pub fn raw(&self) -> f64 {
        self.log_val
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} × 10^{}", self.mantissa(), self.exponent())
    }
}

impl std::fmt::Debug for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Complexity(log10={:.4})", self.log_val)
    }
}

/// The quantity that did not fit the model's integer type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// A single (slot, strategy) emission coefficient.
    Emission,
    /// A single (slot, strategy) error weight.
    ErrorWeight,
    /// The error capacity of the quality constraint.
    ErrorCapacity,
    /// The largest objective value any assignment could reach.
    ObjectiveRange,
    /// The largest error weight sum any assignment could reach.
    ErrorRange,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quantity::Emission => "emission coefficient",
            Quantity::ErrorWeight => "error weight",
            Quantity::ErrorCapacity => "error capacity",
            Quantity::ObjectiveRange => "objective range",
            Quantity::ErrorRange => "error weight range",
        };
        f.write_str(name)
    }
}

/// The error type for model construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelBuildError {
    #[error("{quantity} does not fit the numeric type{}", location(.slot, .strategy))]
    CoefficientOverflow {
        quantity: Quantity,
        slot: Option<SlotIndex>,
        strategy: Option<StrategyIndex>,
    },
}

fn location(slot: &Option<SlotIndex>, strategy: &Option<StrategyIndex>) -> String {
    match (slot, strategy) {
        (Some(t), Some(s)) => format!(" (slot {}, strategy {})", t.get(), s.get()),
        (Some(t), None) => format!(" (slot {})", t.get()),
        _ => String::new(),
    }
}

pub type ModelBuildResult<T> = Result<T, ModelBuildError>;

/// The immutable assignment model.
///
/// - `emissions[slot * num_strategies + strategy]`: emission coefficient of the pair.
/// - `error_weights[slot * num_strategies + strategy]`: error weight of the pair.
/// - `slot_min_emissions[slot]`, `slot_min_error_weights[slot]`: per-slot minima
///   used by lower bounds and feasibility look-ahead. Without strategies these are zero.
///
/// Construction goes through `ModelBuilder`.
#[derive(Clone)]
pub struct Model<T>
where
    T: PrimInt + Signed,
{
    num_slots: usize,
    num_strategies: usize,
    error_threshold: u32,
    error_capacity: T,
    emissions: Vec<T>,              // len = num_slots * num_strategies
    error_weights: Vec<T>,          // len = num_slots * num_strategies
    slot_min_emissions: Vec<T>,     // len = num_slots
    slot_min_error_weights: Vec<T>, // len = num_slots
}

impl<T> Model<T>
where
    T: PrimInt + Signed,
{
    /// Returns the number of time slots.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Returns the number of strategies available in every slot.
    #[inline]
    pub fn num_strategies(&self) -> usize {
        self.num_strategies
    }

    /// Returns the error threshold in percent the model was built for.
    #[inline]
    pub fn error_threshold(&self) -> u32 {
        self.error_threshold
    }

    /// Returns the upper bound on the summed error weights.
    #[inline]
    pub fn error_capacity(&self) -> T {
        self.error_capacity
    }

    /// Returns the size of the search tree.
    #[inline]
    pub fn complexity(&self) -> Complexity {
        Complexity::new(self.num_slots, self.num_strategies)
    }

    /// Returns all emission coefficients, slot-major.
    #[inline]
    pub fn emissions(&self) -> &[T] {
        &self.emissions
    }

    /// Returns all error weights, slot-major.
    #[inline]
    pub fn error_weights(&self) -> &[T] {
        &self.error_weights
    }

    /// Returns the per-slot minimum emission coefficients.
    #[inline]
    pub fn slot_min_emissions(&self) -> &[T] {
        &self.slot_min_emissions
    }

    /// Returns the per-slot minimum error weights.
    #[inline]
    pub fn slot_min_error_weights(&self) -> &[T] {
        &self.slot_min_error_weights
    }

    /// Returns the emission coefficient of running `strategy_index` in `slot_index`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn emission(&self, slot_index: SlotIndex, strategy_index: StrategyIndex) -> T {
        self.check_pair("Model::emission", slot_index, strategy_index);
        self.emissions[flatten_index(self.num_strategies, slot_index, strategy_index)]
    }

    /// Returns the emission coefficient without bounds checking.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `slot_index` is in `0..num_slots()` and
    /// `strategy_index` is in `0..num_strategies()`.
    #[inline]
    pub unsafe fn emission_unchecked(&self, slot_index: SlotIndex, strategy_index: StrategyIndex) -> T {
        debug_assert!(slot_index.get() < self.num_slots);
        debug_assert!(strategy_index.get() < self.num_strategies);

        let index = flatten_index(self.num_strategies, slot_index, strategy_index);
        unsafe { *self.emissions.get_unchecked(index) }
    }

    /// Returns the error weight of running `strategy_index` in `slot_index`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn error_weight(&self, slot_index: SlotIndex, strategy_index: StrategyIndex) -> T {
        self.check_pair("Model::error_weight", slot_index, strategy_index);
        self.error_weights[flatten_index(self.num_strategies, slot_index, strategy_index)]
    }

    /// Returns the error weight without bounds checking.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `slot_index` is in `0..num_slots()` and
    /// `strategy_index` is in `0..num_strategies()`.
    #[inline]
    pub unsafe fn error_weight_unchecked(
        &self,
        slot_index: SlotIndex,
        strategy_index: StrategyIndex,
    ) -> T {
        debug_assert!(slot_index.get() < self.num_slots);
        debug_assert!(strategy_index.get() < self.num_strategies);

        let index = flatten_index(self.num_strategies, slot_index, strategy_index);
        unsafe { *self.error_weights.get_unchecked(index) }
    }

    /// Returns the emission coefficients of every strategy in `slot_index`.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds.
    #[inline]
    pub fn slot_emissions(&self, slot_index: SlotIndex) -> &[T] {
        let start = self.row_start("Model::slot_emissions", slot_index);
        &self.emissions[start..start + self.num_strategies]
    }

    /// Returns the error weights of every strategy in `slot_index`.
    ///
    /// # Panics
    ///
    /// Panics if `slot_index` is out of bounds.
    #[inline]
    pub fn slot_error_weights(&self, slot_index: SlotIndex) -> &[T] {
        let start = self.row_start("Model::slot_error_weights", slot_index);
        &self.error_weights[start..start + self.num_strategies]
    }

    /// Returns the cheapest emission coefficient of `slot_index`.
    #[inline]
    pub fn slot_min_emission(&self, slot_index: SlotIndex) -> T {
        self.slot_min_emissions[slot_index.get()]
    }

    /// Returns the smallest error weight of `slot_index`.
    #[inline]
    pub fn slot_min_error_weight(&self, slot_index: SlotIndex) -> T {
        self.slot_min_error_weights[slot_index.get()]
    }

    /// Returns the objective value of a complete assignment.
    ///
    /// # Panics
    ///
    /// Panics if `strategies` does not have one in-bounds entry per slot.
    pub fn objective_for(&self, strategies: &[StrategyIndex]) -> T {
        self.sum_for("Model::objective_for", strategies, &self.emissions)
    }

    /// Returns the summed error weight of a complete assignment.
    ///
    /// # Panics
    ///
    /// Panics if `strategies` does not have one in-bounds entry per slot.
    pub fn error_weight_for(&self, strategies: &[StrategyIndex]) -> T {
        self.sum_for("Model::error_weight_for", strategies, &self.error_weights)
    }

    /// Returns `true` if a complete assignment respects the error capacity.
    #[inline]
    pub fn is_within_capacity(&self, strategies: &[StrategyIndex]) -> bool {
        self.error_weight_for(strategies) <= self.error_capacity
    }

    // Sums stay in range: the builder checked the absolute worst case.
    fn sum_for(&self, caller: &str, strategies: &[StrategyIndex], table: &[T]) -> T {
        assert_eq!(
            strategies.len(),
            self.num_slots,
            "called `{}` with an assignment of {} slots on a model of {}",
            caller,
            strategies.len(),
            self.num_slots
        );
        strategies
            .iter()
            .enumerate()
            .fold(T::zero(), |acc, (t, &strategy_index)| {
                self.check_pair(caller, SlotIndex::new(t), strategy_index);
                acc + table[flatten_index(self.num_strategies, SlotIndex::new(t), strategy_index)]
            })
    }

    #[inline]
    fn row_start(&self, caller: &str, slot_index: SlotIndex) -> usize {
        assert!(
            slot_index.get() < self.num_slots,
            "called `{}` with slot index out of bounds: the len is {} but the index is {}",
            caller,
            self.num_slots,
            slot_index.get()
        );
        slot_index.get() * self.num_strategies
    }

    #[inline]
    fn check_pair(&self, caller: &str, slot_index: SlotIndex, strategy_index: StrategyIndex) {
        assert!(
            slot_index.get() < self.num_slots,
            "called `{}` with slot index out of bounds: the len is {} but the index is {}",
            caller,
            self.num_slots,
            slot_index.get()
        );
        assert!(
            strategy_index.get() < self.num_strategies,
            "called `{}` with strategy index out of bounds: the len is {} but the index is {}",
            caller,
            self.num_strategies,
            strategy_index.get()
        );
    }
}

impl<T> std::fmt::Debug for Model<T>
where
    T: PrimInt + Signed + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("num_slots", &self.num_slots)
            .field("num_strategies", &self.num_strategies)
            .field("error_threshold", &self.error_threshold)
            .field("error_capacity", &self.error_capacity)
            .field("emissions", &self.emissions)
            .field("error_weights", &self.error_weights)
            .finish()
    }
}

impl<T> std::fmt::Display for Model<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model(num_slots: {}, num_strategies: {}, error_threshold: {}%, error_capacity: {})",
            self.num_slots, self.num_strategies, self.error_threshold, self.error_capacity
        )
    }
}

/// Builds a `Model` from a `Repository` and an error threshold.
#[derive(Clone, Copy)]
pub struct ModelBuilder<'a> {
    repository: &'a Repository,
    error_threshold: u32,
}

impl<'a> ModelBuilder<'a> {
    /// Creates a builder with an error threshold of `0`.
    #[inline]
    pub fn new(repository: &'a Repository) -> Self {
        Self {
            repository,
            error_threshold: 0,
        }
    }

    /// Sets the maximum request-weighted average error, in percent.
    #[inline]
    pub fn error_threshold(mut self, threshold_percent: u32) -> Self {
        self.error_threshold = threshold_percent;
        self
    }

    /// Builds the model in integer type `T`.
    ///
    /// Fails with `ModelBuildError::CoefficientOverflow` if any coefficient,
    /// the capacity, or the range of reachable objective or error sums does
    /// not fit `T`.
    pub fn build<T>(&self) -> ModelBuildResult<Model<T>>
    where
        T: PrimInt + Signed + FromPrimitive,
    {
        let repo = self.repository;
        let num_slots = repo.num_slots();
        let num_strategies = repo.num_strategies();

        let mut emissions = Vec::with_capacity(num_slots * num_strategies);
        let mut error_weights = Vec::with_capacity(num_slots * num_strategies);
        let mut slot_min_emissions = Vec::with_capacity(num_slots);
        let mut slot_min_error_weights = Vec::with_capacity(num_slots);

        let mut objective_range = T::zero();
        let mut error_range = T::zero();
        let mut capacity: i64 = 0;
        let scaled_threshold = i64::from(self.error_threshold) * 100;

        for slot_index in SlotIndex::range(num_slots) {
            let slot = repo.slot(slot_index);
            let slot_demand = slot.carbon_forecast.checked_mul(slot.requests_forecast);

            let mut min_emission: Option<T> = None;
            let mut min_weight: Option<T> = None;
            let mut max_abs_emission = T::zero();
            let mut max_abs_weight = T::zero();

            for strategy_index in StrategyIndex::range(num_strategies) {
                let strategy = repo.strategy(strategy_index);
                let overflow = |quantity| ModelBuildError::CoefficientOverflow {
                    quantity,
                    slot: Some(slot_index),
                    strategy: Some(strategy_index),
                };

                let emission = slot_demand
                    .and_then(|d| d.checked_mul(strategy.elapsed_time))
                    .and_then(T::from_i64)
                    .ok_or_else(|| overflow(Quantity::Emission))?;
                let weight = slot
                    .requests_forecast
                    .checked_mul(strategy.error)
                    .and_then(T::from_i64)
                    .ok_or_else(|| overflow(Quantity::ErrorWeight))?;

                min_emission = Some(min_emission.map_or(emission, |m| m.min(emission)));
                min_weight = Some(min_weight.map_or(weight, |m| m.min(weight)));
                // `abs` of `T::min_value()` overflows; it can never fit a range anyway.
                let abs_emission = checked_abs(emission).ok_or_else(|| overflow(Quantity::ObjectiveRange))?;
                let abs_weight = checked_abs(weight).ok_or_else(|| overflow(Quantity::ErrorRange))?;
                max_abs_emission = max_abs_emission.max(abs_emission);
                max_abs_weight = max_abs_weight.max(abs_weight);

                emissions.push(emission);
                error_weights.push(weight);
            }

            let range_overflow = |quantity| ModelBuildError::CoefficientOverflow {
                quantity,
                slot: Some(slot_index),
                strategy: None,
            };
            objective_range = objective_range
                .checked_add(&max_abs_emission)
                .ok_or_else(|| range_overflow(Quantity::ObjectiveRange))?;
            error_range = error_range
                .checked_add(&max_abs_weight)
                .ok_or_else(|| range_overflow(Quantity::ErrorRange))?;
            capacity = slot
                .requests_forecast
                .checked_mul(scaled_threshold)
                .and_then(|c| capacity.checked_add(c))
                .ok_or_else(|| range_overflow(Quantity::ErrorCapacity))?;

            slot_min_emissions.push(min_emission.unwrap_or_else(T::zero));
            slot_min_error_weights.push(min_weight.unwrap_or_else(T::zero));
        }

        let error_capacity = T::from_i64(capacity).ok_or(ModelBuildError::CoefficientOverflow {
            quantity: Quantity::ErrorCapacity,
            slot: None,
            strategy: None,
        })?;

        Ok(Model {
            num_slots,
            num_strategies,
            error_threshold: self.error_threshold,
            error_capacity,
            emissions,
            error_weights,
            slot_min_emissions,
            slot_min_error_weights,
        })
    }
}

#[inline]
fn checked_abs<T>(value: T) -> Option<T>
where
    T: PrimInt + Signed,
{
    if value < T::zero() {
        T::zero().checked_sub(&value)
    } else {
        Some(value)
    }
}

impl std::fmt::Debug for ModelBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("num_slots", &self.repository.num_slots())
            .field("num_strategies", &self.repository.num_strategies())
            .field("error_threshold", &self.error_threshold)
            .finish()
    }
}

impl std::fmt::Display for ModelBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ModelBuilder(num_slots: {}, num_strategies: {}, error_threshold: {}%)",
            self.repository.num_slots(),
            self.repository.num_strategies(),
            self.error_threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Strategy, TimeSlot};

    type IntegerType = i64;

    fn t(i: usize) -> SlotIndex {
        SlotIndex::new(i)
    }
    fn s(i: usize) -> StrategyIndex {
        StrategyIndex::new(i)
    }

    fn scenario() -> Repository {
        Repository::new(
            vec![
                TimeSlot::new("t0", 100, 100, 10, 10),
                TimeSlot::new("t1", 200, 200, 5, 5),
            ],
            vec![Strategy::new("nop", 10, 500), Strategy::new("full", 20, 0)],
        )
    }

    #[test]
    fn test_flatten_index_is_slot_major() {
        assert_eq!(flatten_index(3, t(0), s(0)), 0);
        assert_eq!(flatten_index(3, t(0), s(2)), 2);
        assert_eq!(flatten_index(3, t(1), s(0)), 3);
        assert_eq!(flatten_index(3, t(2), s(1)), 7);
    }

    #[test]
    fn test_build_computes_coefficients() {
        let repo = scenario();
        let model = ModelBuilder::new(&repo)
            .error_threshold(10)
            .build::<IntegerType>()
            .unwrap();

        assert_eq!(model.num_slots(), 2);
        assert_eq!(model.num_strategies(), 2);
        assert_eq!(model.emission(t(0), s(0)), 10_000);
        assert_eq!(model.emission(t(1), s(1)), 20_000);
        assert_eq!(model.error_weight(t(0), s(0)), 5_000);
        assert_eq!(model.error_weight(t(1), s(1)), 0);
        assert_eq!(model.slot_emissions(t(1)), &[10_000, 20_000]);
        assert_eq!(model.slot_error_weights(t(0)), &[5_000, 0]);
        assert_eq!(model.error_capacity(), 15 * 10 * 100);
        assert_eq!(model.error_threshold(), 10);
    }

    #[test]
    fn test_build_computes_slot_minima() {
        let repo = scenario();
        let model = ModelBuilder::new(&repo).build::<IntegerType>().unwrap();
        assert_eq!(model.slot_min_emissions(), &[10_000, 10_000]);
        assert_eq!(model.slot_min_error_weights(), &[0, 0]);
        assert_eq!(model.error_capacity(), 0);
    }

    #[test]
    fn test_evaluating_complete_assignments() {
        let repo = scenario();
        let model = ModelBuilder::new(&repo).error_threshold(10).build::<IntegerType>().unwrap();

        let cheap = [s(0), s(0)];
        assert_eq!(model.objective_for(&cheap), 20_000);
        assert_eq!(model.error_weight_for(&cheap), 7_500);
        assert!(model.is_within_capacity(&cheap));

        let strict = ModelBuilder::new(&repo).error_threshold(4).build::<IntegerType>().unwrap();
        assert!(!strict.is_within_capacity(&cheap));
        assert!(strict.is_within_capacity(&[s(1), s(1)]));
    }

    #[test]
    #[should_panic(expected = "called `Model::objective_for` with an assignment of 1 slots on a model of 2")]
    fn test_objective_for_panics_on_partial_assignment() {
        let repo = scenario();
        let model = ModelBuilder::new(&repo).build::<IntegerType>().unwrap();
        model.objective_for(&[s(0)]);
    }

    #[test]
    fn test_unchecked_accessors_match_checked() {
        let repo = scenario();
        let model = ModelBuilder::new(&repo).build::<IntegerType>().unwrap();
        for slot in SlotIndex::range(2) {
            for strategy in StrategyIndex::range(2) {
                unsafe {
                    assert_eq!(model.emission_unchecked(slot, strategy), model.emission(slot, strategy));
                    assert_eq!(
                        model.error_weight_unchecked(slot, strategy),
                        model.error_weight(slot, strategy)
                    );
                }
            }
        }
    }

    #[test]
    fn test_no_strategies_gives_zero_minima() {
        let repo = Repository::new(vec![TimeSlot::new("t0", 1, 1, 1, 1)], vec![]);
        let model = ModelBuilder::new(&repo).build::<IntegerType>().unwrap();
        assert_eq!(model.num_strategies(), 0);
        assert_eq!(model.slot_min_emissions(), &[0]);
        assert!(model.slot_emissions(t(0)).is_empty());
    }

    #[test]
    fn test_empty_repository_builds() {
        let repo = Repository::default();
        let model = ModelBuilder::new(&repo).error_threshold(5).build::<IntegerType>().unwrap();
        assert_eq!(model.num_slots(), 0);
        assert_eq!(model.error_capacity(), 0);
        assert_eq!(model.complexity().raw(), 0.0);
    }

    #[test]
    fn test_coefficient_overflow_in_narrow_type() {
        let repo = Repository::new(
            vec![TimeSlot::new("t0", 1_000, 1_000, 100, 100)],
            vec![Strategy::new("nop", 1, 0)],
        );
        match ModelBuilder::new(&repo).build::<i16>() {
            Err(ModelBuildError::CoefficientOverflow {
                quantity,
                slot,
                strategy,
            }) => {
                assert_eq!(quantity, Quantity::Emission);
                assert_eq!(slot, Some(t(0)));
                assert_eq!(strategy, Some(s(0)));
            }
            other => panic!("expected CoefficientOverflow, got {:?}", other),
        }
    }

    #[test]
    fn test_objective_range_overflow() {
        let repo = Repository::new(
            vec![
                TimeSlot::new("t0", 1, 1, 1, 20_000),
                TimeSlot::new("t1", 1, 1, 1, 20_000),
            ],
            vec![Strategy::new("nop", 1, 0)],
        );
        let err = ModelBuilder::new(&repo).build::<i16>().unwrap_err();
        assert_eq!(
            err,
            ModelBuildError::CoefficientOverflow {
                quantity: Quantity::ObjectiveRange,
                slot: Some(t(1)),
                strategy: None,
            }
        );
        assert_eq!(
            err.to_string(),
            "objective range does not fit the numeric type (slot 1)"
        );
    }

    #[test]
    fn test_i64_overflow_is_reported() {
        let repo = Repository::new(
            vec![TimeSlot::new("t0", i64::MAX, i64::MAX, 2, 2)],
            vec![Strategy::new("nop", 1, 0)],
        );
        assert!(matches!(
            ModelBuilder::new(&repo).build::<IntegerType>(),
            Err(ModelBuildError::CoefficientOverflow {
                quantity: Quantity::Emission,
                ..
            })
        ));
    }

    #[test]
    fn test_complexity_counts_tree_nodes() {
        // 1 + 2 + 4 + 8 = 15 nodes.
        let c = Complexity::new(3, 2);
        assert!((c.raw() - 15f64.log10()).abs() < 1e-9);
        assert_eq!(c.exponent(), 1);
        assert!((c.mantissa() - 1.5).abs() < 1e-9);
        assert!((c.coverage(15) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_complexity_of_large_trees_stays_finite() {
        let c = Complexity::new(48, 12);
        assert!(c.raw().is_finite());
        assert_eq!(c.exponent(), 51);
        assert_eq!(c.coverage(1_000_000), 0.0);
    }

    #[test]
    #[should_panic(expected = "called `Model::emission` with strategy index out of bounds")]
    fn test_emission_panics_out_of_bounds() {
        let repo = scenario();
        let model = ModelBuilder::new(&repo).build::<IntegerType>().unwrap();
        model.emission(t(0), s(2));
    }

    #[test]
    fn test_display() {
        let repo = scenario();
        let builder = ModelBuilder::new(&repo).error_threshold(10);
        assert_eq!(
            format!("{}", builder),
            "ModelBuilder(num_slots: 2, num_strategies: 2, error_threshold: 10%)"
        );
        let model = builder.build::<IntegerType>().unwrap();
        assert_eq!(
            format!("{}", model),
            "Model(num_slots: 2, num_strategies: 2, error_threshold: 10%, error_capacity: 15000)"
        );
    }
}
