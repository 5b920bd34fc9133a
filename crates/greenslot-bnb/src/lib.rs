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

//! # Greenslot BnB
//!
//! **Exact branch-and-bound for choosing one strategy per time slot.**
//!
//! The solver walks a tree in which each level fixes the strategy of one slot.
//! Children are pruned when their request-weighted error can no longer stay
//! within the capacity, or when the cheapest completion cannot reach the
//! incumbent. Every strictly improving candidate is reported to the monitor in
//! discovery order; with tie enumeration enabled candidates that equal the
//! incumbent are reported too, which includes every optimal assignment.
//!
//! ## Core flow
//!
//! - Build a `greenslot_model::model::Model<T>`.
//! - Choose a `branching::decision::DecisionBuilder` (slot and strategy ordering).
//! - Run `bnb::BnbSolver` directly with a `TreeSearchMonitor`, or through
//!   `backend::BnbBackend` as a `greenslot_search::backend::SolvingBackend`.
//!
//! ## Module map
//!
//! - `bnb`: the solver engine and its search session.
//! - `branching`: decision builders.
//! - `monitor`: tree-search monitors (log, composite, wrapper, no-op).
//! - `backend`: the `SolvingBackend` adapter.
//! - `result`: solver outcomes with termination reasons.
//! - `state`, `trail`, `stack`: the incremental search state and its undo log.
//! - `stats`: counters and timing.

pub mod backend;
pub mod bnb;
pub mod branching;
pub mod monitor;
pub mod result;
pub mod stack;
pub mod state;
pub mod stats;
pub mod trail;
