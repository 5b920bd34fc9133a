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

//! # Greenslot Model
//!
//! **The data layer of the carbon-aware strategy optimizer.**
//!
//! A simulated day is a sequence of time slots, each with forecast and actual
//! carbon intensity and request volume, plus a catalogue of execution strategies
//! with an observed latency and forecasting error. This crate holds that data
//! and everything that is computed from it without running a search.
//!
//! ## Architecture
//!
//! * **`index`**: strongly typed `SlotIndex` and `StrategyIndex`.
//! * **`repository`**: the immutable `TimeSlot` and `Strategy` records of one day.
//! * **`loading`**: comma-separated table loader with all-or-nothing error reporting.
//! * **`score`**: pure emission and error scoring of a complete assignment.
//! * **`model`**: the `Model` handed to solving backends and its `ModelBuilder`.
//! * **`assignment`**: one strategy per slot, together with its objective value.
//! * **`export`**: the per-slot output table.
//!
//! ## Design Philosophy
//!
//! 1.  **Forecast drives, actual evaluates**: the model only ever sees forecast figures;
//!     actual figures travel untouched to the exporter.
//! 2.  **Integral arithmetic**: errors are stored as percentages scaled by 100 so the
//!     optimization never touches floating point.
//! 3.  **No hidden state**: repositories and models are plain values, so independent
//!     days can be processed on different threads.

pub mod assignment;
pub mod export;
pub mod index;
pub mod loading;
pub mod model;
pub mod repository;
pub mod score;
