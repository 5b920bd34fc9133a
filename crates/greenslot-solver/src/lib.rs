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

//! # Greenslot Solver
//!
//! Optimal-solution enumeration and the run drivers built on top of it. This
//! crate is the only place that talks to a solving backend; everything it
//! hands back is either a proven optimum or an `OptimizeError`.
//!
//! ## Modules
//!
//! - `enumerator`: drives a backend, collects candidates and applies a tie-break.
//! - `pool`, `collector`: the candidate pool and the monitor that fills it.
//! - `tie_break`: `last-discovered`, `first-optimal` and `lowest-error` policies.
//! - `scripted`: a replay backend for exercising the enumerator.
//! - `pipeline`: one day from tables to the exported assignment table.
//! - `batch`: every (threshold, day) job of a configuration on worker threads.
//! - `config`: the `greenslot.toml` file.
//! - `error`: `OptimizeError` and the failure context of a solve.
//!
//! ## Motivation
//!
//! A single day is small enough to solve exactly, but a study covers many
//! days under many thresholds. Days are independent, so the batch driver
//! runs them side by side with one enumerator per worker.

pub mod batch;
pub mod collector;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod scripted;
pub mod tie_break;
