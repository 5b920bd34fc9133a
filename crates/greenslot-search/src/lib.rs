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

//! # Greenslot Search
//!
//! **The backend-agnostic search contract.**
//!
//! Everything a solving backend and its caller agree on lives here, so the
//! optimizer can drive any backend (exact branch-and-bound, a scripted replay
//! in tests, or a future external engine) through the same interface.
//!
//! ## Architecture
//!
//! * **`backend`**: the `SolvingBackend` trait, the `BackendContext` handed to it and
//!   the `BackendOutcome` it returns.
//! * **`monitor`**: lifecycle observers. Every candidate a backend finds is reported
//!   through `SearchMonitor::on_solution_found`, and monitors may stop the search.
//! * **`result`**: `SolverResult`, `SolveStatus` and `TerminationReason`.
//! * **`stats`**: backend-independent `SolverStatistics`.
//! * **`num`**: the `SolverNumeric` bound collecting the integer capabilities search code needs.

pub mod backend;
pub mod monitor;
pub mod num;
pub mod result;
pub mod stats;
