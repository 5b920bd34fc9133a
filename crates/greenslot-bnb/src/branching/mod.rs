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

//! Branching strategies for strategy-per-slot assignment
//!
//! Defines the `Decision` type and the builders that produce the children of
//! a search node. Each node branches on one open slot and offers every
//! strategy for it, so the tree holds each complete assignment exactly once;
//! builders differ only in which slot they pick and in which order its
//! strategies are explored.
//!
//! Provided builders:
//! - `chronological`: slots in index order, strategies in index order.
//! - `greedy`: slots with the widest emission spread first, cheapest strategy first.
//!
//! All iterators are fused: once exhausted, further `next()` calls yield `None`.

pub mod chronological;
pub mod decision;
pub mod greedy;
