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

//! The candidate pool of one enumeration.
//!
//! Every assignment a backend reports is appended in discovery order,
//! without removing duplicates. The pool does not reorder or filter; tie-break
//! policies decide which entry becomes the final assignment.

use greenslot_model::assignment::Assignment;
use num_traits::{PrimInt, Signed};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool<T> {
    candidates: Vec<Assignment<T>>,
}

impl<T> Default for CandidatePool<T> {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }
}

impl<T> CandidatePool<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, candidate: Assignment<T>) {
        self.candidates.push(candidate);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Assignment<T>> {
        self.candidates.get(index)
    }

    /// The most recently discovered candidate.
    #[inline]
    pub fn last(&self) -> Option<&Assignment<T>> {
        self.candidates.last()
    }

    #[inline]
    pub fn candidates(&self) -> &[Assignment<T>] {
        &self.candidates
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Assignment<T>> {
        self.candidates.iter()
    }

    /// The smallest objective value in the pool.
    pub fn best_objective(&self) -> Option<T> {
        self.candidates.iter().map(|c| c.objective_value()).min()
    }

    /// Candidates at the minimum objective, in discovery order, paired with
    /// their position in the pool.
    pub fn optimal_candidates(&self) -> impl Iterator<Item = (usize, &Assignment<T>)> + '_ {
        let best = self.best_objective();
        self.candidates
            .iter()
            .enumerate()
            .filter(move |(_, c)| Some(c.objective_value()) == best)
    }

    #[inline]
    pub fn num_optimal(&self) -> usize {
        self.optimal_candidates().count()
    }

    /// Returns `true` if objectives never increase in discovery order.
    pub fn is_non_increasing(&self) -> bool {
        self.candidates
            .windows(2)
            .all(|w| w[1].objective_value() <= w[0].objective_value())
    }
}

impl<'p, T> IntoIterator for &'p CandidatePool<T> {
    type Item = &'p Assignment<T>;
    type IntoIter = std::slice::Iter<'p, Assignment<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

impl<T> std::fmt::Display for CandidatePool<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.best_objective() {
            Some(best) => write!(
                f,
                "CandidatePool(candidates: {}, optimal: {}, best: {})",
                self.len(),
                self.num_optimal(),
                best
            ),
            None => write!(f, "CandidatePool(empty)"),
        }
    }
}
