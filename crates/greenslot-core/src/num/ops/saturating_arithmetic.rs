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

//! Saturating arithmetic by value.
//!
//! Results clamp to the numeric bounds of the type instead of wrapping.
//!
//! ```rust
//! use greenslot_core::num::ops::saturating_arithmetic::SaturatingAddVal;
//!
//! assert_eq!(250u8.saturating_add_val(10), 255);
//! assert_eq!((-120i8).saturating_add_val(-20), -128);
//! ```

use core::ops::{Add, Sub};

/// Saturating addition by value.
pub trait SaturatingAddVal: Sized + Add<Self, Output = Self> {
    /// Adds `v`, clamping at the type bounds.
    fn saturating_add_val(self, v: Self) -> Self;
}

/// Saturating subtraction by value.
pub trait SaturatingSubVal: Sized + Sub<Self, Output = Self> {
    /// Subtracts `v`, clamping at the type bounds.
    fn saturating_sub_val(self, v: Self) -> Self;
}

macro_rules! impl_saturating_binary {
    ($trait_name:ident, $method:ident, $src_method:ident; $($t:ty),*) => {
        $(
            impl $trait_name for $t {
                #[inline(always)]
                fn $method(self, v: Self) -> Self {
                    <$t>::$src_method(self, v)
                }
            }
        )*
    };
}

impl_saturating_binary!(SaturatingAddVal, saturating_add_val, saturating_add; u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
impl_saturating_binary!(SaturatingSubVal, saturating_sub_val, saturating_sub; u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
