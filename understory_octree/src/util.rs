// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Returns the smallest power of two that is at least `value`, and at least 1.
///
/// Infinite inputs yield infinity and NaN yields 1.
#[inline]
pub(crate) fn pow2_ceil(value: f32) -> f32 {
    let mut edge = 1.0_f32;
    while edge < value {
        edge *= 2.0;
    }
    edge
}
