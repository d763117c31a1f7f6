//! Blend-factor curves. Every function clamps its input to \[0, 1\].

use crate::constants::{GIFT_BOOST, GIFT_LAG};

#[inline]
fn unit(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Decelerating curve used by the particle field.
#[inline]
pub fn ease_out_cubic(p: f32) -> f32 {
    let inv = 1.0 - unit(p);
    1.0 - inv * inv * inv
}

/// Accelerate-then-decelerate curve used by ornaments and gifts.
#[inline]
pub fn ease_in_out_cubic(p: f32) -> f32 {
    let p = unit(p);
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        let q = -2.0 * p + 2.0;
        1.0 - q * q * q / 2.0
    }
}

/// Lagged factor for the gifts, derived from the ornaments' eased factor.
///
/// Stays at zero until `eased` passes `GIFT_LAG`, then catches up by
/// `GIFT_BOOST`. Never exceeds `eased`, and tops out at 0.99 for `eased = 1`;
/// `interp::gift_factor` closes that gap once the scene settles.
#[inline]
pub fn gift_blend(eased: f32) -> f32 {
    ((unit(eased) - GIFT_LAG).max(0.0) * GIFT_BOOST).clamp(0.0, 1.0)
}
