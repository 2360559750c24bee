//! Snapping of values polluted by rounding error.
//!
//! Products of trigonometric functions and repeated matrix arithmetic leave
//! values like `6.1e-17` where an exact `0` is meant. All such cleanup goes
//! through [`snap`], so that the tolerance is defined in exactly one place.

/// Values closer than this to `0`, `1` or `-1` are snapped to them.
pub const SNAP_EPSILON: f64 = 1e-12;

/// Returns exactly `0.0`, `1.0` or `-1.0` if `value` lies within
/// [`SNAP_EPSILON`] of one of them, and `value` unchanged otherwise.
#[inline]
pub fn snap(value: f64) -> f64 {
    if value.abs() < SNAP_EPSILON {
        0.0
    } else if (value - 1.0).abs() < SNAP_EPSILON {
        1.0
    } else if (value + 1.0).abs() < SNAP_EPSILON {
        -1.0
    } else {
        value
    }
}

/// Computes the sine and cosine of `angle` (in radians) and snaps both.
#[inline]
pub fn snapped_sin_cos(angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (snap(sin), snap(cos))
}

/// Computes the arc cosine of `value` after snapping it, so that arguments
/// pushed just outside `[-1, 1]` by rounding do not produce NaN.
#[inline]
pub fn snapped_acos(value: f64) -> f64 {
    snap(value).acos()
}

/// Computes the arc sine of `value` after snapping it.
#[inline]
pub fn snapped_asin(value: f64) -> f64 {
    snap(value).asin()
}
