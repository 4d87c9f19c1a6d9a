//! Polar geometry for the touch stick.
//!
//! Converts a displacement from the anchor point into `(radius, angle)` and
//! projects the clamped polar displacement back onto orthogonal axes.
//!
//! # Angle convention
//!
//! Displacements are in surface coordinates (y grows downward). The angle is
//! measured from straight up:
//!
//! | Direction | Angle |
//! |---|---|
//! | up | `0` |
//! | left | `π/2` |
//! | down | `π` |
//! | right | `3π/2` |
//!
//! Each quadrant is resolved with `atan` of a positive ratio plus a quarter-turn
//! offset. The axis-aligned directions are special-cased so no ratio ever
//! divides by zero and the cardinal angles come out exact.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Euclidean magnitude of a displacement.
pub fn radius(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}

/// Angle of a displacement in `[0, 2π)`, up being `0`.
///
/// A zero displacement returns `0`.
///
/// # Example
/// ```
/// use std::f64::consts::PI;
/// use touch_stick::stick::geometry::angle;
///
/// assert_eq!(angle(0.0, -1.0), 0.0);
/// assert_eq!(angle(1.0, 0.0), 3.0 * PI / 2.0);
/// ```
pub fn angle(dx: f64, dy: f64) -> f64 {
    // axis-aligned: exact cardinal angles
    if dx == 0.0 {
        return if dy > 0.0 { PI } else { 0.0 };
    }
    if dy == 0.0 {
        return if dx > 0.0 { 3.0 * FRAC_PI_2 } else { FRAC_PI_2 };
    }

    let a = if dx > 0.0 {
        if dy < 0.0 {
            // up-right
            3.0 * FRAC_PI_2 + (-dy / dx).atan()
        } else {
            // down-right
            PI + (dx / dy).atan()
        }
    } else if dy > 0.0 {
        // down-left
        FRAC_PI_2 + (dy / -dx).atan()
    } else {
        // up-left
        (-dx / -dy).atan()
    };

    // a near-vertical up-right displacement can round up to a full turn
    if a >= TAU {
        a - TAU
    } else {
        a
    }
}

/// Limit a radius to the usable travel distance.
pub fn clamp_radius(r: f64, max: f64) -> f64 {
    if r > max {
        max
    } else {
        r
    }
}

/// Un-normalized Cartesian projection of a polar displacement.
///
/// Returns `(correlated_x, correlated_y)` in surface units. The handle is drawn
/// at `anchor - (correlated_x, correlated_y)`.
pub fn correlated(radius: f64, angle: f64) -> (f64, f64) {
    let x = (FRAC_PI_2 - angle).cos() * radius;
    let y = (FRAC_PI_2 - angle).sin() * radius;
    (x, y)
}

/// Project a clamped polar displacement onto axes normalized by `travel`.
///
/// # Arguments
/// * `radius` - Displacement magnitude, already clamped to `travel`
/// * `angle` - Displacement angle from [`angle`]
/// * `travel` - Usable travel distance (outer radius minus handle radius)
///
/// # Returns
/// * `(x, y)` - each in `[-1.0, 1.0]`, right = +x, up = +y
pub fn to_normalized_vector(radius: f64, angle: f64, travel: f64) -> (f64, f64) {
    if travel <= 0.0 {
        return (0.0, 0.0);
    }

    let (cx, cy) = correlated(radius, angle);
    let x = (-cx / travel).clamp(-1.0, 1.0);
    let y = (cy / travel).clamp(-1.0, 1.0);
    (x, y)
}
