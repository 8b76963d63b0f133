//! Easing curves mapping normalized progress `t ∈ [0,1]` to eased progress.
//!
//! Every curve maps 0 → 0 and 1 → 1. `Hold` is a step: it stays at 0 for
//! all `t < 1` and jumps to 1 at the end of the segment.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    Hold,
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
}

impl Easing {
    pub const ALL: [Easing; 14] = [
        Easing::Hold,
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuinticIn,
        Easing::QuinticOut,
        Easing::QuinticInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
    ];

    /// Apply this curve to `t`. Input is clamped to `[0,1]`.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        ease(self, t)
    }
}

#[inline]
fn pow_in(t: f32, n: i32) -> f32 {
    t.powi(n)
}

#[inline]
fn pow_out(t: f32, n: i32) -> f32 {
    1.0 - (1.0 - t).powi(n)
}

#[inline]
fn pow_in_out(t: f32, n: i32) -> f32 {
    if t < 0.5 {
        // 2^(n-1) * t^n
        (2.0f32).powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

/// Map `t` through `curve`. Pure and deterministic.
pub fn ease(curve: Easing, t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    match curve {
        Easing::Hold => {
            if t >= 1.0 {
                1.0
            } else {
                0.0
            }
        }
        Easing::Linear => t,
        Easing::QuadIn => pow_in(t, 2),
        Easing::QuadOut => pow_out(t, 2),
        Easing::QuadInOut => pow_in_out(t, 2),
        Easing::CubicIn => pow_in(t, 3),
        Easing::CubicOut => pow_out(t, 3),
        Easing::CubicInOut => pow_in_out(t, 3),
        Easing::QuinticIn => pow_in(t, 5),
        Easing::QuinticOut => pow_out(t, 5),
        Easing::QuinticInOut => pow_in_out(t, 5),
        // The exponential family is pinned at both ends; 2^-10 is not exactly 0.
        Easing::ExpoIn => {
            if t <= 0.0 {
                0.0
            } else {
                (2.0f32).powf(10.0 * t - 10.0)
            }
        }
        Easing::ExpoOut => {
            if t >= 1.0 {
                1.0
            } else {
                1.0 - (2.0f32).powf(-10.0 * t)
            }
        }
        Easing::ExpoInOut => {
            if t <= 0.0 {
                0.0
            } else if t >= 1.0 {
                1.0
            } else if t < 0.5 {
                (2.0f32).powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - (2.0f32).powf(-20.0 * t + 10.0)) / 2.0
            }
        }
    }
}
