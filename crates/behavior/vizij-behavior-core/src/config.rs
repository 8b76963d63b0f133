//! Core configuration for vizij-behavior-core.

use serde::{Deserialize, Serialize};

/// Configuration for engine sizing, randomness and numeric guards.
/// Keep this minimal; hosts override fields with struct update syntax.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the default PCG random source.
    pub seed: u64,

    /// Initial capacity hint for the per-tick notification buffer.
    pub notification_capacity: usize,

    /// Floor applied to keyframe and transition durations so progress math
    /// never divides by zero.
    pub min_transition_duration: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 0x5eed_b0d1,
            notification_capacity: 16,
            min_transition_duration: 1e-4,
        }
    }
}

impl Config {
    /// Clamp an authored duration to the configured floor.
    #[inline]
    pub fn duration(&self, authored: f32) -> f32 {
        if authored.is_finite() {
            authored.max(self.min_transition_duration)
        } else {
            self.min_transition_duration
        }
    }
}
