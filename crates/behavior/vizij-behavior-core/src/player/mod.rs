//! Runtime scheduler chain.
//!
//! GroupPlayer → StatePlayer → PlaylistPlayer → PlaylistEntryPlayer →
//! AnimationPlayer → KeyframePlayer. Each level exclusively owns the level
//! beneath it and rebuilds it whenever its own "current X" changes. Players
//! hold ids only and re-resolve authoring data through the context on
//! every call, so editor changes between ticks are picked up.

pub mod animation;
pub mod entry;
pub mod group;
pub mod keyframe;
pub mod playlist;
pub mod state;

pub use animation::AnimationPlayer;
pub use entry::PlaylistEntryPlayer;
pub use group::GroupPlayer;
pub use keyframe::KeyframePlayer;
pub use playlist::PlaylistPlayer;
pub use state::StatePlayer;

use crate::config::Config;
use crate::hooks::{HookCall, Hooks};
use crate::library::BehaviorLibrary;
use crate::outputs::{Notification, Outputs};
use crate::random::RandomSource;

/// Shared services handed down the chain on every call.
pub struct PlayerContext<'a> {
    pub library: &'a BehaviorLibrary,
    pub config: &'a Config,
    pub hooks: &'a mut dyn Hooks,
    pub rng: &'a mut dyn RandomSource,
    pub outputs: &'a mut Outputs,
}

impl PlayerContext<'_> {
    #[inline]
    pub(crate) fn hook(&mut self, call: HookCall) {
        self.hooks.invoke(call);
    }

    #[inline]
    pub(crate) fn notify(&mut self, n: Notification) {
        self.outputs.push(n);
    }
}

#[inline]
pub(crate) fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// A `[min, max]` draw remembered together with the bounds it came from,
/// so authoring edits to the bounds trigger a fresh draw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct RandomTarget {
    bounds: Option<(f32, f32)>,
    value: f32,
}

impl RandomTarget {
    /// Current target for `(min, max)`, drawing a new one when the bounds differ
    /// from the last draw.
    pub(crate) fn get(&mut self, min: f32, max: f32, rng: &mut dyn RandomSource) -> f32 {
        if self.bounds != Some((min, max)) {
            self.resample(min, max, rng);
        }
        self.value
    }

    pub(crate) fn resample(&mut self, min: f32, max: f32, rng: &mut dyn RandomSource) {
        self.bounds = Some((min, max));
        self.value = rng.range_f32(min, max);
    }

    pub(crate) fn peek(&self) -> Option<f32> {
        self.bounds.map(|_| self.value)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
