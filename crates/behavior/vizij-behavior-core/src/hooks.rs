//! Lifecycle hooks.
//!
//! Authoring entities do not carry callbacks. The schedulers report each
//! lifecycle moment as a [`HookCall`] to a host-provided [`Hooks`] set, in the
//! order the moments happen.

use serde::{Deserialize, Serialize};

use crate::ids::{AnimationId, KeyframeId, StateId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookTarget {
    State(StateId),
    Animation(AnimationId),
    Keyframe(KeyframeId),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Enter,
    /// Fired every tick while playing; `progress` is normalized to `[0,1]`.
    Playing { progress: f32 },
    Exit,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HookCall {
    pub target: HookTarget,
    pub lifecycle: Lifecycle,
}

impl HookCall {
    pub fn enter(target: HookTarget) -> Self {
        Self {
            target,
            lifecycle: Lifecycle::Enter,
        }
    }

    pub fn exit(target: HookTarget) -> Self {
        Self {
            target,
            lifecycle: Lifecycle::Exit,
        }
    }

    pub fn playing(target: HookTarget, progress: f32) -> Self {
        Self {
            target,
            lifecycle: Lifecycle::Playing { progress },
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Playing { .. })
    }
}

/// Callback set invoked by the schedulers.
pub trait Hooks {
    fn invoke(&mut self, call: HookCall);
}

impl<F: FnMut(HookCall)> Hooks for F {
    fn invoke(&mut self, call: HookCall) {
        self(call)
    }
}

/// Discards every call.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopHooks;

impl Hooks for NoopHooks {
    fn invoke(&mut self, _call: HookCall) {}
}

/// Keeps every call in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingHooks {
    pub calls: Vec<HookCall>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter/exit calls only; `Playing` calls are per-tick noise for most assertions.
    pub fn transitions(&self) -> Vec<HookCall> {
        self.calls.iter().filter(|c| !c.is_playing()).copied().collect()
    }

    pub fn calls_for(&self, target: HookTarget) -> Vec<Lifecycle> {
        self.calls
            .iter()
            .filter(|c| c.target == target)
            .map(|c| c.lifecycle)
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Hooks for RecordingHooks {
    fn invoke(&mut self, call: HookCall) {
        self.calls.push(call);
    }
}
