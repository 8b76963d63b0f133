//! Authoring data model consumed by the schedulers.
//!
//! Entities are owned by [`crate::library::BehaviorLibrary`] and refer to
//! each other by id. Editors mutate them between ticks; the runtime players
//! re-read them every tick.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::ids::{AnimationId, EntryId, GroupId, KeyframeId, LayerId, PlaylistId, ScalarChannelId, StateId};
use crate::pose::Pose;

/// How an animation walks its keyframe sequence.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoopMode {
    /// Play the sequence once and hold the last keyframe.
    Once,
    #[default]
    Loop,
    /// Walk forward to the last keyframe, then back to the first, and repeat.
    PingPong,
}

/// How a playlist picks its next entry.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlayMode {
    #[default]
    Sequential,
    Random,
}

/// When a playlist entry has played long enough.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum EntryTiming {
    /// One full pass of the animation (play-once completion, or one cycle
    /// for looping animations).
    #[default]
    FromAnimationDuration,
    Infinite,
    Fixed(f32),
    /// Uniform in `[min, max]`, resampled each time the entry starts.
    Random { min: f32, max: f32 },
}

/// When a state is ready to hand over to another state.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum TransitionCondition {
    #[default]
    None,
    PlaylistCompleted,
    FixedDuration(f32),
    RandomDuration { min: f32, max: f32 },
}

/// Duration and easing used for synthetic in-between poses on a layer.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransitionDefaults {
    pub duration: f32,
    #[serde(default)]
    pub easing: Easing,
}

impl Default for TransitionDefaults {
    fn default() -> Self {
        Self {
            duration: 0.25,
            easing: Easing::QuadInOut,
        }
    }
}

/// Channels tracked by a layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LayerChannels {
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub rotations: Vec<String>,
    #[serde(default)]
    pub scalars: Vec<ScalarChannelId>,
}

impl LayerChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, name: impl Into<String>) -> Self {
        self.positions.push(name.into());
        self
    }

    pub fn rotation(mut self, name: impl Into<String>) -> Self {
        self.rotations.push(name.into());
        self
    }

    pub fn scalar(mut self, id: ScalarChannelId) -> Self {
        self.scalars.push(id);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub channels: LayerChannels,
    pub default_transition: TransitionDefaults,
    /// Animations authored on this layer, in creation order.
    pub animations: Vec<AnimationId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub id: KeyframeId,
    pub pose: Pose,
    /// Seconds spent travelling from this keyframe to the next one.
    pub duration: f32,
    pub easing: Easing,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Animation {
    pub id: AnimationId,
    pub layer: LayerId,
    pub name: String,
    pub loop_mode: LoopMode,
    /// Playback-speed multiplier applied to keyframe and animation time.
    pub speed: f32,
    pub keyframes: Vec<Keyframe>,
}

impl Animation {
    /// Seconds for one pass over the sequence at speed 1.
    ///
    /// `Loop` includes the wrap segment from the last keyframe back to the
    /// first; `Once` and `PingPong` stop at the last keyframe. `PingPong`
    /// walks the sequence twice per cycle, so its cycle is double this.
    pub fn span(&self) -> f32 {
        let n = self.keyframes.len();
        let segments = match self.loop_mode {
            LoopMode::Loop => n,
            LoopMode::Once | LoopMode::PingPong => n.saturating_sub(1),
        };
        self.keyframes
            .iter()
            .take(segments)
            .map(|k| k.duration.max(0.0))
            .sum()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlaylistEntry {
    pub id: EntryId,
    pub animation: AnimationId,
    pub timing: EntryTiming,
    /// Relative weight used when the playlist is in `Random` mode.
    pub weight: f32,
}

/// Per-(State, Layer) collection of entries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub id: PlaylistId,
    pub state: StateId,
    pub layer: LayerId,
    pub mode: PlayMode,
    /// Timing applied to entries added without an explicit one.
    pub default_timing: EntryTiming,
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn entry(&self, id: EntryId) -> Option<&PlaylistEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_index(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct State {
    pub id: StateId,
    pub group: GroupId,
    pub name: String,
    pub condition: TransitionCondition,
    /// At most one per layer, in creation order.
    pub playlists: Vec<PlaylistId>,
}

/// Weighted edge of the state graph. The source state is implicit in `from`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub weight: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub initial_state: Option<StateId>,
    /// States in creation order.
    pub states: Vec<StateId>,
    pub transitions: Vec<Transition>,
}

impl Group {
    /// Outgoing edges of `state`, in insertion order.
    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.from == state)
    }
}
