//! Vizij Behavior Core (engine-agnostic)
//!
//! Layered, weighted pose state machine. Authoring data lives in a
//! [`BehaviorLibrary`]; an [`Engine`] ticks one [`GroupPlayer`] per active
//! group, walking the scheduler chain down to keyframe interpolation and
//! writing blended channel values to a host [`CharacterRig`].

pub mod config;
pub mod data;
pub mod easing;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod ids;
pub mod interp;
pub mod library;
pub mod outputs;
pub mod player;
pub mod pose;
pub mod random;
pub mod rig;
pub mod select;
pub mod stored;

// Re-exports for consumers (hosts, editors, tests)
pub use config::Config;
pub use data::{
    Animation, EntryTiming, Group, Keyframe, Layer, LayerChannels, LoopMode, PlayMode, Playlist,
    PlaylistEntry, State, Transition, TransitionCondition, TransitionDefaults,
};
pub use easing::{ease, Easing};
pub use engine::Engine;
pub use error::BehaviorError;
pub use hooks::{HookCall, HookTarget, Hooks, Lifecycle, NoopHooks, RecordingHooks};
pub use ids::{
    AnimationId, EntryId, GroupId, IdAllocator, KeyframeId, LayerId, PlaylistId, ScalarChannelId,
    StateId,
};
pub use library::{BehaviorLibrary, Removed};
pub use outputs::{Notification, Outputs};
pub use player::{
    AnimationPlayer, GroupPlayer, KeyframePlayer, PlayerContext, PlaylistEntryPlayer,
    PlaylistPlayer, StatePlayer,
};
pub use pose::{apply_blend, capture_pose, Pose};
pub use random::{PcgRandom, RandomSource, SequenceRandom};
pub use rig::{CharacterRig, MemoryRig};
pub use select::{choose, choose_index};
pub use stored::parse_stored_library_json;
