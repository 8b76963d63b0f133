use hashbrown::HashMap;
use serde::Deserialize;

use crate::data::{
    EntryTiming, LayerChannels, LoopMode, PlayMode, TransitionCondition, TransitionDefaults,
};
use crate::easing::Easing;
use crate::error::BehaviorError;
use crate::ids::{AnimationId, GroupId, LayerId, PlaylistId, ScalarChannelId, StateId};
use crate::library::{validate_timing, BehaviorLibrary};
use crate::pose::Pose;

/// Public API: parse a stored behavior library (see fixtures/behaviors/*.json)
/// into a [`BehaviorLibrary`].
///
/// Notes:
/// - Records reference each other by file-local numeric ids; the library
///   assigns its own ids on insert.
/// - Keyframes are appended to their animation in file order.
/// - A record whose parent id is unknown is dropped with a warning.
/// - Invalid values (negative or non-finite weights and durations, layer
///   mismatches, duplicate playlists) fail the whole parse.
pub fn parse_stored_library_json(s: &str) -> Result<BehaviorLibrary, BehaviorError> {
    let stored: StoredLibrary = serde_json::from_str(s)?;
    stored.into_library()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredLibrary {
    layers: Vec<StoredLayer>,
    animations: Vec<StoredAnimation>,
    keyframes: Vec<StoredKeyframe>,
    groups: Vec<StoredGroup>,
    states: Vec<StoredState>,
    transitions: Vec<StoredTransition>,
    playlists: Vec<StoredPlaylist>,
}

#[derive(Debug, Deserialize)]
struct StoredLayer {
    id: u32,
    name: String,
    #[serde(default)]
    positions: Vec<String>,
    #[serde(default)]
    rotations: Vec<String>,
    #[serde(default)]
    scalars: Vec<u32>,
    #[serde(default)]
    transition: Option<TransitionDefaults>,
}

#[derive(Debug, Deserialize)]
struct StoredAnimation {
    id: u32,
    layer: u32,
    name: String,
    #[serde(default)]
    loop_mode: LoopMode,
    #[serde(default = "one")]
    speed: f32,
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct StoredKeyframe {
    animation: u32,
    duration: f32,
    #[serde(default)]
    easing: Easing,
    #[serde(default)]
    pose: StoredPose,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredPose {
    positions: Vec<Channel<String, [f32; 3]>>,
    rotations: Vec<Channel<String, [f32; 4]>>,
    scalars: Vec<Channel<u32, f32>>,
}

#[derive(Debug, Deserialize)]
struct Channel<K, V> {
    channel: K,
    value: V,
}

#[derive(Debug, Deserialize)]
struct StoredGroup {
    id: u32,
    name: String,
    #[serde(default)]
    initial_state: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StoredState {
    id: u32,
    group: u32,
    name: String,
    #[serde(default)]
    condition: TransitionCondition,
}

#[derive(Debug, Deserialize)]
struct StoredTransition {
    from: u32,
    to: u32,
    #[serde(default = "one")]
    weight: f32,
}

#[derive(Debug, Deserialize)]
struct StoredPlaylist {
    state: u32,
    layer: u32,
    #[serde(default)]
    mode: PlayMode,
    #[serde(default)]
    default_timing: EntryTiming,
    #[serde(default)]
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Deserialize)]
struct StoredEntry {
    animation: u32,
    #[serde(default)]
    timing: Option<EntryTiming>,
    #[serde(default = "one")]
    weight: f32,
}

impl StoredPose {
    fn into_pose(self) -> Pose {
        let mut pose = Pose::new();
        for c in self.positions {
            pose.positions.insert(c.channel, c.value);
        }
        for c in self.rotations {
            pose.rotations.insert(c.channel, c.value);
        }
        for c in self.scalars {
            pose.scalars.insert(ScalarChannelId(c.channel), c.value);
        }
        pose
    }
}

impl StoredLibrary {
    fn into_library(self) -> Result<BehaviorLibrary, BehaviorError> {
        let mut lib = BehaviorLibrary::new();
        let mut layers: HashMap<u32, LayerId> = HashMap::new();
        let mut animations: HashMap<u32, AnimationId> = HashMap::new();
        let mut groups: HashMap<u32, GroupId> = HashMap::new();
        let mut states: HashMap<u32, StateId> = HashMap::new();

        for sl in self.layers {
            let channels = LayerChannels {
                positions: sl.positions,
                rotations: sl.rotations,
                scalars: sl.scalars.into_iter().map(ScalarChannelId).collect(),
            };
            let id = lib.add_layer(&sl.name, channels);
            if let Some(t) = sl.transition {
                lib.set_layer_transition(id, t)?;
            }
            layers.insert(sl.id, id);
        }

        for sa in self.animations {
            let Some(&layer) = layers.get(&sa.layer) else {
                log::warn!("dropping animation '{}': unknown layer {}", sa.name, sa.layer);
                continue;
            };
            if !sa.speed.is_finite() || sa.speed < 0.0 {
                return Err(BehaviorError::Parse {
                    reason: format!("animation '{}' has invalid speed {}", sa.name, sa.speed),
                });
            }
            let id = lib.add_animation(layer, &sa.name, sa.loop_mode)?;
            if let Some(a) = lib.animation_mut(id) {
                a.speed = sa.speed;
            }
            animations.insert(sa.id, id);
        }

        for sk in self.keyframes {
            let Some(&anim) = animations.get(&sk.animation) else {
                log::warn!("dropping keyframe: unknown animation {}", sk.animation);
                continue;
            };
            lib.add_keyframe(anim, sk.pose.into_pose(), sk.duration, sk.easing)?;
        }

        for sg in &self.groups {
            groups.insert(sg.id, lib.add_group(&sg.name));
        }

        for ss in self.states {
            let Some(&group) = groups.get(&ss.group) else {
                log::warn!("dropping state '{}': unknown group {}", ss.name, ss.group);
                continue;
            };
            let id = lib.add_state(group, &ss.name, ss.condition)?;
            states.insert(ss.id, id);
        }

        for sg in &self.groups {
            let Some(initial) = sg.initial_state else {
                continue;
            };
            let (Some(&group), Some(&state)) = (groups.get(&sg.id), states.get(&initial)) else {
                log::warn!("group '{}': unknown initial state {}", sg.name, initial);
                continue;
            };
            lib.set_initial_state(group, state)?;
        }

        for st in self.transitions {
            let (Some(&from), Some(&to)) = (states.get(&st.from), states.get(&st.to)) else {
                log::warn!("dropping transition {} -> {}: unknown state", st.from, st.to);
                continue;
            };
            lib.add_transition(from, to, st.weight)?;
        }

        for sp in self.playlists {
            let (Some(&state), Some(&layer)) = (states.get(&sp.state), layers.get(&sp.layer)) else {
                log::warn!(
                    "dropping playlist for state {} layer {}: unknown parent",
                    sp.state,
                    sp.layer
                );
                continue;
            };
            validate_timing(&sp.default_timing)?;
            let playlist: PlaylistId = lib.add_playlist(state, layer, sp.mode)?;
            if let Some(p) = lib.playlist_mut(playlist) {
                p.default_timing = sp.default_timing;
            }
            for se in sp.entries {
                let Some(&anim) = animations.get(&se.animation) else {
                    log::warn!("dropping playlist entry: unknown animation {}", se.animation);
                    continue;
                };
                lib.add_entry(playlist, anim, se.timing, se.weight)?;
            }
        }

        Ok(lib)
    }
}
