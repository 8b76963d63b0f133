//! Pose snapshots, live-pose capture, and pose blending.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::Layer;
use crate::ids::ScalarChannelId;
use crate::interp::{lerp_f32, lerp_vec3, slerp_quat};
use crate::rig::CharacterRig;

/// Captured channel values: positions and rotations by channel name,
/// scalars by channel id.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    #[serde(default)]
    pub positions: HashMap<String, [f32; 3]>,
    #[serde(default)]
    pub rotations: HashMap<String, [f32; 4]>,
    #[serde(default)]
    pub scalars: HashMap<ScalarChannelId, f32>,
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, channel: &str, value: [f32; 3]) -> Self {
        self.positions.insert(channel.to_string(), value);
        self
    }

    pub fn with_rotation(mut self, channel: &str, value: [f32; 4]) -> Self {
        self.rotations.insert(channel.to_string(), value);
        self
    }

    pub fn with_scalar(mut self, channel: ScalarChannelId, value: f32) -> Self {
        self.scalars.insert(channel, value);
        self
    }
}

/// Snapshot every channel `layer` tracks from the rig's live values.
/// Channels the rig cannot read are left out of the pose.
pub fn capture_pose(layer: &Layer, rig: &dyn CharacterRig) -> Pose {
    let mut pose = Pose::default();
    for name in &layer.channels.positions {
        if let Some(v) = rig.position(name) {
            pose.positions.insert(name.clone(), v);
        }
    }
    for name in &layer.channels.rotations {
        if let Some(q) = rig.rotation(name) {
            pose.rotations.insert(name.clone(), q);
        }
    }
    for id in &layer.channels.scalars {
        if let Some(s) = rig.scalar(*id) {
            pose.scalars.insert(*id, s);
        }
    }
    pose
}

/// Write `from → to` at eased progress `t` for every channel `layer` tracks.
///
/// A channel is written only when both poses carry it; channels missing on
/// either side keep their live value.
pub fn apply_blend(layer: &Layer, from: &Pose, to: &Pose, t: f32, rig: &mut dyn CharacterRig) {
    for name in &layer.channels.positions {
        if let (Some(a), Some(b)) = (from.positions.get(name), to.positions.get(name)) {
            rig.set_position(name, lerp_vec3(*a, *b, t));
        }
    }
    for name in &layer.channels.rotations {
        if let (Some(a), Some(b)) = (from.rotations.get(name), to.rotations.get(name)) {
            rig.set_rotation(name, slerp_quat(*a, *b, t));
        }
    }
    for id in &layer.channels.scalars {
        if let (Some(a), Some(b)) = (from.scalars.get(id), to.scalars.get(id)) {
            rig.set_scalar(*id, lerp_f32(*a, *b, t));
        }
    }
}
