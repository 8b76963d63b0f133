//! Live channel access.
//!
//! Hosts implement [`CharacterRig`] over their scene and pass it into
//! `Engine::update()`. Values are root-relative: positions and rotations are
//! expressed in the character root's space, the rig converts as needed.

use hashbrown::HashMap;

use crate::ids::ScalarChannelId;

pub trait CharacterRig {
    fn position(&self, channel: &str) -> Option<[f32; 3]>;
    /// Quaternion (x, y, z, w).
    fn rotation(&self, channel: &str) -> Option<[f32; 4]>;
    fn scalar(&self, channel: ScalarChannelId) -> Option<f32>;

    fn set_position(&mut self, channel: &str, value: [f32; 3]);
    fn set_rotation(&mut self, channel: &str, value: [f32; 4]);
    fn set_scalar(&mut self, channel: ScalarChannelId, value: f32);
}

/// In-memory rig for headless hosts and tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryRig {
    pub positions: HashMap<String, [f32; 3]>,
    pub rotations: HashMap<String, [f32; 4]>,
    pub scalars: HashMap<ScalarChannelId, f32>,
    /// Number of channel writes received, handy for asserting no-op ticks.
    pub writes: usize,
}

impl MemoryRig {
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

impl CharacterRig for MemoryRig {
    fn position(&self, channel: &str) -> Option<[f32; 3]> {
        self.positions.get(channel).copied()
    }

    fn rotation(&self, channel: &str) -> Option<[f32; 4]> {
        self.rotations.get(channel).copied()
    }

    fn scalar(&self, channel: ScalarChannelId) -> Option<f32> {
        self.scalars.get(&channel).copied()
    }

    fn set_position(&mut self, channel: &str, value: [f32; 3]) {
        self.writes += 1;
        self.positions.insert(channel.to_string(), value);
    }

    fn set_rotation(&mut self, channel: &str, value: [f32; 4]) {
        self.writes += 1;
        self.rotations.insert(channel.to_string(), value);
    }

    fn set_scalar(&mut self, channel: ScalarChannelId, value: f32) {
        self.writes += 1;
        self.scalars.insert(channel, value);
    }
}
