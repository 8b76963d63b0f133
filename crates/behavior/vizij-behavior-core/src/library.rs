//! Authoring arena: every Group, State, Layer, Animation and Playlist,
//! addressed by stable id.
//!
//! Adds validate parent references and never insert anything dangling.
//! Removes cascade explicitly through the dependents of the removed entity
//! and report what went away so runtime players can be cleaned up.

use hashbrown::HashMap;

use crate::data::{
    Animation, EntryTiming, Group, Keyframe, Layer, LayerChannels, LoopMode, PlayMode, Playlist,
    PlaylistEntry, State, Transition, TransitionCondition, TransitionDefaults,
};
use crate::easing::Easing;
use crate::error::{check_duration, check_weight, BehaviorError};
use crate::ids::{
    AnimationId, EntryId, GroupId, IdAllocator, KeyframeId, LayerId, PlaylistId, StateId,
};
use crate::pose::Pose;

/// Ids removed by a cascading delete.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Removed {
    pub states: Vec<StateId>,
    pub animations: Vec<AnimationId>,
    pub playlists: Vec<PlaylistId>,
    pub entries: Vec<EntryId>,
}

#[derive(Debug, Default, Clone)]
pub struct BehaviorLibrary {
    ids: IdAllocator,
    groups: HashMap<GroupId, Group>,
    states: HashMap<StateId, State>,
    layers: HashMap<LayerId, Layer>,
    animations: HashMap<AnimationId, Animation>,
    playlists: HashMap<PlaylistId, Playlist>,
    group_order: Vec<GroupId>,
    layer_order: Vec<LayerId>,
}

impl BehaviorLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- lookups -----

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(&id)
    }

    pub fn playlist(&self, id: PlaylistId) -> Option<&Playlist> {
        self.playlists.get(&id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(&id)
    }

    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.get_mut(&id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn animation_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.animations.get_mut(&id)
    }

    pub fn playlist_mut(&mut self, id: PlaylistId) -> Option<&mut Playlist> {
        self.playlists.get_mut(&id)
    }

    /// Groups in creation order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    /// Layers in creation order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layer_order.iter().filter_map(|id| self.layers.get(id))
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups().find(|g| g.name == name)
    }

    /// Look up a state by name within a group.
    pub fn state_by_name(&self, group: GroupId, name: &str) -> Option<&State> {
        self.groups
            .get(&group)?
            .states
            .iter()
            .filter_map(|id| self.states.get(id))
            .find(|s| s.name == name)
    }

    pub fn playlist_for(&self, state: StateId, layer: LayerId) -> Option<&Playlist> {
        self.states
            .get(&state)?
            .playlists
            .iter()
            .filter_map(|id| self.playlists.get(id))
            .find(|p| p.layer == layer)
    }

    /// Outgoing `(target, weight)` edges of `state` in insertion order.
    pub fn transitions_from(&self, state: StateId) -> Vec<(StateId, f32)> {
        let Some(group) = self.states.get(&state).and_then(|s| self.groups.get(&s.group)) else {
            return Vec::new();
        };
        group
            .transitions_from(state)
            .map(|t| (t.to, t.weight))
            .collect()
    }

    // ----- adds -----

    pub fn add_group(&mut self, name: &str) -> GroupId {
        let id = self.ids.alloc_group();
        self.groups.insert(
            id,
            Group {
                id,
                name: name.to_string(),
                initial_state: None,
                states: Vec::new(),
                transitions: Vec::new(),
            },
        );
        self.group_order.push(id);
        id
    }

    pub fn add_state(
        &mut self,
        group: GroupId,
        name: &str,
        condition: TransitionCondition,
    ) -> Result<StateId, BehaviorError> {
        validate_condition(&condition)?;
        if !self.groups.contains_key(&group) {
            return Err(BehaviorError::GroupNotFound(group));
        }
        let id = self.ids.alloc_state();
        self.states.insert(
            id,
            State {
                id,
                group,
                name: name.to_string(),
                condition,
                playlists: Vec::new(),
            },
        );
        if let Some(g) = self.groups.get_mut(&group) {
            g.states.push(id);
        }
        Ok(id)
    }

    pub fn set_initial_state(&mut self, group: GroupId, state: StateId) -> Result<(), BehaviorError> {
        self.ensure_state_in_group(group, state)?;
        if let Some(g) = self.groups.get_mut(&group) {
            g.initial_state = Some(state);
        }
        Ok(())
    }

    pub fn set_condition(
        &mut self,
        state: StateId,
        condition: TransitionCondition,
    ) -> Result<(), BehaviorError> {
        validate_condition(&condition)?;
        let s = self
            .states
            .get_mut(&state)
            .ok_or(BehaviorError::StateNotFound(state))?;
        s.condition = condition;
        Ok(())
    }

    /// Add a weighted edge `from → to`. Both states must share a group.
    pub fn add_transition(&mut self, from: StateId, to: StateId, weight: f32) -> Result<(), BehaviorError> {
        let weight = check_weight(weight)?;
        let src = self.states.get(&from).ok_or(BehaviorError::StateNotFound(from))?;
        let dst = self.states.get(&to).ok_or(BehaviorError::StateNotFound(to))?;
        if src.group != dst.group {
            return Err(BehaviorError::CrossGroupTransition { from, to });
        }
        let group = src.group;
        let g = self
            .groups
            .get_mut(&group)
            .ok_or(BehaviorError::GroupNotFound(group))?;
        g.transitions.push(Transition { from, to, weight });
        Ok(())
    }

    pub fn add_layer(&mut self, name: &str, channels: LayerChannels) -> LayerId {
        let id = self.ids.alloc_layer();
        self.layers.insert(
            id,
            Layer {
                id,
                name: name.to_string(),
                channels,
                default_transition: TransitionDefaults::default(),
                animations: Vec::new(),
            },
        );
        self.layer_order.push(id);
        id
    }

    pub fn set_layer_transition(
        &mut self,
        layer: LayerId,
        defaults: TransitionDefaults,
    ) -> Result<(), BehaviorError> {
        check_duration(defaults.duration)?;
        let l = self
            .layers
            .get_mut(&layer)
            .ok_or(BehaviorError::LayerNotFound(layer))?;
        l.default_transition = defaults;
        Ok(())
    }

    pub fn add_animation(
        &mut self,
        layer: LayerId,
        name: &str,
        loop_mode: LoopMode,
    ) -> Result<AnimationId, BehaviorError> {
        let l = self
            .layers
            .get_mut(&layer)
            .ok_or(BehaviorError::LayerNotFound(layer))?;
        let id = self.ids.alloc_animation();
        l.animations.push(id);
        self.animations.insert(
            id,
            Animation {
                id,
                layer,
                name: name.to_string(),
                loop_mode,
                speed: 1.0,
                keyframes: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Append a keyframe to the end of an animation's sequence.
    pub fn add_keyframe(
        &mut self,
        animation: AnimationId,
        pose: Pose,
        duration: f32,
        easing: Easing,
    ) -> Result<KeyframeId, BehaviorError> {
        let duration = check_duration(duration)?;
        if !self.animations.contains_key(&animation) {
            return Err(BehaviorError::AnimationNotFound(animation));
        }
        let id = self.ids.alloc_keyframe();
        if let Some(a) = self.animations.get_mut(&animation) {
            a.keyframes.push(Keyframe {
                id,
                pose,
                duration,
                easing,
            });
        }
        Ok(id)
    }

    pub fn add_playlist(
        &mut self,
        state: StateId,
        layer: LayerId,
        mode: PlayMode,
    ) -> Result<PlaylistId, BehaviorError> {
        if !self.layers.contains_key(&layer) {
            return Err(BehaviorError::LayerNotFound(layer));
        }
        if !self.states.contains_key(&state) {
            return Err(BehaviorError::StateNotFound(state));
        }
        if self.playlist_for(state, layer).is_some() {
            return Err(BehaviorError::DuplicatePlaylist { state, layer });
        }
        let id = self.ids.alloc_playlist();
        self.playlists.insert(
            id,
            Playlist {
                id,
                state,
                layer,
                mode,
                default_timing: EntryTiming::default(),
                entries: Vec::new(),
            },
        );
        if let Some(s) = self.states.get_mut(&state) {
            s.playlists.push(id);
        }
        Ok(id)
    }

    /// Append an entry. `timing: None` takes the playlist's default timing.
    pub fn add_entry(
        &mut self,
        playlist: PlaylistId,
        animation: AnimationId,
        timing: Option<EntryTiming>,
        weight: f32,
    ) -> Result<EntryId, BehaviorError> {
        let weight = check_weight(weight)?;
        if let Some(t) = &timing {
            validate_timing(t)?;
        }
        let anim_layer = self
            .animations
            .get(&animation)
            .ok_or(BehaviorError::AnimationNotFound(animation))?
            .layer;
        let p = self
            .playlists
            .get_mut(&playlist)
            .ok_or(BehaviorError::PlaylistNotFound(playlist))?;
        if p.layer != anim_layer {
            return Err(BehaviorError::LayerMismatch {
                animation,
                expected: p.layer,
                actual: anim_layer,
            });
        }
        let id = self.ids.alloc_entry();
        p.entries.push(PlaylistEntry {
            id,
            animation,
            timing: timing.unwrap_or(p.default_timing),
            weight,
        });
        Ok(id)
    }

    // ----- cascading removes -----

    /// Remove a group, its states, their playlists and all edges.
    pub fn remove_group(&mut self, group: GroupId) -> Result<Removed, BehaviorError> {
        let g = self
            .groups
            .remove(&group)
            .ok_or(BehaviorError::GroupNotFound(group))?;
        self.group_order.retain(|id| *id != group);
        let mut removed = Removed::default();
        for state in g.states {
            if let Some(s) = self.states.remove(&state) {
                self.drop_playlists(&s.playlists, &mut removed);
                removed.states.push(state);
            }
        }
        Ok(removed)
    }

    /// Remove a state, its playlists, incoming and outgoing edges, and clear
    /// it as the group's initial state.
    pub fn remove_state(&mut self, state: StateId) -> Result<Removed, BehaviorError> {
        let s = self
            .states
            .remove(&state)
            .ok_or(BehaviorError::StateNotFound(state))?;
        let mut removed = Removed::default();
        self.drop_playlists(&s.playlists, &mut removed);
        removed.states.push(state);
        if let Some(g) = self.groups.get_mut(&s.group) {
            g.states.retain(|id| *id != state);
            g.transitions.retain(|t| t.from != state && t.to != state);
            if g.initial_state == Some(state) {
                g.initial_state = None;
            }
        }
        Ok(removed)
    }

    /// Remove a layer, its animations, and every playlist driving it.
    pub fn remove_layer(&mut self, layer: LayerId) -> Result<Removed, BehaviorError> {
        let l = self
            .layers
            .remove(&layer)
            .ok_or(BehaviorError::LayerNotFound(layer))?;
        self.layer_order.retain(|id| *id != layer);
        let mut removed = Removed::default();
        for anim in l.animations {
            if self.animations.remove(&anim).is_some() {
                removed.animations.push(anim);
            }
        }
        let mut doomed: Vec<PlaylistId> = self
            .playlists
            .values()
            .filter(|p| p.layer == layer)
            .map(|p| p.id)
            .collect();
        doomed.sort();
        self.drop_playlists(&doomed, &mut removed);
        Ok(removed)
    }

    /// Remove an animation, its keyframes, and every entry that plays it.
    pub fn remove_animation(&mut self, animation: AnimationId) -> Result<Removed, BehaviorError> {
        let a = self
            .animations
            .remove(&animation)
            .ok_or(BehaviorError::AnimationNotFound(animation))?;
        if let Some(l) = self.layers.get_mut(&a.layer) {
            l.animations.retain(|id| *id != animation);
        }
        let mut removed = Removed::default();
        removed.animations.push(animation);
        for p in self.playlists.values_mut() {
            p.entries.retain(|e| {
                if e.animation == animation {
                    removed.entries.push(e.id);
                    false
                } else {
                    true
                }
            });
        }
        removed.entries.sort();
        Ok(removed)
    }

    fn drop_playlists(&mut self, ids: &[PlaylistId], removed: &mut Removed) {
        for id in ids {
            if let Some(p) = self.playlists.remove(id) {
                if let Some(s) = self.states.get_mut(&p.state) {
                    s.playlists.retain(|pid| pid != id);
                }
                removed.entries.extend(p.entries.iter().map(|e| e.id));
                removed.playlists.push(*id);
            }
        }
    }

    fn ensure_state_in_group(&self, group: GroupId, state: StateId) -> Result<(), BehaviorError> {
        if !self.groups.contains_key(&group) {
            return Err(BehaviorError::GroupNotFound(group));
        }
        let s = self.states.get(&state).ok_or(BehaviorError::StateNotFound(state))?;
        if s.group != group {
            return Err(BehaviorError::StateNotInGroup { group, state });
        }
        Ok(())
    }

    /// Ok when `state` exists and belongs to `group`.
    pub fn check_membership(&self, group: GroupId, state: StateId) -> Result<(), BehaviorError> {
        self.ensure_state_in_group(group, state)
    }
}

fn validate_condition(c: &TransitionCondition) -> Result<(), BehaviorError> {
    match *c {
        TransitionCondition::FixedDuration(d) => check_duration(d).map(|_| ()),
        TransitionCondition::RandomDuration { min, max } => {
            check_duration(min)?;
            check_duration(max).map(|_| ())
        }
        _ => Ok(()),
    }
}

pub(crate) fn validate_timing(t: &EntryTiming) -> Result<(), BehaviorError> {
    match *t {
        EntryTiming::Fixed(d) => check_duration(d).map(|_| ()),
        EntryTiming::Random { min, max } => {
            check_duration(min)?;
            check_duration(max).map(|_| ())
        }
        _ => Ok(()),
    }
}
