//! Engine: owns the authoring library and one GroupPlayer per active group.
//!
//! Methods:
//! - new, with_random_source, with_library, activate_group, play_state,
//!   update (tick every active group), delete_* (cascade + runtime cleanup)

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::BehaviorError;
use crate::hooks::Hooks;
use crate::ids::{AnimationId, GroupId, LayerId, StateId};
use crate::library::{BehaviorLibrary, Removed};
use crate::outputs::Outputs;
use crate::player::{GroupPlayer, PlayerContext};
use crate::random::{PcgRandom, RandomSource};
use crate::rig::CharacterRig;

pub struct Engine {
    cfg: Config,
    library: BehaviorLibrary,
    // Ticked in activation order.
    players: IndexMap<GroupId, GroupPlayer>,
    rng: Box<dyn RandomSource>,

    // Per-tick outputs
    outputs: Outputs,
    /// Notifications raised between updates (forced transitions, deletes),
    /// delivered with the next update.
    pending: Outputs,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cfg", &self.cfg)
            .field("library", &self.library)
            .field("players", &self.players)
            .field("outputs", &self.outputs)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        let rng = Box::new(PcgRandom::seeded(cfg.seed));
        let cap = cfg.notification_capacity;
        Self {
            cfg,
            library: BehaviorLibrary::new(),
            players: IndexMap::new(),
            rng,
            outputs: Outputs::with_capacity(cap),
            pending: Outputs::with_capacity(cap),
        }
    }

    /// Replace the random source, e.g. with a scripted one for tests.
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_library(mut self, library: BehaviorLibrary) -> Self {
        self.library = library;
        self
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn library(&self) -> &BehaviorLibrary {
        &self.library
    }

    /// Direct authoring access. Players pick up edits on the next update;
    /// deletions should go through the `delete_*` methods so active players
    /// run their exit hooks.
    pub fn library_mut(&mut self) -> &mut BehaviorLibrary {
        &mut self.library
    }

    /// Start ticking `group`. Idempotent.
    pub fn activate_group(&mut self, group: GroupId) -> Result<(), BehaviorError> {
        if self.library.group(group).is_none() {
            return Err(BehaviorError::GroupNotFound(group));
        }
        self.players
            .entry(group)
            .or_insert_with(|| GroupPlayer::new(group));
        Ok(())
    }

    /// Stop ticking `group`, exiting its active state.
    pub fn deactivate_group(&mut self, group: GroupId, hooks: &mut dyn Hooks) -> bool {
        let Some(mut player) = self.players.shift_remove(&group) else {
            return false;
        };
        let mut ctx = PlayerContext {
            library: &self.library,
            config: &self.cfg,
            hooks,
            rng: self.rng.as_mut(),
            outputs: &mut self.pending,
        };
        player.dispose(&mut ctx);
        true
    }

    pub fn group_player(&self, group: GroupId) -> Option<&GroupPlayer> {
        self.players.get(&group)
    }

    pub fn group_players(&self) -> impl Iterator<Item = &GroupPlayer> {
        self.players.values()
    }

    /// Force `group` into `state` now, activating the group if needed.
    pub fn play_state(
        &mut self,
        group: GroupId,
        state: StateId,
        hooks: &mut dyn Hooks,
    ) -> Result<(), BehaviorError> {
        self.library.check_membership(group, state)?;
        let player = self
            .players
            .entry(group)
            .or_insert_with(|| GroupPlayer::new(group));
        let mut ctx = PlayerContext {
            library: &self.library,
            config: &self.cfg,
            hooks,
            rng: self.rng.as_mut(),
            outputs: &mut self.pending,
        };
        player.play_state(state, &mut ctx)
    }

    /// Advance every active group by `dt` seconds, writing channel values to
    /// `rig`. Returns the notifications raised since the previous update.
    pub fn update(&mut self, dt: f32, rig: &mut dyn CharacterRig, hooks: &mut dyn Hooks) -> &Outputs {
        self.outputs.clear();
        self.outputs.append(&mut self.pending);

        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            if dt != 0.0 {
                log::warn!("ignoring non-positive or non-finite dt {dt}");
            }
            0.0
        };

        let mut ctx = PlayerContext {
            library: &self.library,
            config: &self.cfg,
            hooks,
            rng: self.rng.as_mut(),
            outputs: &mut self.outputs,
        };
        for player in self.players.values_mut() {
            player.tick(dt, &mut ctx, rig);
        }
        &self.outputs
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    // ----- cascading deletes -----

    /// Remove a group with its states and playlists, disposing its player.
    pub fn delete_group(&mut self, group: GroupId, hooks: &mut dyn Hooks) -> Result<Removed, BehaviorError> {
        let removed = self.library.remove_group(group)?;
        self.deactivate_group(group, hooks);
        Ok(removed)
    }

    pub fn delete_state(&mut self, state: StateId, hooks: &mut dyn Hooks) -> Result<Removed, BehaviorError> {
        let removed = self.library.remove_state(state)?;
        self.prune(&removed, hooks);
        Ok(removed)
    }

    pub fn delete_layer(&mut self, layer: LayerId, hooks: &mut dyn Hooks) -> Result<Removed, BehaviorError> {
        let removed = self.library.remove_layer(layer)?;
        self.prune(&removed, hooks);
        Ok(removed)
    }

    pub fn delete_animation(
        &mut self,
        animation: AnimationId,
        hooks: &mut dyn Hooks,
    ) -> Result<Removed, BehaviorError> {
        let removed = self.library.remove_animation(animation)?;
        self.prune(&removed, hooks);
        Ok(removed)
    }

    fn prune(&mut self, removed: &Removed, hooks: &mut dyn Hooks) {
        log::debug!(
            "pruning players: {} states, {} playlists, {} entries, {} animations",
            removed.states.len(),
            removed.playlists.len(),
            removed.entries.len(),
            removed.animations.len()
        );
        let mut ctx = PlayerContext {
            library: &self.library,
            config: &self.cfg,
            hooks,
            rng: self.rng.as_mut(),
            outputs: &mut self.pending,
        };
        for player in self.players.values_mut() {
            player.prune(removed, &mut ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransitionCondition;
    use crate::hooks::{HookCall, HookTarget, NoopHooks, RecordingHooks};
    use crate::outputs::Notification;
    use crate::random::SequenceRandom;
    use crate::rig::MemoryRig;

    fn engine() -> (Engine, GroupId, StateId, StateId) {
        let mut e = Engine::default().with_random_source(SequenceRandom::new(vec![0.0]));
        let lib = e.library_mut();
        let g = lib.add_group("G");
        let s1 = lib
            .add_state(g, "S1", TransitionCondition::FixedDuration(2.0))
            .unwrap();
        let s2 = lib.add_state(g, "S2", TransitionCondition::None).unwrap();
        lib.set_initial_state(g, s1).unwrap();
        lib.add_transition(s1, s2, 1.0).unwrap();
        (e, g, s1, s2)
    }

    #[test]
    fn inactive_groups_do_not_tick() {
        let (mut e, g, _, _) = engine();
        let mut rig = MemoryRig::new();
        assert!(e.update(1.0, &mut rig, &mut NoopHooks).is_empty());
        assert!(e.group_player(g).is_none());
    }

    #[test]
    fn activate_unknown_group_fails() {
        let mut e = Engine::default();
        assert_eq!(
            e.activate_group(GroupId(42)),
            Err(BehaviorError::GroupNotFound(GroupId(42)))
        );
    }

    #[test]
    fn outputs_clear_between_updates() {
        let (mut e, g, s1, _) = engine();
        e.activate_group(g).unwrap();
        let mut rig = MemoryRig::new();
        let out = e.update(0.5, &mut rig, &mut NoopHooks);
        assert_eq!(out.notifications.len(), 1);
        assert_eq!(out.notifications[0].state(), s1);
        assert!(e.update(0.5, &mut rig, &mut NoopHooks).is_empty());
    }

    #[test]
    fn forced_transition_is_reported_on_next_update() {
        let (mut e, g, s1, s2) = engine();
        let mut rig = MemoryRig::new();
        e.activate_group(g).unwrap();
        e.update(0.5, &mut rig, &mut NoopHooks);

        e.play_state(g, s2, &mut NoopHooks).unwrap();
        assert_eq!(e.outputs().notifications.len(), 1);
        let out = e.update(0.0, &mut rig, &mut NoopHooks);
        assert_eq!(
            out.notifications,
            vec![
                Notification::StateExited {
                    group: g,
                    state: s1,
                    name: "S1".into()
                },
                Notification::StateEntered {
                    group: g,
                    state: s2,
                    name: "S2".into()
                },
            ]
        );
    }

    #[test]
    fn play_state_activates_group() {
        let (mut e, g, _, s2) = engine();
        e.play_state(g, s2, &mut NoopHooks).unwrap();
        assert_eq!(e.group_player(g).and_then(GroupPlayer::current_state), Some(s2));
    }

    #[test]
    fn delete_group_disposes_player() {
        let (mut e, g, s1, _) = engine();
        let mut rig = MemoryRig::new();
        let mut hooks = RecordingHooks::new();
        e.activate_group(g).unwrap();
        e.update(0.5, &mut rig, &mut hooks);

        let removed = e.delete_group(g, &mut hooks).unwrap();
        assert_eq!(removed.states.len(), 2);
        assert!(e.group_player(g).is_none());
        assert_eq!(
            hooks.transitions().last(),
            Some(&HookCall::exit(HookTarget::State(s1)))
        );
        let out = e.update(0.5, &mut rig, &mut hooks);
        assert!(matches!(
            out.notifications.as_slice(),
            [Notification::StateExited { state, .. }] if *state == s1
        ));
    }

    #[test]
    fn delete_active_state_falls_back_to_initial() {
        let (mut e, g, s1, s2) = engine();
        let mut rig = MemoryRig::new();
        e.activate_group(g).unwrap();
        e.play_state(g, s2, &mut NoopHooks).unwrap();
        e.delete_state(s2, &mut NoopHooks).unwrap();
        assert_eq!(e.group_player(g).and_then(GroupPlayer::current_state), None);
        e.update(0.1, &mut rig, &mut NoopHooks);
        assert_eq!(e.group_player(g).and_then(GroupPlayer::current_state), Some(s1));
    }

    #[test]
    fn negative_dt_is_ignored() {
        let (mut e, g, _, _) = engine();
        let mut rig = MemoryRig::new();
        e.activate_group(g).unwrap();
        e.update(0.5, &mut rig, &mut NoopHooks);
        e.update(-3.0, &mut rig, &mut NoopHooks);
        e.update(f32::NAN, &mut rig, &mut NoopHooks);
        let time = e.group_player(g).unwrap().state_player().time();
        assert_eq!(time, 0.5);
    }
}
