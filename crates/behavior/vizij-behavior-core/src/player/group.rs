//! GroupPlayer: top of the chain. Activates the initial state, ticks the
//! active state and moves along a weighted outgoing edge once it is done.

use crate::error::BehaviorError;
use crate::ids::{GroupId, StateId};
use crate::library::Removed;
use crate::rig::CharacterRig;
use crate::select::choose;

use super::{PlayerContext, StatePlayer};

#[derive(Debug)]
pub struct GroupPlayer {
    group: GroupId,
    state: StatePlayer,
    missing_logged: bool,
}

impl GroupPlayer {
    pub fn new(group: GroupId) -> Self {
        Self {
            group,
            state: StatePlayer::new(group),
            missing_logged: false,
        }
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.state.state()
    }

    pub fn state_player(&self) -> &StatePlayer {
        &self.state
    }

    pub fn tick(&mut self, dt: f32, ctx: &mut PlayerContext<'_>, rig: &mut dyn CharacterRig) {
        let library = ctx.library;
        let Some(group) = library.group(self.group) else {
            if !self.missing_logged {
                log::warn!("group {} not found; player idles", self.group);
                self.missing_logged = true;
            }
            return;
        };
        if self.state.state().is_none() {
            let Some(initial) = group.initial_state else {
                return;
            };
            self.state.set_state(Some(initial), ctx);
        }

        self.state.tick(dt, ctx, rig);

        if !self.state.is_done(ctx) {
            return;
        }
        let Some(current) = self.state.state() else {
            return;
        };
        let edges = library.transitions_from(current);
        if let Some(next) = choose(&edges, ctx.rng).copied() {
            log::debug!("group {}: {} -> {}", self.group, current, next);
            self.state.set_state(Some(next), ctx);
        }
    }

    /// Switch to `state` immediately, whatever the current state's condition
    /// says. Playing the active state again restarts it.
    pub fn play_state(&mut self, state: StateId, ctx: &mut PlayerContext<'_>) -> Result<(), BehaviorError> {
        ctx.library.check_membership(self.group, state)?;
        log::debug!("group {}: forced -> {}", self.group, state);
        self.state.set_state(Some(state), ctx);
        Ok(())
    }

    /// Exit the active state and everything beneath it.
    pub fn dispose(&mut self, ctx: &mut PlayerContext<'_>) {
        self.state.set_state(None, ctx);
    }

    pub(crate) fn prune(&mut self, removed: &Removed, ctx: &mut PlayerContext<'_>) {
        self.state.prune(removed, ctx);
    }
}
