//! StatePlayer: runs the playlists of the active state and decides when the
//! state is ready to hand over.

use crate::data::TransitionCondition;
use crate::hooks::{HookCall, HookTarget};
use crate::ids::{GroupId, StateId};
use crate::library::Removed;
use crate::outputs::Notification;
use crate::rig::CharacterRig;

use super::{PlayerContext, PlaylistPlayer, RandomTarget};

#[derive(Debug)]
pub struct StatePlayer {
    group: GroupId,
    state: Option<StateId>,
    /// Name captured on entry so the exit notification survives deletion.
    name: String,
    time: f32,
    random: RandomTarget,
    playlists: Vec<PlaylistPlayer>,
    missing_logged: bool,
}

impl StatePlayer {
    pub fn new(group: GroupId) -> Self {
        Self {
            group,
            state: None,
            name: String::new(),
            time: 0.0,
            random: RandomTarget::default(),
            playlists: Vec::new(),
            missing_logged: false,
        }
    }

    pub fn state(&self) -> Option<StateId> {
        self.state
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn playlists(&self) -> &[PlaylistPlayer] {
        &self.playlists
    }

    /// The drawn duration while the state uses a random condition.
    pub fn random_target(&self) -> Option<f32> {
        self.random.peek()
    }

    /// Leave the current state and enter `state`.
    ///
    /// The old playlists are disposed first, then the old state exits and
    /// the new state enters, and finally one playlist player is built per
    /// playlist of the new state.
    pub fn set_state(&mut self, state: Option<StateId>, ctx: &mut PlayerContext<'_>) {
        for p in &mut self.playlists {
            p.dispose(ctx);
        }
        self.playlists.clear();

        if let Some(old) = self.state.take() {
            ctx.hook(HookCall::exit(HookTarget::State(old)));
            ctx.notify(Notification::StateExited {
                group: self.group,
                state: old,
                name: std::mem::take(&mut self.name),
            });
        }
        self.time = 0.0;
        self.random.reset();
        self.missing_logged = false;

        let Some(id) = state else {
            return;
        };
        let library = ctx.library;
        let Some(s) = library.state(id) else {
            log::warn!("state {id} not found; group {} idles", self.group);
            return;
        };
        log::debug!("group {}: enter state {} ({})", self.group, id, s.name);
        self.state = Some(id);
        self.name = s.name.clone();
        ctx.hook(HookCall::enter(HookTarget::State(id)));
        ctx.notify(Notification::StateEntered {
            group: self.group,
            state: id,
            name: s.name.clone(),
        });
        if let TransitionCondition::RandomDuration { min, max } = s.condition {
            self.random.resample(min, max, ctx.rng);
        }
        self.playlists = s.playlists.iter().copied().map(PlaylistPlayer::new).collect();
    }

    /// Whether the state's transition condition is met.
    pub fn is_done(&mut self, ctx: &mut PlayerContext<'_>) -> bool {
        let library = ctx.library;
        let Some(s) = self.state.and_then(|id| library.state(id)) else {
            return false;
        };
        match s.condition {
            TransitionCondition::None => false,
            TransitionCondition::PlaylistCompleted => {
                !self.playlists.is_empty() && self.playlists.iter().all(PlaylistPlayer::is_completed)
            }
            TransitionCondition::FixedDuration(d) => self.time >= d,
            TransitionCondition::RandomDuration { min, max } => {
                self.time >= self.random.get(min, max, ctx.rng)
            }
        }
    }

    pub fn tick(&mut self, dt: f32, ctx: &mut PlayerContext<'_>, rig: &mut dyn CharacterRig) {
        let Some(id) = self.state else {
            return;
        };
        let library = ctx.library;
        let Some(s) = library.state(id) else {
            if !self.missing_logged {
                log::warn!("state {id} was removed; group {} idles", self.group);
                self.missing_logged = true;
            }
            return;
        };
        self.time += dt;

        // Follow playlists added to or removed from the state since entry.
        self.playlists.retain_mut(|p| {
            if s.playlists.contains(&p.playlist()) {
                true
            } else {
                p.dispose(ctx);
                false
            }
        });
        for pid in &s.playlists {
            if !self.playlists.iter().any(|p| p.playlist() == *pid) {
                self.playlists.push(PlaylistPlayer::new(*pid));
            }
        }

        for p in &mut self.playlists {
            p.tick(dt, ctx, rig);
        }
    }

    /// Drop whatever `removed` took out from under this player. Removing the
    /// active state exits it.
    pub(crate) fn prune(&mut self, removed: &Removed, ctx: &mut PlayerContext<'_>) {
        if self.state.map_or(false, |id| removed.states.contains(&id)) {
            self.set_state(None, ctx);
            return;
        }
        self.playlists.retain_mut(|p| {
            if removed.playlists.contains(&p.playlist()) {
                p.dispose(ctx);
                false
            } else {
                p.prune(removed, ctx);
                true
            }
        });
    }
}
