//! PlaylistEntryPlayer: plays one playlist entry's animation for as long as
//! the entry's timing policy allows.

use crate::data::{EntryTiming, PlaylistEntry};
use crate::ids::{AnimationId, EntryId, PlaylistId};
use crate::library::BehaviorLibrary;
use crate::rig::CharacterRig;

use super::{AnimationPlayer, PlayerContext, RandomTarget};

#[derive(Debug, Default)]
pub struct PlaylistEntryPlayer {
    entry: Option<(PlaylistId, EntryId)>,
    /// Seconds spent on this entry, excluding synthetic in-betweens.
    time: f32,
    random: RandomTarget,
    animation: AnimationPlayer,
}

fn resolve(library: &BehaviorLibrary, (playlist, entry): (PlaylistId, EntryId)) -> Option<&PlaylistEntry> {
    library.playlist(playlist)?.entry(entry)
}

impl PlaylistEntryPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self) -> Option<EntryId> {
        self.entry.map(|(_, e)| e)
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn animation_player(&self) -> &AnimationPlayer {
        &self.animation
    }

    /// The drawn duration while the entry uses random timing.
    pub fn random_target(&self) -> Option<f32> {
        self.random.peek()
    }

    pub fn set_entry(&mut self, entry: Option<(PlaylistId, EntryId)>, ctx: &mut PlayerContext<'_>) {
        let library = ctx.library;
        self.entry = entry;
        self.time = 0.0;
        self.random.reset();

        let resolved = entry.and_then(|key| resolve(library, key));
        if let Some(e) = resolved {
            if let EntryTiming::Random { min, max } = e.timing {
                self.random.resample(min, max, ctx.rng);
            }
            log::debug!("entry {} -> animation {}", e.id, e.animation);
        } else if let Some((playlist, id)) = entry {
            log::warn!("entry {id} not found in playlist {playlist}");
        }
        self.animation
            .set_animation(resolved.map(|e| e.animation), ctx);
    }

    /// Whether the entry has played long enough. An entry that no longer
    /// resolves counts as done so the playlist moves past it.
    pub fn is_done(&mut self, ctx: &mut PlayerContext<'_>) -> bool {
        let Some(key) = self.entry else {
            return true;
        };
        let library = ctx.library;
        let Some(e) = resolve(library, key) else {
            return true;
        };
        match e.timing {
            EntryTiming::FromAnimationDuration => {
                self.animation.is_done_playing() || self.animation.cycles() > 0
            }
            EntryTiming::Infinite => false,
            EntryTiming::Fixed(d) => self.time >= d,
            EntryTiming::Random { min, max } => self.time >= self.random.get(min, max, ctx.rng),
        }
    }

    pub fn tick(&mut self, dt: f32, ctx: &mut PlayerContext<'_>, rig: &mut dyn CharacterRig) {
        if self.entry.is_none() {
            return;
        }
        if self.animation.tick(dt, ctx, rig) {
            self.time += dt;
        }
    }

    /// Stop the animation, keeping nothing of the entry.
    pub fn dispose(&mut self, ctx: &mut PlayerContext<'_>) {
        self.animation.dispose(ctx);
        self.entry = None;
        self.time = 0.0;
        self.random.reset();
    }

    /// True when the running animation is one of `animations`.
    pub(crate) fn plays_any(&self, animations: &[AnimationId]) -> bool {
        self.animation
            .animation()
            .map_or(false, |a| animations.contains(&a))
    }
}
