//! PlaylistPlayer: picks the next entry of a (state, layer) playlist whenever
//! the current one finishes.

use crate::data::{PlayMode, Playlist};
use crate::ids::{EntryId, PlaylistId};
use crate::library::Removed;
use crate::rig::CharacterRig;
use crate::select::choose_index;

use super::{PlayerContext, PlaylistEntryPlayer};

#[derive(Debug)]
pub struct PlaylistPlayer {
    playlist: PlaylistId,
    index: Option<usize>,
    completed: bool,
    completions: u32,
    mode: Option<PlayMode>,
    entry: PlaylistEntryPlayer,
}

impl PlaylistPlayer {
    pub fn new(playlist: PlaylistId) -> Self {
        Self {
            playlist,
            index: None,
            completed: false,
            completions: 0,
            mode: None,
            entry: PlaylistEntryPlayer::new(),
        }
    }

    pub fn playlist(&self) -> PlaylistId {
        self.playlist
    }

    /// Position of the current entry at the time it was picked.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current_entry(&self) -> Option<EntryId> {
        self.entry.entry()
    }

    pub fn entry_player(&self) -> &PlaylistEntryPlayer {
        &self.entry
    }

    /// Set on the first sequential wrap from the last entry back to the first
    /// and kept until the play mode changes.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Number of sequential wraps since the play mode last changed.
    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub fn tick(&mut self, dt: f32, ctx: &mut PlayerContext<'_>, rig: &mut dyn CharacterRig) {
        let library = ctx.library;
        let Some(pl) = library.playlist(self.playlist) else {
            if self.entry.entry().is_some() {
                log::warn!("playlist {} was removed; player idles", self.playlist);
                self.entry.dispose(ctx);
            }
            return;
        };
        if self.mode != Some(pl.mode) {
            self.completed = false;
            self.completions = 0;
            self.mode = Some(pl.mode);
        }
        if pl.entries.is_empty() {
            if self.entry.entry().is_some() {
                self.entry.dispose(ctx);
            }
            self.index = None;
            return;
        }
        if self.entry.entry().is_none() || self.entry.is_done(ctx) {
            self.advance(pl, ctx);
        }
        self.entry.tick(dt, ctx, rig);
    }

    fn advance(&mut self, pl: &Playlist, ctx: &mut PlayerContext<'_>) {
        let len = pl.entries.len();
        let next = match pl.mode {
            PlayMode::Sequential => {
                let position = self.entry.entry().and_then(|id| pl.entry_index(id));
                // A removed entry leaves its successor at the old index.
                let mut next = match (position, self.index) {
                    (Some(i), _) => i + 1,
                    (None, Some(i)) => i,
                    (None, None) => 0,
                };
                if next >= len {
                    next = 0;
                    if self.index.is_some() {
                        self.completed = true;
                        self.completions += 1;
                    }
                }
                next
            }
            PlayMode::Random => {
                let weights: Vec<f32> = pl.entries.iter().map(|e| e.weight).collect();
                choose_index(&weights, ctx.rng).unwrap_or(0)
            }
        };
        self.index = Some(next);
        self.entry.set_entry(Some((pl.id, pl.entries[next].id)), ctx);
    }

    pub fn dispose(&mut self, ctx: &mut PlayerContext<'_>) {
        self.entry.dispose(ctx);
        self.index = None;
    }

    /// Stop the current entry if it, or the animation it plays, was removed.
    /// The next tick picks the entry that took its place.
    pub(crate) fn prune(&mut self, removed: &Removed, ctx: &mut PlayerContext<'_>) {
        let gone = self
            .entry
            .entry()
            .map_or(false, |id| removed.entries.contains(&id))
            || self.entry.plays_any(&removed.animations);
        if gone {
            self.entry.dispose(ctx);
        }
    }
}
