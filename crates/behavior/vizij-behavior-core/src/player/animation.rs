//! AnimationPlayer: walks an animation's keyframes under its loop mode and
//! feeds each (current, target) pair to a KeyframePlayer.

use crate::data::LoopMode;
use crate::hooks::{HookCall, HookTarget};
use crate::ids::AnimationId;
use crate::rig::CharacterRig;

use super::{clamp01, KeyframePlayer, PlayerContext};

#[derive(Debug, Default)]
pub struct AnimationPlayer {
    animation: Option<AnimationId>,
    /// Animation time in speed-scaled seconds since the cycle started.
    time: f32,
    progress: f32,
    done_playing: bool,
    reverse: bool,
    index: Option<usize>,
    /// Completed passes (loop wraps, ping-pong round trips, or the single
    /// pass of a play-once animation).
    cycles: u32,
    keyframes: Option<KeyframePlayer>,
    missing_logged: bool,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animation(&self) -> Option<AnimationId> {
        self.animation
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_done_playing(&self) -> bool {
        self.done_playing
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn keyframe_index(&self) -> Option<usize> {
        self.index
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn keyframe_player(&self) -> Option<&KeyframePlayer> {
        self.keyframes.as_ref()
    }

    pub fn in_temporary_transition(&self) -> bool {
        self.keyframes
            .as_ref()
            .map_or(false, KeyframePlayer::in_temporary_transition)
    }

    /// Switch to `animation`, tearing down the old keyframe player. The old
    /// animation exits before the new one enters.
    pub fn set_animation(&mut self, animation: Option<AnimationId>, ctx: &mut PlayerContext<'_>) {
        self.dispose(ctx);
        let Some(id) = animation else {
            return;
        };
        let library = ctx.library;
        let Some(anim) = library.animation(id) else {
            log::warn!("animation {id} not found; player idles");
            return;
        };
        self.animation = Some(id);
        self.keyframes = Some(KeyframePlayer::new(anim.layer));
        ctx.hook(HookCall::enter(HookTarget::Animation(id)));
    }

    /// Exit the current keyframe and animation and reset all counters.
    pub fn dispose(&mut self, ctx: &mut PlayerContext<'_>) {
        if let Some(kp) = self.keyframes.as_mut() {
            kp.dispose(ctx);
        }
        if let Some(id) = self.animation {
            ctx.hook(HookCall::exit(HookTarget::Animation(id)));
        }
        *self = Self::default();
    }

    /// Advance by `dt` seconds. Returns false when this tick was spent on a
    /// synthetic in-between, so parents can hold their own timers.
    pub fn tick(&mut self, dt: f32, ctx: &mut PlayerContext<'_>, rig: &mut dyn CharacterRig) -> bool {
        let Some(id) = self.animation else {
            return true;
        };
        let library = ctx.library;
        let Some(anim) = library.animation(id) else {
            if !self.missing_logged {
                log::warn!("animation {id} was removed; player idles");
                self.missing_logged = true;
            }
            return true;
        };
        if self.done_playing && anim.loop_mode == LoopMode::Once {
            return true;
        }
        let count = anim.keyframes.len();
        if count == 0 {
            return true;
        }

        let kp = self
            .keyframes
            .get_or_insert_with(|| KeyframePlayer::new(anim.layer));
        match self.index {
            None => {
                self.index = Some(0);
                kp.set_target(&anim.keyframes[0], true, false, ctx);
            }
            Some(i) if i >= count => {
                // keyframes were removed under us; resume from the new end
                self.index = Some(count - 1);
                kp.set_target(&anim.keyframes[count - 1], false, self.reverse, ctx);
            }
            Some(_) => {}
        }

        let counted = !kp.in_temporary_transition();
        let speed = anim.speed.max(0.0);
        kp.tick(dt, speed, self.reverse, ctx, rig);
        if counted {
            self.time += dt * speed;
        }

        let span = anim.span();
        self.progress = if span <= 0.0 {
            0.0
        } else if anim.loop_mode == LoopMode::PingPong && self.reverse {
            1.0 - clamp01((self.time - span) / span)
        } else {
            clamp01(self.time / span)
        };
        ctx.hook(HookCall::playing(HookTarget::Animation(id), self.progress));

        if !kp.is_done(ctx.config) {
            return counted;
        }

        let i = self.index.unwrap_or(0);
        let mut restart = false;
        let next = match anim.loop_mode {
            LoopMode::Once => {
                if i + 1 >= count {
                    self.done_playing = true;
                    self.progress = 1.0;
                    self.cycles += 1;
                    None
                } else {
                    Some(i + 1)
                }
            }
            LoopMode::Loop => {
                let n = (i + 1) % count;
                restart = n == 0;
                Some(n)
            }
            LoopMode::PingPong => {
                if count == 1 {
                    restart = true;
                    Some(0)
                } else if !self.reverse {
                    if i + 1 >= count {
                        self.reverse = true;
                        Some(count - 2)
                    } else {
                        Some(i + 1)
                    }
                } else if i == 0 {
                    self.reverse = false;
                    restart = true;
                    Some(1)
                } else {
                    Some(i - 1)
                }
            }
        };
        if restart {
            self.time = 0.0;
            self.progress = 0.0;
            self.cycles += 1;
        }
        if let Some(n) = next {
            self.index = Some(n);
            kp.set_target(&anim.keyframes[n], false, self.reverse, ctx);
        }
        counted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransitionDefaults;
    use crate::easing::Easing;
    use crate::hooks::Lifecycle;
    use crate::ids::LayerId;
    use crate::library::BehaviorLibrary;
    use crate::player::test_support::{scalar_animation, Harness, MORPH};
    use crate::rig::MemoryRig;
    use approx::assert_relative_eq;

    fn setup(mode: LoopMode, n: usize) -> (BehaviorLibrary, LayerId, AnimationId) {
        let mut lib = BehaviorLibrary::new();
        let values: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let (layer, anim) = scalar_animation(&mut lib, mode, &values, 1.0);
        lib.set_layer_transition(
            layer,
            TransitionDefaults {
                duration: 0.5,
                easing: Easing::Linear,
            },
        )
        .unwrap();
        (lib, layer, anim)
    }

    /// Run the synthetic lead-in, then one tick per keyframe segment,
    /// recording the keyframe index after each tick.
    fn walk(mode: LoopMode, n: usize, steps: usize) -> (AnimationPlayer, Vec<usize>) {
        let (lib, _, anim) = setup(mode, n);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        ap.tick(0.5, &mut h.ctx(&lib), &mut rig);
        let mut seen = vec![];
        for _ in 0..steps {
            ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
            seen.push(ap.keyframe_index().unwrap());
        }
        (ap, seen)
    }

    #[test]
    fn lead_in_is_not_counted() {
        let (lib, _, anim) = setup(LoopMode::Loop, 3);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 5.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        assert!(!ap.tick(0.25, &mut h.ctx(&lib), &mut rig));
        assert!(ap.in_temporary_transition());
        assert_eq!(ap.time(), 0.0);
        assert_relative_eq!(rig.scalars[&MORPH], 2.5, epsilon = 1e-6);
        assert!(!ap.tick(0.25, &mut h.ctx(&lib), &mut rig));
        assert_eq!(ap.keyframe_index(), Some(1));
        assert!(ap.tick(0.25, &mut h.ctx(&lib), &mut rig));
        assert_eq!(ap.time(), 0.25);
    }

    #[test]
    fn loop_wraps_and_restarts_cycle() {
        let (lib, _, anim) = setup(LoopMode::Loop, 3);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        ap.tick(0.5, &mut h.ctx(&lib), &mut rig);
        assert_eq!(ap.keyframe_index(), Some(1));

        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert_eq!(ap.keyframe_index(), Some(2));
        assert_eq!(ap.time(), 1.0);
        assert_relative_eq!(ap.progress(), 1.0 / 3.0, epsilon = 1e-6);

        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert_eq!(ap.keyframe_index(), Some(0));
        assert_eq!(ap.time(), 0.0);
        assert_eq!(ap.progress(), 0.0);
        assert_eq!(ap.cycles(), 1);

        for _ in 0..20 {
            ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
            assert!(!ap.is_done_playing());
        }
    }

    #[test]
    fn once_holds_last_keyframe() {
        let (ap, seen) = walk(LoopMode::Once, 3, 6);
        assert_eq!(seen, vec![2, 2, 2, 2, 2, 2]);
        assert!(ap.is_done_playing());
        assert_eq!(ap.progress(), 1.0);
        assert_eq!(ap.cycles(), 1);
    }

    #[test]
    fn once_sets_done_on_reaching_last_index() {
        let (lib, _, anim) = setup(LoopMode::Once, 3);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        ap.tick(0.5, &mut h.ctx(&lib), &mut rig);
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert_eq!(ap.keyframe_index(), Some(2));
        assert!(!ap.is_done_playing());
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert!(ap.is_done_playing());
        assert_relative_eq!(rig.scalars[&MORPH], 2.0, epsilon = 1e-6);

        let writes = rig.writes;
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert_eq!(ap.keyframe_index(), Some(2));
        assert_eq!(rig.writes, writes);
    }

    #[test]
    fn ping_pong_flips_at_both_ends() {
        let (_, seen) = walk(LoopMode::PingPong, 4, 9);
        assert_eq!(seen, vec![2, 3, 2, 1, 0, 1, 2, 3, 2]);
    }

    #[test]
    fn ping_pong_with_two_keyframes_oscillates() {
        let (ap, seen) = walk(LoopMode::PingPong, 2, 5);
        assert_eq!(seen, vec![0, 1, 0, 1, 0]);
        assert!(!ap.is_done_playing());
    }

    #[test]
    fn ping_pong_progress_inverts_on_the_way_back() {
        let (lib, _, anim) = setup(LoopMode::PingPong, 3);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        ap.tick(0.5, &mut h.ctx(&lib), &mut rig);
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert_relative_eq!(ap.progress(), 0.5, epsilon = 1e-6);
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert!(ap.is_reverse());
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        // 3s in, 1s into the backward half of a 2s span
        assert_relative_eq!(ap.progress(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn speed_scales_keyframe_and_animation_time() {
        let (mut lib, _, anim) = setup(LoopMode::Loop, 3);
        lib.animation_mut(anim).unwrap().speed = 2.0;
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        ap.tick(0.25, &mut h.ctx(&lib), &mut rig);
        assert_eq!(ap.keyframe_index(), Some(1));
        ap.tick(0.5, &mut h.ctx(&lib), &mut rig);
        assert_eq!(ap.keyframe_index(), Some(2));
        assert_eq!(ap.time(), 1.0);
    }

    #[test]
    fn empty_animation_never_targets() {
        let (lib, _, anim) = setup(LoopMode::Loop, 0);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new();
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        for _ in 0..5 {
            ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        }
        assert_eq!(ap.progress(), 0.0);
        assert_eq!(ap.keyframe_index(), None);
        assert_eq!(rig.writes, 0);
    }

    #[test]
    fn switching_exits_old_before_entering_new() {
        let (mut lib, layer, a) = setup(LoopMode::Loop, 2);
        let b = lib.add_animation(layer, "b", LoopMode::Loop).unwrap();
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(a), &mut h.ctx(&lib));
        ap.tick(0.1, &mut h.ctx(&lib), &mut rig);
        ap.set_animation(Some(b), &mut h.ctx(&lib));

        let k0 = lib.animation(a).unwrap().keyframes[0].id;
        assert_eq!(
            h.hooks.transitions(),
            vec![
                HookCall::enter(HookTarget::Animation(a)),
                HookCall::enter(HookTarget::Keyframe(k0)),
                HookCall::exit(HookTarget::Keyframe(k0)),
                HookCall::exit(HookTarget::Animation(a)),
                HookCall::enter(HookTarget::Animation(b)),
            ]
        );
        assert_eq!(ap.animation(), Some(b));
        assert_eq!(ap.time(), 0.0);
        assert!(
            h.hooks
                .calls_for(HookTarget::Animation(a))
                .contains(&Lifecycle::Playing { progress: 0.0 })
        );
    }

    #[test]
    fn removed_animation_idles() {
        let (mut lib, _, anim) = setup(LoopMode::Loop, 2);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        lib.remove_animation(anim).unwrap();
        assert!(ap.tick(1.0, &mut h.ctx(&lib), &mut rig));
        assert_eq!(rig.writes, 0);
    }

    #[test]
    fn unknown_animation_fires_no_hooks() {
        let lib = BehaviorLibrary::new();
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new();
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(AnimationId(777)), &mut h.ctx(&lib));
        assert_eq!(ap.animation(), None);
        assert!(ap.tick(1.0, &mut h.ctx(&lib), &mut rig));
        ap.dispose(&mut h.ctx(&lib));
        assert!(h.hooks.calls.is_empty());
    }

    #[test]
    fn zero_duration_keyframes_advance_once_per_tick() {
        let mut lib = BehaviorLibrary::new();
        let (layer, anim) = scalar_animation(&mut lib, LoopMode::Loop, &[0.0, 1.0, 2.0], 0.0);
        lib.set_layer_transition(
            layer,
            TransitionDefaults {
                duration: 0.0,
                easing: Easing::Linear,
            },
        )
        .unwrap();
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));

        let mut seen = vec![];
        for _ in 0..6 {
            ap.tick(0.1, &mut h.ctx(&lib), &mut rig);
            seen.push(ap.keyframe_index().unwrap());
            assert!(ap.progress().is_finite());
            assert!(rig.scalars[&MORPH].is_finite());
        }
        assert_eq!(seen, vec![1, 2, 0, 1, 2, 0]);
        assert_eq!(ap.cycles(), 2);
    }

    #[test]
    fn dispose_while_reversing_exits_the_entered_keyframe() {
        let (lib, _, anim) = setup(LoopMode::PingPong, 3);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut ap = AnimationPlayer::new();
        ap.set_animation(Some(anim), &mut h.ctx(&lib));
        ap.tick(0.5, &mut h.ctx(&lib), &mut rig);
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        ap.tick(1.0, &mut h.ctx(&lib), &mut rig);
        assert!(ap.is_reverse());
        assert_eq!(ap.keyframe_index(), Some(1));
        ap.tick(0.5, &mut h.ctx(&lib), &mut rig);

        let k2 = lib.animation(anim).unwrap().keyframes[2].id;
        h.hooks.clear();
        ap.dispose(&mut h.ctx(&lib));
        assert_eq!(
            h.hooks.transitions(),
            vec![
                HookCall::exit(HookTarget::Keyframe(k2)),
                HookCall::exit(HookTarget::Animation(anim)),
            ]
        );
    }
}
