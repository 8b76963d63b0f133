//! KeyframePlayer: interpolates a layer's channels from the current pose to
//! the target keyframe over one segment.

use crate::config::Config;
use crate::data::{Keyframe, TransitionDefaults};
use crate::easing::Easing;
use crate::hooks::{HookCall, HookTarget};
use crate::ids::{KeyframeId, LayerId};
use crate::pose::{apply_blend, capture_pose, Pose};
use crate::rig::CharacterRig;

use super::{clamp01, PlayerContext};

/// One side of a segment: an authored keyframe, or a synthetic pose captured
/// from the live rig (`keyframe == None`).
#[derive(Clone, Debug, PartialEq)]
pub struct ActivePose {
    pub keyframe: Option<KeyframeId>,
    pub pose: Pose,
    pub duration: f32,
    pub easing: Easing,
}

impl ActivePose {
    pub fn authored(kf: &Keyframe) -> Self {
        Self {
            keyframe: Some(kf.id),
            pose: kf.pose.clone(),
            duration: kf.duration,
            easing: kf.easing,
        }
    }

    pub fn synthetic(pose: Pose, defaults: TransitionDefaults) -> Self {
        Self {
            keyframe: None,
            pose,
            duration: defaults.duration,
            easing: defaults.easing,
        }
    }

    #[inline]
    pub fn is_temporary(&self) -> bool {
        self.keyframe.is_none()
    }
}

#[derive(Debug)]
pub struct KeyframePlayer {
    layer: LayerId,
    current: Option<ActivePose>,
    target: Option<ActivePose>,
    elapsed: f32,
    reverse: bool,
}

impl KeyframePlayer {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            current: None,
            target: None,
            elapsed: 0.0,
            reverse: false,
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn current(&self) -> Option<&ActivePose> {
        self.current.as_ref()
    }

    pub fn target(&self) -> Option<&ActivePose> {
        self.target.as_ref()
    }

    pub fn target_keyframe(&self) -> Option<KeyframeId> {
        self.target.as_ref().and_then(|t| t.keyframe)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Aim at `kf`. The old target becomes the segment's source unless
    /// `fresh_entry` is set, in which case the source is captured from the
    /// live rig on the next tick.
    ///
    /// Forward: the old target exits and `kf` enters. Reverse mirrors this:
    /// the old target gets its enter hook and `kf` its exit hook.
    pub fn set_target(
        &mut self,
        kf: &Keyframe,
        fresh_entry: bool,
        reverse: bool,
        ctx: &mut PlayerContext<'_>,
    ) {
        let old = self.target.take();
        if let Some(id) = old.as_ref().and_then(|o| o.keyframe) {
            let target = HookTarget::Keyframe(id);
            ctx.hook(if reverse {
                HookCall::enter(target)
            } else {
                HookCall::exit(target)
            });
        }
        let target = HookTarget::Keyframe(kf.id);
        ctx.hook(if reverse {
            HookCall::exit(target)
        } else {
            HookCall::enter(target)
        });
        log::trace!("layer {}: keyframe target -> {}", self.layer, kf.id);

        self.current = if fresh_entry { None } else { old };
        self.target = Some(ActivePose::authored(kf));
        self.elapsed = 0.0;
        self.reverse = reverse;
    }

    /// True while the segment starts from a synthetic pose (or is about to
    /// capture one). Parent timers hold still during this in-between.
    pub fn in_temporary_transition(&self) -> bool {
        self.target.is_some() && self.current.as_ref().map_or(true, ActivePose::is_temporary)
    }

    /// Seconds the current segment lasts. Forward segments use the source's
    /// duration; reverse segments replay the target's authored segment.
    fn span(&self, cfg: &Config) -> Option<f32> {
        let (current, target) = (self.current.as_ref()?, self.target.as_ref()?);
        let authored = if self.reverse && !current.is_temporary() {
            target.duration
        } else {
            current.duration
        };
        Some(cfg.duration(authored))
    }

    pub fn is_done(&self, cfg: &Config) -> bool {
        self.span(cfg).map_or(false, |span| self.elapsed >= span)
    }

    /// Normalized position within the current segment.
    pub fn progress(&self, cfg: &Config) -> f32 {
        self.span(cfg)
            .map_or(0.0, |span| clamp01(self.elapsed / span))
    }

    pub fn tick(
        &mut self,
        dt: f32,
        speed: f32,
        reverse: bool,
        ctx: &mut PlayerContext<'_>,
        rig: &mut dyn CharacterRig,
    ) {
        if self.target.is_none() {
            return;
        }
        let library = ctx.library;
        let Some(layer) = library.layer(self.layer) else {
            return;
        };
        self.reverse = reverse;
        if self.current.is_none() {
            let pose = capture_pose(layer, rig);
            self.current = Some(ActivePose::synthetic(pose, layer.default_transition));
            self.elapsed = 0.0;
        }

        self.elapsed += (dt * speed).max(0.0);
        let x = self.progress(ctx.config);

        let (Some(current), Some(target)) = (&self.current, &self.target) else {
            return;
        };
        if self.reverse && !current.is_temporary() {
            let eased = target.easing.apply(1.0 - x);
            apply_blend(layer, &target.pose, &current.pose, eased, rig);
        } else {
            let eased = current.easing.apply(x);
            apply_blend(layer, &current.pose, &target.pose, eased, rig);
        }

        if let Some(id) = current.keyframe {
            ctx.hook(HookCall::playing(HookTarget::Keyframe(id), x));
        }
    }

    /// Tear down. Going forward the target exits; in reverse the source
    /// keyframe got the enter hook, so it is the one that exits.
    pub fn dispose(&mut self, ctx: &mut PlayerContext<'_>) {
        let entered = if self.reverse {
            self.current.as_ref().and_then(|c| c.keyframe)
        } else {
            self.target_keyframe()
        };
        if let Some(id) = entered {
            ctx.hook(HookCall::exit(HookTarget::Keyframe(id)));
        }
        self.current = None;
        self.target = None;
        self.elapsed = 0.0;
        self.reverse = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LoopMode;
    use crate::hooks::Lifecycle;
    use crate::library::BehaviorLibrary;
    use crate::player::test_support::{scalar_animation, Harness, MORPH};
    use crate::rig::MemoryRig;
    use approx::assert_relative_eq;

    fn setup(values: &[f32], duration: f32) -> (BehaviorLibrary, LayerId, Vec<Keyframe>) {
        let mut lib = BehaviorLibrary::new();
        let (layer, anim) = scalar_animation(&mut lib, LoopMode::Loop, values, duration);
        lib.set_layer_transition(
            layer,
            TransitionDefaults {
                duration: 1.0,
                easing: Easing::Linear,
            },
        )
        .unwrap();
        let kfs = lib.animation(anim).unwrap().keyframes.clone();
        (lib, layer, kfs)
    }

    #[test]
    fn no_target_is_a_noop() {
        let (lib, layer, _) = setup(&[1.0], 1.0);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.3);
        let mut kp = KeyframePlayer::new(layer);
        kp.tick(0.5, 1.0, false, &mut h.ctx(&lib), &mut rig);
        assert_eq!(rig.writes, 0);
        assert!(h.hooks.calls.is_empty());
        assert!(!kp.is_done(&h.config));
    }

    #[test]
    fn fresh_entry_blends_from_captured_pose() {
        let (lib, layer, kfs) = setup(&[1.0], 3.0);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.2);
        let mut kp = KeyframePlayer::new(layer);
        kp.set_target(&kfs[0], true, false, &mut h.ctx(&lib));
        assert!(kp.in_temporary_transition());

        kp.tick(0.5, 1.0, false, &mut h.ctx(&lib), &mut rig);
        assert_relative_eq!(rig.scalars[&MORPH], 0.6, epsilon = 1e-6);
        assert!(kp.current().unwrap().is_temporary());
        assert!(!kp.is_done(&h.config));

        kp.tick(0.5, 1.0, false, &mut h.ctx(&lib), &mut rig);
        assert_relative_eq!(rig.scalars[&MORPH], 1.0, epsilon = 1e-6);
        // synthetic segments use the layer default, not the keyframe's 3s
        assert!(kp.is_done(&h.config));
    }

    #[test]
    fn forward_segment_uses_source_duration() {
        let (lib, layer, kfs) = setup(&[0.0, 4.0], 2.0);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut kp = KeyframePlayer::new(layer);
        kp.set_target(&kfs[0], true, false, &mut h.ctx(&lib));
        kp.tick(1.0, 1.0, false, &mut h.ctx(&lib), &mut rig);
        assert!(kp.is_done(&h.config));

        kp.set_target(&kfs[1], false, false, &mut h.ctx(&lib));
        assert!(!kp.in_temporary_transition());
        kp.tick(0.5, 2.0, false, &mut h.ctx(&lib), &mut rig);
        assert_relative_eq!(rig.scalars[&MORPH], 2.0, epsilon = 1e-6);
        assert_relative_eq!(kp.progress(&h.config), 0.5, epsilon = 1e-6);
        kp.tick(1.0, 1.0, false, &mut h.ctx(&lib), &mut rig);
        assert!(kp.is_done(&h.config));
        assert_relative_eq!(rig.scalars[&MORPH], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn reverse_segment_replays_target_segment_backwards() {
        let mut lib = BehaviorLibrary::new();
        let (layer, anim) = scalar_animation(&mut lib, LoopMode::PingPong, &[0.0, 1.0, 2.0], 1.0);
        lib.animation_mut(anim).unwrap().keyframes[2].duration = 3.0;
        let kfs = lib.animation(anim).unwrap().keyframes.clone();
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 2.0);
        let mut kp = KeyframePlayer::new(layer);

        kp.set_target(&kfs[2], true, false, &mut h.ctx(&lib));
        kp.tick(10.0, 1.0, false, &mut h.ctx(&lib), &mut rig);
        kp.set_target(&kfs[1], false, true, &mut h.ctx(&lib));

        kp.tick(0.25, 1.0, true, &mut h.ctx(&lib), &mut rig);
        assert_relative_eq!(rig.scalars[&MORPH], 1.75, epsilon = 1e-6);
        kp.tick(0.75, 1.0, true, &mut h.ctx(&lib), &mut rig);
        // 1s (target's duration), not the 3s of the source keyframe
        assert!(kp.is_done(&h.config));
        assert_relative_eq!(rig.scalars[&MORPH], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn hooks_mirror_in_reverse() {
        let (lib, layer, kfs) = setup(&[0.0, 1.0, 2.0], 1.0);
        let mut h = Harness::new(vec![]);
        let mut kp = KeyframePlayer::new(layer);
        kp.set_target(&kfs[0], true, false, &mut h.ctx(&lib));
        kp.set_target(&kfs[1], false, false, &mut h.ctx(&lib));
        kp.set_target(&kfs[0], false, true, &mut h.ctx(&lib));
        let k0 = HookTarget::Keyframe(kfs[0].id);
        let k1 = HookTarget::Keyframe(kfs[1].id);
        assert_eq!(
            h.hooks.transitions(),
            vec![
                HookCall::enter(k0),
                HookCall::exit(k0),
                HookCall::enter(k1),
                HookCall::enter(k1),
                HookCall::exit(k0),
            ]
        );
    }

    #[test]
    fn playing_hook_fires_on_authored_source_only() {
        let (lib, layer, kfs) = setup(&[0.0, 1.0], 1.0);
        let mut h = Harness::new(vec![]);
        let mut rig = MemoryRig::new().with_scalar(MORPH, 0.0);
        let mut kp = KeyframePlayer::new(layer);
        kp.set_target(&kfs[0], true, false, &mut h.ctx(&lib));
        kp.tick(0.5, 1.0, false, &mut h.ctx(&lib), &mut rig);
        assert!(h.hooks.calls.iter().all(|c| !c.is_playing()));

        kp.tick(0.5, 1.0, false, &mut h.ctx(&lib), &mut rig);
        kp.set_target(&kfs[1], false, false, &mut h.ctx(&lib));
        kp.tick(0.25, 1.0, false, &mut h.ctx(&lib), &mut rig);
        let k0 = HookTarget::Keyframe(kfs[0].id);
        assert_eq!(
            h.hooks.calls_for(k0).last(),
            Some(&Lifecycle::Playing { progress: 0.25 })
        );
    }

    #[test]
    fn dispose_exits_target() {
        let (lib, layer, kfs) = setup(&[0.0], 1.0);
        let mut h = Harness::new(vec![]);
        let mut kp = KeyframePlayer::new(layer);
        kp.set_target(&kfs[0], true, false, &mut h.ctx(&lib));
        kp.dispose(&mut h.ctx(&lib));
        assert!(kp.target().is_none());
        assert_eq!(
            h.hooks.calls_for(HookTarget::Keyframe(kfs[0].id)),
            vec![Lifecycle::Enter, Lifecycle::Exit]
        );
    }
}
