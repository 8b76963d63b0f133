use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vizij_behavior_core::{
    Easing, Engine, EntryTiming, LayerChannels, LoopMode, MemoryRig, NoopHooks, PlayMode, Pose,
    ScalarChannelId, TransitionCondition,
};

/// `groups` independent groups, each driving its own three-channel layer
/// through two states with four animations.
fn build(groups: usize) -> (Engine, MemoryRig) {
    let mut engine = Engine::default();
    let mut rig = MemoryRig::new();
    let mut ids = Vec::with_capacity(groups);
    let lib = engine.library_mut();
    for g in 0..groups {
        let base = (g * 3) as u32;
        let bone = format!("bone{g}");
        let joint = format!("joint{g}");
        let layer = lib.add_layer(
            &format!("layer{g}"),
            LayerChannels::new()
                .position(bone.clone())
                .rotation(joint.clone())
                .scalar(ScalarChannelId(base)),
        );
        rig = rig
            .with_position(&bone, [0.0; 3])
            .with_rotation(&joint, [0.0, 0.0, 0.0, 1.0])
            .with_scalar(ScalarChannelId(base), 0.0);

        let group = lib.add_group(&format!("group{g}"));
        let idle = lib
            .add_state(group, "idle", TransitionCondition::RandomDuration { min: 1.0, max: 3.0 })
            .unwrap();
        let busy = lib
            .add_state(group, "busy", TransitionCondition::PlaylistCompleted)
            .unwrap();
        lib.set_initial_state(group, idle).unwrap();
        lib.add_transition(idle, busy, 1.0).unwrap();
        lib.add_transition(idle, idle, 0.5).unwrap();
        lib.add_transition(busy, idle, 1.0).unwrap();

        for (state, mode) in [(idle, PlayMode::Random), (busy, PlayMode::Sequential)] {
            let playlist = lib.add_playlist(state, layer, mode).unwrap();
            for (i, loop_mode) in [LoopMode::Loop, LoopMode::PingPong].into_iter().enumerate() {
                let anim = lib.add_animation(layer, &format!("a{i}"), loop_mode).unwrap();
                for k in 0..4 {
                    let v = k as f32 * 0.25;
                    let pose = Pose::new()
                        .with_position(&bone, [v, 0.0, -v])
                        .with_rotation(&joint, [0.0, (v * 0.5).sin(), 0.0, (v * 0.5).cos()])
                        .with_scalar(ScalarChannelId(base), v);
                    lib.add_keyframe(anim, pose, 0.3, Easing::CubicInOut).unwrap();
                }
                lib.add_entry(playlist, anim, Some(EntryTiming::FromAnimationDuration), 1.0)
                    .unwrap();
            }
        }
        ids.push(group);
    }
    for group in ids {
        engine.activate_group(group).unwrap();
    }
    (engine, rig)
}

fn bench_tick(c: &mut Criterion) {
    for groups in [1usize, 16, 64] {
        let (mut engine, mut rig) = build(groups);
        c.bench_function(&format!("update_{groups}_groups"), |b| {
            b.iter(|| {
                let out = engine.update(black_box(1.0 / 60.0), &mut rig, &mut NoopHooks);
                black_box(out.notifications.len());
            })
        });
    }
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
