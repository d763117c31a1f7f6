// Integration tests for the per-frame scene update.

use glam::Vec3;
use std::time::Duration;
use tree_core::*;

const FRAME: Duration = Duration::from_micros(16_667);

fn small_layout(seed: u64) -> SceneLayout {
    let mut params = LayoutParams::default();
    params.particles.count = 200;
    SceneLayout::from_seed(&params, seed).unwrap()
}

fn config(state: MorphState) -> SceneConfig {
    SceneConfig {
        morph_state: state,
        ..SceneConfig::default()
    }
}

fn run(scene: &mut Scene, cfg: &SceneConfig, frames: usize, time: &mut f32) {
    for _ in 0..frames {
        *time += FRAME.as_secs_f32();
        scene.update(cfg, FRAME, *time);
    }
}

#[test]
fn resting_tree_stays_assembled() {
    let mut scene = Scene::new(small_layout(1), MorphState::Tree).unwrap();
    let mut time = 0.0;
    run(&mut scene, &config(MorphState::Tree), 300, &mut time);
    assert_eq!(scene.progress(), 1.0);
    for (i, el) in scene.layout().ornaments().iter().enumerate() {
        let t = scene.ornaments().transforms[i].w_axis.truncate();
        assert!((t - el.target).length() < 1e-4);
    }
    assert!(scene.gifts().rotations.iter().all(|r| *r == Vec3::ZERO));
}

#[test]
fn resting_cloud_stays_scattered() {
    let mut scene = Scene::new(small_layout(2), MorphState::Scattered).unwrap();
    let mut time = 0.0;
    run(&mut scene, &config(MorphState::Scattered), 300, &mut time);
    assert_eq!(scene.progress(), 0.0);
    for (i, el) in scene.layout().gifts().iter().enumerate() {
        let t = scene.gifts().transforms[i].w_axis.truncate();
        assert_eq!(t.x, el.scatter.x);
        assert_eq!(t.z, el.scatter.z);
    }
}

#[test]
fn interpolators_read_the_same_frame_progress() {
    let mut scene = Scene::new(small_layout(3), MorphState::Tree).unwrap();
    let mut time = 0.0;
    run(&mut scene, &config(MorphState::Scattered), 25, &mut time);
    let p = scene.progress();
    assert!(p > 0.0 && p < 1.0);

    for (i, el) in scene.layout().ornaments().iter().enumerate() {
        let expected = ornament_position(el, i, p, time);
        let got = scene.ornaments().transforms[i].w_axis.truncate();
        assert!((got - expected).length() < 1e-4, "ornament {i}");
    }
    for (i, el) in scene.layout().gifts().iter().enumerate() {
        assert_eq!(scene.gifts().rotations[i], gift_rotation(el, i, p, time));
    }
    let u = scene.particle_uniforms();
    assert_eq!(u.blend, particle_blend(p));
    assert_eq!(u.time, time);
}

#[test]
fn round_trip_returns_to_a_settled_tree() {
    let mut scene = Scene::new(small_layout(4), MorphState::Tree).unwrap();
    let mut time = 0.0;
    run(&mut scene, &config(MorphState::Scattered), 300, &mut time);
    assert!(scene.progress() < 1e-3);
    assert!(scene.gifts().rotations.iter().any(|r| *r != Vec3::ZERO));

    run(&mut scene, &config(MorphState::Tree), 360, &mut time);
    assert_eq!(scene.progress(), 1.0);
    assert!(scene.gifts().rotations.iter().all(|r| *r == Vec3::ZERO));
    let topper_gap = (scene.accent().topper_position - topper_tree_position()).length();
    assert!(topper_gap < 1e-2, "topper {topper_gap} from its tree slot");
}

#[test]
fn layout_endpoints_survive_repeated_morphs() {
    let mut scene = Scene::new(small_layout(11), MorphState::Tree)
        .unwrap()
        .with_host_particles(true);
    let particles = scene.layout().particles().to_vec();
    let ornaments = scene.layout().ornaments().to_vec();
    let gifts = scene.layout().gifts().to_vec();

    // Short legs reverse the morph mid-transition.
    let legs = [
        (MorphState::Scattered, 20),
        (MorphState::Tree, 15),
        (MorphState::Scattered, 40),
        (MorphState::Tree, 5),
        (MorphState::Scattered, 300),
        (MorphState::Tree, 300),
    ];
    let mut time = 0.0;
    let mut reversed = false;
    for (state, frames) in legs {
        let p = scene.progress();
        reversed |= p > 0.0 && p < 1.0;
        run(&mut scene, &config(state), frames, &mut time);
    }
    assert!(reversed);
    assert_eq!(scene.progress(), 1.0);

    assert_eq!(scene.layout().particles(), particles.as_slice());
    assert_eq!(scene.layout().ornaments(), ornaments.as_slice());
    assert_eq!(scene.layout().gifts(), gifts.as_slice());
}

#[test]
fn host_particles_are_opt_in() {
    let scene = Scene::new(small_layout(5), MorphState::Tree).unwrap();
    assert!(scene.particles().is_none());

    let mut scene = scene.with_host_particles(true);
    let mut time = 0.0;
    run(&mut scene, &config(MorphState::Scattered), 10, &mut time);
    let frame = scene.particles().unwrap();
    assert_eq!(frame.len(), 200);
    let t = particle_blend(scene.progress());
    let el = &scene.layout().particles()[17];
    assert_eq!(frame.positions[17], particle_vertex(el, t, time).position);

    let scene = scene.with_host_particles(false);
    assert!(scene.particles().is_none());
}

#[test]
fn particle_vertices_mirror_the_layout() {
    let scene = Scene::new(small_layout(6), MorphState::Tree).unwrap();
    let verts = scene.particle_vertices();
    assert_eq!(verts.len(), scene.layout().particles().len());
    let el = &scene.layout().particles()[3];
    assert_eq!(verts[3].scatter, el.scatter.to_array());
    assert_eq!(verts[3].target, el.target.to_array());
    assert_eq!(verts[3].seed, el.seed);
}

#[test]
fn from_parts_rejects_mis_sized_buffers() {
    let layout = small_layout(7);
    let n = layout.ornaments().len();
    let g = layout.gifts().len();
    let err = Scene::from_parts(
        layout,
        MorphState::Tree,
        InstanceBuffer::new(PopulationKind::Ornaments, n - 1),
        InstanceBuffer::new(PopulationKind::Gifts, g),
    )
    .err();
    assert_eq!(
        err,
        Some(LayoutError::BufferLengthMismatch {
            population: PopulationKind::Ornaments,
            elements: n,
            transforms: n - 1,
        })
    );
}

#[test]
fn from_parts_rejects_swapped_buffers() {
    let layout = small_layout(8);
    let n = layout.ornaments().len();
    let g = layout.gifts().len();
    let err = Scene::from_parts(
        layout,
        MorphState::Tree,
        InstanceBuffer::new(PopulationKind::Gifts, g),
        InstanceBuffer::new(PopulationKind::Ornaments, n),
    )
    .err();
    assert_eq!(
        err,
        Some(LayoutError::WrongPopulation {
            expected: PopulationKind::Ornaments,
            found: PopulationKind::Gifts,
        })
    );
    let message = err.map(|e| e.to_string()).unwrap_or_default();
    assert_eq!(message, "expected ornaments buffer, got gifts buffer");
}

#[test]
fn scheduler_override_is_applied_immediately() {
    let mut sched = MorphScheduler::new(MorphState::Tree);
    sched.set_progress(0.5);
    let scene = Scene::new(small_layout(9), MorphState::Tree)
        .unwrap()
        .with_scheduler(sched);
    assert_eq!(scene.progress(), 0.5);
    let el = &scene.layout().ornaments()[0];
    let got = scene.ornaments().transforms[0].w_axis.truncate();
    assert!((got - ornament_position(el, 0, 0.5, 0.0)).length() < 1e-4);
}

#[test]
fn update_frame_forwards_clock_values() {
    let mut a = Scene::new(small_layout(10), MorphState::Tree).unwrap();
    let mut b = Scene::new(small_layout(10), MorphState::Tree).unwrap();
    let cfg = config(MorphState::Scattered);
    let ft = FrameTime {
        dt: FRAME,
        elapsed: 1.25,
    };
    a.update_frame(&cfg, ft);
    b.update(&cfg, FRAME, 1.25);
    assert_eq!(a.progress(), b.progress());
    assert_eq!(a.gifts().transforms, b.gifts().transforms);
}
