// Integration tests for easing curves and the population interpolators.

use glam::Vec3;
use tree_core::*;

fn sweep(n: usize) -> impl Iterator<Item = f32> {
    (0..=n).map(move |i| i as f32 / n as f32)
}

fn layout() -> SceneLayout {
    let mut params = LayoutParams::default();
    params.particles.count = 400;
    SceneLayout::from_seed(&params, 21).unwrap()
}

#[test]
fn easing_curves_hit_their_endpoints() {
    assert_eq!(ease_out_cubic(0.0), 0.0);
    assert_eq!(ease_out_cubic(1.0), 1.0);
    assert_eq!(ease_in_out_cubic(0.0), 0.0);
    assert_eq!(ease_in_out_cubic(1.0), 1.0);
    assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
}

#[test]
fn easing_curves_are_monotonic() {
    let mut prev_out = -1.0;
    let mut prev_io = -1.0;
    for p in sweep(1000) {
        let a = ease_out_cubic(p);
        let b = ease_in_out_cubic(p);
        assert!(a >= prev_out && b >= prev_io, "not monotonic at {p}");
        prev_out = a;
        prev_io = b;
    }
}

#[test]
fn ease_in_out_is_symmetric_and_differs_from_ease_out() {
    for p in sweep(100) {
        let lhs = ease_in_out_cubic(1.0 - p);
        let rhs = 1.0 - ease_in_out_cubic(p);
        assert!((lhs - rhs).abs() < 1e-5, "asymmetric at {p}");
    }
    // ease-out leads early on, ease-in-out starts slowly
    assert!(ease_out_cubic(0.2) > ease_in_out_cubic(0.2));
}

#[test]
fn easing_clamps_out_of_range_input() {
    assert_eq!(ease_out_cubic(-2.0), 0.0);
    assert_eq!(ease_out_cubic(3.0), 1.0);
    assert_eq!(ease_in_out_cubic(f32::NAN), 0.0);
    assert_eq!(gift_blend(5.0), gift_blend(1.0));
}

#[test]
fn gift_factor_never_exceeds_ornament_factor() {
    for p in sweep(2000) {
        let light = ornament_blend(p);
        let heavy = gift_factor(p);
        assert!(heavy <= light + 1e-7, "gift {heavy} ahead of ornament {light} at {p}");
        assert!((0.0..=1.0).contains(&heavy));
    }
}

#[test]
fn gifts_wait_for_the_lag_then_catch_up() {
    for p in sweep(1000) {
        let e = ornament_blend(p);
        if e <= GIFT_LAG {
            assert_eq!(gift_factor(p), 0.0, "gift moved early at {p}");
        }
    }
    // Once moving, gifts travel faster than the ornaments.
    let (a, b) = (0.6_f32, 0.61_f32);
    let light_step = ornament_blend(b) - ornament_blend(a);
    let heavy_step = gift_factor(b) - gift_factor(a);
    assert!(heavy_step > light_step);

    // The raw curve leaves a lag residue at full assembly.
    let residue = ornament_blend(1.0) - gift_blend(ornament_blend(1.0));
    assert!(residue > 0.0 && residue <= 0.011, "residue {residue}");

    // Just before settling the gifts still trail by that residue.
    let p = SETTLE_THRESHOLD - 1e-3;
    assert!(gift_factor(p) < ornament_blend(p));
}

#[test]
fn settled_gifts_match_ornament_factor_and_rest_on_target() {
    for p in [SETTLE_THRESHOLD, 0.995, 1.0] {
        assert_eq!(gift_factor(p), ornament_blend(p), "at {p}");
    }
    let layout = layout();
    let mut buf = InstanceBuffer::new(PopulationKind::Gifts, layout.gifts().len());
    update_gifts(layout.gifts(), &mut buf, 1.0, 7.5);
    for (i, el) in layout.gifts().iter().enumerate() {
        let (scale, _, translation) = buf.transforms[i].to_scale_rotation_translation();
        assert!((translation - el.target).length() < 1e-4, "gift {i} at {translation:?}");
        assert!((scale - Vec3::splat(GIFT_SCALE)).length() < 1e-5);
    }
}

#[test]
fn particle_size_grows_with_blend_and_is_full_when_assembled() {
    let mut prev = 0.0;
    for t in sweep(500) {
        let s = particle_size_factor(t);
        assert!(s >= prev);
        prev = s;
    }
    assert_eq!(particle_size_factor(1.0), 1.0);
    assert!(particle_size_factor(0.0) < 1.0);
}

#[test]
fn assembled_particle_sits_on_target_with_only_breathing() {
    let el = ParticleElement {
        scatter: Vec3::new(8.0, 3.0, -6.0),
        target: Vec3::new(2.0, 1.0, 1.0),
        size: 0.1,
        seed: 0.37,
    };
    for i in 0..50 {
        let time = i as f32 * 0.13;
        let s = particle_vertex(&el, 1.0, time);
        assert!((s.position.y - el.target.y).abs() < 1e-5);
        let horizontal = Vec3::new(
            s.position.x - el.target.x,
            0.0,
            s.position.z - el.target.z,
        );
        assert!(horizontal.length() <= BREATHE_AMPLITUDE + 1e-5);
        assert!((s.size - el.size).abs() < 1e-6);
    }
}

#[test]
fn scattered_particle_jitters_around_scatter_point() {
    let el = ParticleElement {
        scatter: Vec3::new(-4.0, 7.0, 2.0),
        target: Vec3::new(0.5, -1.0, 0.5),
        size: 0.2,
        seed: 0.81,
    };
    let mut moved = false;
    let first = particle_vertex(&el, 0.0, 0.0).position;
    for i in 0..100 {
        let s = particle_vertex(&el, 0.0, i as f32 * 0.1);
        let offset = s.position - el.scatter;
        assert!(offset.length() <= JITTER_AMPLITUDE * 3f32.sqrt() + 1e-5);
        assert!((s.size - el.size * SIZE_SCATTER_FLOOR).abs() < 1e-6);
        moved |= (s.position - first).length() > 1e-3;
    }
    assert!(moved, "jitter never moved the particle");
}

#[test]
fn particle_alpha_pulses_within_bounds() {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for i in 0..400 {
        let a = particle_alpha(0.25, i as f32 * 0.05);
        lo = lo.min(a);
        hi = hi.max(a);
    }
    assert!(lo >= ALPHA_BASE - ALPHA_PULSE - 1e-6);
    assert!(hi <= ALPHA_BASE + ALPHA_PULSE + 1e-6);
    assert!(hi - lo > ALPHA_PULSE, "alpha barely pulsed");
}

#[test]
fn particle_frame_matches_reference_function() {
    let layout = layout();
    let mut frame = ParticleFrame::new(layout.particles().len());
    frame.update(layout.particles(), 0.4, 2.5);
    let t = particle_blend(0.4);
    for (i, el) in layout.particles().iter().enumerate() {
        let s = particle_vertex(el, t, 2.5);
        assert_eq!(frame.positions[i], s.position);
        assert_eq!(frame.sizes[i], s.size);
        assert_eq!(frame.alphas[i], s.alpha);
    }
}

#[test]
fn particle_uniforms_carry_eased_blend() {
    let u = ParticleUniforms::new(0.3, 4.0);
    assert_eq!(u.blend, ease_out_cubic(0.3));
    assert_eq!(u.time, 4.0);
    assert_eq!(std::mem::size_of::<ParticleUniforms>(), 16);
    assert_eq!(std::mem::size_of::<ParticleVertex>(), 32);
}

#[test]
fn assembled_ornaments_sit_on_their_targets() {
    let layout = layout();
    let mut buf = InstanceBuffer::new(PopulationKind::Ornaments, layout.ornaments().len());
    update_ornaments(layout.ornaments(), &mut buf, 1.0, 12.0);
    for (i, el) in layout.ornaments().iter().enumerate() {
        let (scale, _, translation) = buf.transforms[i].to_scale_rotation_translation();
        assert!((translation - el.target).length() < 1e-4, "ornament {i}");
        assert!((scale - Vec3::splat(ORNAMENT_SCALE)).length() < 1e-5);
        assert!((0.5..=1.0).contains(&buf.glow[i]));
    }
}

#[test]
fn ornaments_float_only_while_in_transit() {
    let el = OrnamentElement {
        scatter: Vec3::new(5.0, 5.0, 5.0),
        target: Vec3::new(1.0, 0.0, 0.0),
        seed: 0.5,
    };
    let p = 0.5;
    let e = ornament_blend(p);
    let base = el.scatter.lerp(el.target, e);
    let mut max_dev: f32 = 0.0;
    for i in 0..100 {
        let pos = ornament_position(&el, 3, p, i as f32 * 0.07);
        assert_eq!(pos.x, base.x);
        max_dev = max_dev.max((pos.y - base.y).abs());
    }
    assert!(max_dev > 0.0);
    assert!(max_dev <= ORNAMENT_FLOAT_AMPLITUDE * (1.0 - e) + 1e-6);

    // settled: no float at all
    let settled = ornament_position(&el, 3, SETTLE_THRESHOLD, 1.234);
    let expected = el.scatter.lerp(el.target, ornament_blend(SETTLE_THRESHOLD));
    assert_eq!(settled, expected);
}

#[test]
fn gift_rotation_is_exactly_zero_when_assembled() {
    let layout = layout();
    let mut buf = InstanceBuffer::new(PopulationKind::Gifts, layout.gifts().len());
    for i in 0..20 {
        update_gifts(layout.gifts(), &mut buf, 1.0, i as f32 * 0.9);
        for r in &buf.rotations {
            assert_eq!(*r, Vec3::ZERO);
        }
    }
    for (i, el) in layout.gifts().iter().enumerate() {
        assert_eq!(gift_rotation(el, i, 1.0, 3.0), Vec3::ZERO);
    }
}

#[test]
fn gift_rotation_snaps_at_settle_threshold() {
    let el = GiftElement {
        scatter: Vec3::ZERO,
        target: Vec3::ONE,
        rotation_seed: Vec3::new(1.0, 2.0, 3.0),
    };
    let before = gift_rotation(&el, 0, SETTLE_THRESHOLD - 0.001, 0.0);
    let after = gift_rotation(&el, 0, SETTLE_THRESHOLD, 0.0);
    assert!(before.length() > 1.0);
    assert_eq!(after, Vec3::ZERO);
    // in transit: seed plus offset on two axes, third axis untouched
    assert_eq!(before.z, 3.0);
    assert!((before.x - 1.0).abs() <= GIFT_SPIN_AMPLITUDE + 1e-6);
    assert!((before.y - 2.0).abs() <= GIFT_SPIN_AMPLITUDE + 1e-6);
}

#[test]
fn gifts_hold_their_scatter_point_during_the_lag() {
    let layout = layout();
    let p = 0.2; // eased below GIFT_LAG
    assert!(ornament_blend(p) < GIFT_LAG);
    for (i, el) in layout.gifts().iter().enumerate() {
        let pos = gift_position(el, i, p, 5.0);
        assert_eq!(pos.x, el.scatter.x);
        assert_eq!(pos.z, el.scatter.z);
        assert!((pos.y - el.scatter.y).abs() <= GIFT_FLOAT_AMPLITUDE + 1e-6);
    }
}

#[test]
fn instance_buffer_length_checks() {
    let buf = InstanceBuffer::new(PopulationKind::Gifts, 25);
    assert!(buf.check_len(25).is_ok());
    assert_eq!(
        buf.check_len(24),
        Err(LayoutError::BufferLengthMismatch {
            population: PopulationKind::Gifts,
            elements: 24,
            transforms: 25,
        })
    );
    assert_eq!(buf.as_floats().len(), 25 * 16);
}
