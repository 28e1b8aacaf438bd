// Hover state machine and easing, independent of any host.

use glam::Vec2;
use rig_core::easing::{ease_in, ease_in_out, ease_out, lerp};
use rig_core::{InteractionState, Phase, ScaleTuning};

#[test]
fn easing_curves_hit_their_endpoints() {
    for f in [ease_in, ease_out, ease_in_out] {
        assert_eq!(f(0.0), 0.0);
        assert_eq!(f(1.0), 1.0);
    }
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    assert!(ease_in_out(0.25) < 0.25 + 0.1);
}

#[test]
fn enter_ramps_to_active_and_leave_back_to_idle() {
    let tuning = ScaleTuning { amount: 0.2, speed: 0.25 };
    let mut s = InteractionState::default();

    s.on_enter(Vec2::new(3.0, 4.0));
    assert_eq!(s.phase, Phase::HoverEntering);
    for _ in 0..4 {
        s.tick(&tuning);
    }
    assert_eq!(s.phase, Phase::HoverActive);
    assert_eq!(s.cur_scale, 1.0);
    assert!((s.hover_scale(&tuning) - 1.2).abs() < 1e-6);

    s.on_leave(Vec2::ZERO);
    assert_eq!(s.phase, Phase::HoverLeaving);
    for _ in 0..4 {
        s.tick(&tuning);
    }
    assert_eq!(s.phase, Phase::Idle);
    assert_eq!(s.cur_scale, 0.0);
    assert_eq!(s.hover_scale(&tuning), 1.0);
}

#[test]
fn leave_mid_ramp_eases_back_from_where_it_was() {
    let tuning = ScaleTuning { amount: 0.1, speed: 0.1 };
    let mut s = InteractionState::default();
    s.on_enter(Vec2::ZERO);
    for _ in 0..3 {
        s.tick(&tuning);
    }
    let peak = s.cur_scale;
    s.on_leave(Vec2::ZERO);
    s.tick(&tuning);
    assert!(s.cur_scale < peak && s.cur_scale > 0.0);
}

#[test]
fn enter_and_leave_set_effect_direction_and_decay() {
    let mut s = InteractionState::default();
    s.on_enter(Vec2::new(7.0, 8.0));
    assert_eq!(s.effect.to_array(), [7.0, 8.0, 60.0, -1.0]);
    s.on_leave(Vec2::new(1.0, 2.0));
    assert_eq!(s.effect.to_array(), [1.0, 2.0, 60.0, 1.0]);
}

#[test]
fn move_updates_pointer_without_touching_the_effect() {
    let mut s = InteractionState::default();
    s.on_enter(Vec2::new(1.0, 1.0));
    s.on_move(Vec2::new(9.0, 9.0));
    assert_eq!(s.pointer, Vec2::new(9.0, 9.0));
    assert_eq!((s.effect.x, s.effect.y), (1.0, 1.0));
}

#[test]
fn decay_floors_at_zero() {
    let mut s = InteractionState::default();
    s.on_leave(Vec2::ZERO);
    for i in 0..100 {
        s.tick(&ScaleTuning::default());
        let expected = (59 - i).max(0) as f32;
        assert_eq!(s.effect.decay, expected, "tick {i}");
    }
    assert_eq!(s.time, 100.0);
}

#[test]
fn zero_speed_never_moves_the_scale() {
    let tuning = ScaleTuning { amount: 0.5, speed: 0.0 };
    let mut s = InteractionState::default();
    s.on_enter(Vec2::ZERO);
    for _ in 0..10 {
        s.tick(&tuning);
    }
    assert_eq!(s.cur_scale, 0.0);
    assert_eq!(s.phase, Phase::HoverEntering);
}
