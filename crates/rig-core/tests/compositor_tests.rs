// Antialiasing path selection, fallback and frame bookkeeping.

mod common;

use common::*;
use glam::Vec2;
use rig_core::compositor::{halton, jitter_offsets};
use rig_core::{AntialiasMode, Pass, PassChain, PixelBox, Scene, SceneCompositor};

fn compositor(mode: AntialiasMode, backend: FakeBackend) -> SceneCompositor<FakeBackend> {
    SceneCompositor::initialize(PixelBox::sized(640.0, 480.0), mode, backend)
}

#[test]
fn each_mode_maps_to_its_pass_chain() {
    assert_eq!(PassChain::for_mode(AntialiasMode::None).passes(), &[Pass::Direct]);
    assert_eq!(
        PassChain::for_mode(AntialiasMode::Msaa).passes(),
        &[Pass::Multisampled { samples: 4 }]
    );
    assert_eq!(PassChain::for_mode(AntialiasMode::Fxaa).passes(), &[Pass::Offscreen, Pass::Fxaa]);
    assert_eq!(
        PassChain::for_mode(AntialiasMode::Taa).passes(),
        &[Pass::JitterAccumulate { samples: 4 }, Pass::Output]
    );
    assert_eq!(PassChain::for_mode(AntialiasMode::Taa).jitter_samples(), 4);
    assert_eq!(PassChain::for_mode(AntialiasMode::Fxaa).jitter_samples(), 1);
}

#[test]
fn supported_mode_is_prepared_and_kept() {
    let c = compositor(AntialiasMode::Fxaa, FakeBackend::supporting_all());
    assert_eq!(c.chain().mode(), AntialiasMode::Fxaa);
    assert_eq!(c.backend().prepared, vec![AntialiasMode::Fxaa]);
    assert_eq!(c.backend().sizes, vec![(640.0, 480.0)]);
}

#[test]
fn unsupported_mode_falls_back_to_direct() {
    let c = compositor(AntialiasMode::Msaa, FakeBackend::without(AntialiasMode::Msaa));
    assert!(c.chain().is_direct());
    assert_eq!(c.requested_mode(), AntialiasMode::Msaa);
    assert_eq!(c.backend().prepared, vec![AntialiasMode::None]);
}

#[test]
fn failed_preparation_falls_back_to_direct() {
    let backend = FakeBackend {
        broken: vec![AntialiasMode::Taa],
        ..FakeBackend::default()
    };
    let c = compositor(AntialiasMode::Taa, backend);
    assert!(c.chain().is_direct());
}

#[test]
fn chain_lost_mid_run_degrades_and_keeps_rendering() {
    let mut c = compositor(AntialiasMode::Fxaa, FakeBackend::supporting_all());
    let scene = Scene::new();

    c.backend_mut().lose_chain_on_draw = true;
    c.render(&scene);
    assert!(c.chain().is_direct());
    assert!(c.backend().draws.is_empty());

    c.render(&scene);
    assert_eq!(c.backend().draws.len(), 1);
    assert_eq!(c.backend().draws[0].mode, AntialiasMode::None);
}

#[test]
fn transient_draw_error_keeps_the_chain() {
    let mut c = compositor(AntialiasMode::Msaa, FakeBackend::supporting_all());
    let scene = Scene::new();
    c.backend_mut().transient_error = true;
    c.render(&scene);
    c.render(&scene);
    assert_eq!(c.chain().mode(), AntialiasMode::Msaa);
    assert_eq!(c.backend().draws.len(), 1);
    assert_eq!(c.frame_count(), 2);
}

#[test]
fn frame_counters_are_per_instance() {
    let scene = Scene::new();
    let mut a = compositor(AntialiasMode::None, FakeBackend::supporting_all());
    let mut b = compositor(AntialiasMode::None, FakeBackend::supporting_all());
    for _ in 0..5 {
        a.render(&scene);
    }
    b.render(&scene);
    assert_eq!(a.frame_count(), 5);
    assert_eq!(b.frame_count(), 1);
}

#[test]
fn resize_at_the_current_size_keeps_the_camera_but_still_reaches_the_backend() {
    let mut c = compositor(AntialiasMode::None, FakeBackend::supporting_all());
    let cam = *c.camera();
    c.resize(PixelBox::sized(640.0, 480.0));
    assert_eq!(*c.camera(), cam);
    // a pixel ratio change arrives as a same-size resize
    assert_eq!(c.backend().sizes, vec![(640.0, 480.0), (640.0, 480.0)]);

    c.resize(PixelBox::sized(320.0, 240.0));
    c.resize(PixelBox::sized(320.0, 240.0));
    assert_eq!(c.backend().sizes.len(), 4);
    assert_eq!(c.backend().sizes.last(), Some(&(320.0, 240.0)));
    assert_eq!(c.camera().right, 160.0);
}

#[test]
fn taa_frames_carry_distinct_subpixel_jitter() {
    let mut c = compositor(AntialiasMode::Taa, FakeBackend::supporting_all());
    c.render(&Scene::new());
    assert_eq!(c.backend().draws[0].jitter_samples, 4);

    let offsets = jitter_offsets(4, 7);
    assert_eq!(offsets.len(), 4);
    for (i, a) in offsets.iter().enumerate() {
        assert!(a.x.abs() <= 0.5 && a.y.abs() <= 0.5);
        for b in offsets.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn non_jittered_chains_get_a_single_zero_offset() {
    assert_eq!(jitter_offsets(1, 42).as_slice(), &[Vec2::ZERO]);
}

#[test]
fn halton_sequence_matches_known_values() {
    assert_eq!(halton(1, 2), 0.5);
    assert_eq!(halton(2, 2), 0.25);
    assert_eq!(halton(3, 2), 0.75);
    assert!((halton(1, 3) - 1.0 / 3.0).abs() < 1e-6);
    assert!((halton(2, 3) - 2.0 / 3.0).abs() < 1e-6);
}
