// Sanity bounds on tuning constants.

use rig_core::constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    // the camera must sit in front of every plane z in [-(items - 1), 0]
    assert!(CAMERA_Z > 0.0);
    assert!(CAMERA_NEAR > 0.0 && CAMERA_NEAR < CAMERA_Z);
    assert!(CAMERA_FAR > CAMERA_Z);

    // plane at least covers its element
    assert!(DEFAULT_OVERSCAN >= 1.0);

    // ripple lasts about a second at 60 fps
    assert!(EFFECT_DECAY_TICKS > 0.0);
    assert_eq!(ENTER_DIRECTION, -LEAVE_DIRECTION);

    // hover ramp completes in a finite number of frames
    assert!(DEFAULT_SCALE_SPEED > 0.0 && DEFAULT_SCALE_SPEED <= 1.0);
    assert!(DEFAULT_SCALE_AMOUNT >= 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn sample_counts_are_powers_of_two() {
    assert!(MSAA_SAMPLES.is_power_of_two());
    assert!(TAA_SAMPLES.is_power_of_two());
    assert!(TAA_SAMPLES <= 4);
}
