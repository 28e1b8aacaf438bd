// Shared layout, interaction and compositing constants used by the rig.

// Discovery
pub const DEFAULT_ITEM_SELECTOR: &str = "[data-mx-shader]";

// Geometry
pub const DEFAULT_OVERSCAN: f32 = 2.0; // plane size relative to the element box, both axes

// Camera (pixel-mapped orthographic)
pub const CAMERA_Z: f32 = 10.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 1000.0;

// Interaction
pub const EFFECT_DECAY_TICKS: f32 = 60.0; // frames a warp ripple stays visible
pub const ENTER_DIRECTION: f32 = -1.0;
pub const LEAVE_DIRECTION: f32 = 1.0;

// Shader tuning defaults
pub const DEFAULT_WARP_FACTOR: f32 = 40.0;
pub const DEFAULT_WARP_RADIUS: f32 = 5.0;
pub const DEFAULT_DECAY_RATE: f32 = 7.0;
pub const DEFAULT_DENSITY: f32 = 25.0;

// Hover scale defaults
pub const DEFAULT_SCALE_AMOUNT: f32 = 0.15; // extra scale at full hover
pub const DEFAULT_SCALE_SPEED: f32 = 0.04; // curScale increment per frame

// Border radius used when the media element has none (CSS px)
pub const DEFAULT_BORDER_RADIUS: f32 = 0.0;

// Antialiasing
pub const MSAA_SAMPLES: u32 = 4;
pub const TAA_SAMPLES: u32 = 4; // jittered sub-frames accumulated per frame
