pub mod compositor;
pub mod config;
pub mod constants;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod host;
pub mod interaction;
pub mod registry;
pub mod rig;
pub mod scene;
pub mod sync;
pub mod transform;
pub mod uniforms;

pub use compositor::{FrameInfo, Pass, PassChain, RenderBackend, SceneCompositor};
pub use config::{AntialiasMode, RigConfig, ScaleTuning, ShaderTuning};
pub use error::{Result, RigError};
pub use geometry::{OrthoCamera, PixelBox, PlaneGeometry, PlaneVertex};
pub use host::{DomHost, ItemKey, MediaKind, PointerEvent, PointerKind, TextureLoader};
pub use interaction::{EffectVector, InteractionState, Phase};
pub use registry::{Registry, SceneItem};
pub use rig::Rig;
pub use scene::{Mesh, MeshId, Scene, TextureId};
pub use transform::{parse_transform, CssTransform};
pub use uniforms::{CameraUniforms, PlaneUniforms, PostUniforms};

// Shaders bundled as string constants
pub static PLANE_WGSL: &str = include_str!("../shaders/plane.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");
