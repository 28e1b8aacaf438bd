//! The uniform contract between the rig and the plane program.
//!
//! One schema, one layout. The WGSL side declares the same fields in the same
//! order (`shaders/plane.wgsl`); any replacement program is checked against
//! [`UNIFORM_FIELDS`] before use.

use glam::Mat4;

use crate::error::{Result, RigError};

pub const SCHEMA_VERSION: u32 = 1;

/// `(contract name, WGSL field name)` for every value the rig writes.
pub const UNIFORM_FIELDS: [(&str, &str); 7] = [
    ("time", "time"),
    ("pointer", "pointer"),
    ("effectState", "effect_state"),
    ("resolution", "resolution"),
    ("hoverScale", "hover_scale"),
    ("warpParams", "warp_params"),
    ("borderRadius", "border_radius"),
];

/// Per-plane uniform block, group 0 binding 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneUniforms {
    pub model: [[f32; 4]; 4],
    pub effect_state: [f32; 4],
    pub warp_params: [f32; 4],
    pub pointer: [f32; 2],
    pub resolution: [f32; 2],
    pub time: f32,
    pub hover_scale: f32,
    pub border_radius: f32,
    pub _pad: f32,
}

impl Default for PlaneUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            effect_state: [0.0; 4],
            warp_params: [0.0; 4],
            pointer: [0.0; 2],
            resolution: [1.0, 1.0],
            time: 0.0,
            hover_scale: 1.0,
            border_radius: 0.0,
            _pad: 0.0,
        }
    }
}

/// Camera block, group 1 binding 0. One per jitter sample on the TAA path.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniforms {
    pub fn from_matrix(m: Mat4) -> Self {
        Self {
            view_proj: m.to_cols_array_2d(),
        }
    }
}

/// Fullscreen post block shared by the FXAA, accumulate and output passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostUniforms {
    pub resolution: [f32; 2],
    pub inv_resolution: [f32; 2],
}

impl PostUniforms {
    pub fn for_size(width: u32, height: u32) -> Self {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        Self {
            resolution: [w, h],
            inv_resolution: [1.0 / w, 1.0 / h],
        }
    }
}

/// Verify that a WGSL plane program declares every contract field.
pub fn check_shader_schema(source: &str) -> Result<()> {
    let missing: Vec<&str> = UNIFORM_FIELDS
        .iter()
        .filter(|(_, wgsl)| !declares_field(source, wgsl))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RigError::Configuration(format!(
            "plane shader (schema v{SCHEMA_VERSION}) is missing uniform fields: {}",
            missing.join(", ")
        )))
    }
}

fn declares_field(source: &str, field: &str) -> bool {
    source.lines().any(|line| {
        let line = line.trim_start();
        line.strip_prefix(field)
            .map(|rest| rest.trim_start().starts_with(':'))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<PlaneUniforms>(), 128);
        assert_eq!(std::mem::size_of::<PostUniforms>() % 16, 0);
    }

    #[test]
    fn bundled_plane_shader_honors_schema() {
        assert!(check_shader_schema(crate::PLANE_WGSL).is_ok());
    }

    #[test]
    fn schema_check_names_missing_fields() {
        let src = "struct PlaneUniforms {\n  time: f32,\n  pointer: vec2<f32>,\n}";
        let err = check_shader_schema(src).unwrap_err().to_string();
        assert!(err.contains("effectState"));
        assert!(err.contains("borderRadius"));
        assert!(!err.contains("pointer,"));
    }
}
