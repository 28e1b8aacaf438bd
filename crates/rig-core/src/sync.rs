//! Per-frame projection of DOM layout onto the mirrored meshes, and of the
//! interaction state onto their uniforms.
//!
//! The element's already-computed box and transform are read every frame, so
//! whatever animates the element (scroll smoothing, CSS or script tweens) is
//! mirrored without knowing about it.

use glam::Vec2;

use crate::config::RigConfig;
use crate::error::{Result, RigError};
use crate::geometry::OrthoCamera;
use crate::host::DomHost;
use crate::registry::SceneItem;
use crate::scene::Scene;
use crate::transform::parse_transform;

/// Move, rotate and scale one item's mesh to match its element.
pub fn sync_transform<H: DomHost>(
    host: &H,
    scene: &mut Scene,
    camera: &OrthoCamera,
    config: &RigConfig,
    scroll_y: f32,
    item: &SceneItem<H>,
) -> Result<()> {
    let rect = host
        .bounding_box(&item.element)
        .filter(|r| r.is_finite())
        .ok_or(RigError::ElementResolution {
            index: item.key.index as usize,
        })?;
    let mesh = scene.get_mut(item.mesh).ok_or_else(|| {
        RigError::Configuration(format!("item {} lost its mesh", item.key.index))
    })?;

    mesh.position = camera.plane_position(&rect, scroll_y, item.depth_index);

    if config.allow_rotation || config.allow_scaling {
        let raw = host.transform(&item.element);
        let parsed = raw.as_deref().map(parse_transform).unwrap_or_default();
        if parsed.malformed > 0 {
            log::trace!(
                "[sync] item {}: {}; identity this frame",
                item.key.index,
                RigError::TransformParse(raw.unwrap_or_default())
            );
        }
        if config.allow_rotation {
            mesh.rotation_z = parsed.rotation_z();
        }
        if config.allow_scaling {
            let (sx, sy) = parsed.scale_or_identity();
            mesh.scale = Vec2::new(sx, sy);
        }
    }

    mesh.uniforms.model = mesh.model_matrix().to_cols_array_2d();
    Ok(())
}

/// Copy the item's interaction state into its mesh uniforms.
pub fn write_interaction_uniforms<H: DomHost>(scene: &mut Scene, config: &RigConfig, item: &SceneItem<H>) {
    let Some(mesh) = scene.get_mut(item.mesh) else {
        return;
    };
    let state = &item.interaction;
    mesh.uniforms.time = state.time;
    mesh.uniforms.pointer = state.pointer.to_array();
    mesh.uniforms.effect_state = state.effect.to_array();
    mesh.uniforms.hover_scale = state.hover_scale(&config.scale_tuning);
}
