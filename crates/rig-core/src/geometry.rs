//! Layout boxes, the pixel-mapped orthographic camera and plane geometry.
//!
//! The camera is centered on the container, so world x runs from `-w/2` to
//! `w/2` and world y from `-h/2` (bottom) to `h/2` (top). One world unit is one
//! CSS pixel, which lets DOM layout math be reused directly for placement.

use glam::{Mat4, Vec2, Vec3};

use crate::constants::{CAMERA_FAR, CAMERA_NEAR, CAMERA_Z};

/// A viewport-relative box in CSS pixels, y growing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelBox {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A box of the given size anchored at the origin.
    pub const fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Translate a viewport point into coordinates local to this box.
    #[inline]
    pub fn local_point(&self, client: Vec2) -> Vec2 {
        Vec2::new(client.x - self.left, client.y - self.top)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Orthographic camera whose bounds track the container size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub eye_z: f32,
}

impl OrthoCamera {
    pub fn new(width: f32, height: f32) -> Self {
        let mut cam = Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            eye_z: CAMERA_Z,
        };
        cam.set_size(width, height);
        cam
    }

    /// Recompute bounds from the container size. Bounds depend only on the
    /// arguments, so repeated calls with the same size are no-ops.
    pub fn set_size(&mut self, width: f32, height: f32) {
        let w = width.max(0.0);
        let h = height.max(0.0);
        self.left = -w / 2.0;
        self.right = w / 2.0;
        self.top = h / 2.0;
        self.bottom = -h / 2.0;
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.eye_z))
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// View-projection with a sub-pixel offset applied in clip space.
    ///
    /// `jitter` is in pixels of a `target_px` sized render target.
    pub fn jittered_view_projection(&self, jitter: Vec2, target_px: Vec2) -> Mat4 {
        if target_px.x <= 0.0 || target_px.y <= 0.0 {
            return self.view_projection();
        }
        let ndc = Vec2::new(2.0 * jitter.x / target_px.x, -2.0 * jitter.y / target_px.y);
        Mat4::from_translation(ndc.extend(0.0)) * self.view_projection()
    }

    /// World position of the center of a DOM box.
    ///
    /// `scroll_y` is the externally smoothed vertical offset, `depth_index`
    /// the DOM-order index fixed at build time.
    pub fn plane_position(&self, rect: &PixelBox, scroll_y: f32, depth_index: u32) -> Vec3 {
        let c = rect.center();
        Vec3::new(self.left + c.x, self.top - c.y - scroll_y, -(depth_index as f32))
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// A flat quad frozen at build time.
///
/// `width`/`height` are the overscanned dimensions; `content` the true element
/// size the texture maps onto.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub content: Vec2,
    pub overscan: f32,
}

impl PlaneGeometry {
    pub fn for_box(rect: &PixelBox, overscan: f32) -> Self {
        let overscan = overscan.max(1.0);
        Self {
            width: rect.width * overscan,
            height: rect.height * overscan,
            content: rect.size(),
            overscan,
        }
    }

    /// Two triangles centered on the origin. UVs are 0..1 over the true box
    /// and extend past it into the overscan margin.
    pub fn vertices(&self) -> [PlaneVertex; 6] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        let uv_lo = 0.5 - self.overscan / 2.0;
        let uv_hi = 0.5 + self.overscan / 2.0;
        let tl = PlaneVertex {
            position: [-hw, hh],
            uv: [uv_lo, uv_lo],
        };
        let tr = PlaneVertex {
            position: [hw, hh],
            uv: [uv_hi, uv_lo],
        };
        let bl = PlaneVertex {
            position: [-hw, -hh],
            uv: [uv_lo, uv_hi],
        };
        let br = PlaneVertex {
            position: [hw, -hh],
            uv: [uv_hi, uv_hi],
        };
        [tl, bl, tr, tr, bl, br]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overscan_keeps_center_and_doubles_size() {
        let g = PlaneGeometry::for_box(&PixelBox::new(10.0, 20.0, 100.0, 50.0), 2.0);
        assert_eq!((g.width, g.height), (200.0, 100.0));
        let v = g.vertices();
        let cx: f32 = v.iter().map(|p| p.position[0]).sum::<f32>() / 6.0;
        assert!(cx.abs() < 1e-5);
        assert_eq!(v[0].uv, [-0.5, -0.5]);
        assert_eq!(v[5].uv, [1.5, 1.5]);
    }

    #[test]
    fn plane_position_maps_top_left_box() {
        let cam = OrthoCamera::new(800.0, 600.0);
        let p = cam.plane_position(&PixelBox::new(0.0, 0.0, 100.0, 100.0), 0.0, 0);
        assert_eq!(p, Vec3::new(-350.0, 250.0, 0.0));
    }
}
