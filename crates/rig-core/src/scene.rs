//! Scene graph of mirrored planes.
//!
//! The scene owns every mesh. Items hold a [`MeshId`]; removing the mesh here
//! is what makes it disappear from the next frame.

use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::geometry::PlaneGeometry;
use crate::uniforms::PlaneUniforms;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: PlaneGeometry,
    pub texture: TextureId,
    pub position: Vec3,
    /// Rotation about the view axis, radians.
    pub rotation_z: f32,
    pub scale: Vec2,
    pub uniforms: PlaneUniforms,
}

impl Mesh {
    pub fn new(geometry: PlaneGeometry, texture: TextureId) -> Self {
        Self {
            geometry,
            texture,
            position: Vec3::ZERO,
            rotation_z: 0.0,
            scale: Vec2::ONE,
            uniforms: PlaneUniforms::default(),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.extend(1.0),
            Quat::from_rotation_z(self.rotation_z),
            self.position,
        )
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    meshes: FnvHashMap<MeshId, Mesh>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.meshes.insert(id, mesh);
        id
    }

    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        self.meshes.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    #[inline]
    pub fn contains(&self, id: MeshId) -> bool {
        self.meshes.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().map(|(id, m)| (*id, m))
    }

    /// Mesh ids back to front (most negative z first), ties broken by id so
    /// the order is stable between frames.
    pub fn draw_order(&self) -> Vec<MeshId> {
        let mut ids: Vec<(MeshId, f32)> = self.meshes.iter().map(|(id, m)| (*id, m.position.z)).collect();
        ids.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ids.into_iter().map(|(id, _)| id).collect()
    }
}
