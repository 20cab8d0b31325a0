//! Scene objects and the capabilities the crafting flow queries on them.

use craftbench_core::{Aabb, MeshData, RenderLayer};
use glam::{Affine3A, Quat, Vec3};

/// Something with drawable geometry in world space.
pub trait Renderable {
    /// Local-space mesh, `None` when the object has nothing to draw.
    fn mesh(&self) -> Option<&MeshData>;

    /// Local-to-world transform.
    fn world_transform(&self) -> Affine3A;

    /// Layer the object is drawn on.
    fn layer(&self) -> RenderLayer;

    /// World-space bounds of the mesh, if any.
    fn world_bounds(&self) -> Option<Aabb> {
        let mesh = self.mesh().filter(|mesh| !mesh.is_empty())?;
        Some(mesh.bounds().transformed(&self.world_transform()))
    }
}

/// A renderable the icon capture may move and re-layer temporarily.
pub trait CaptureTarget: Renderable {
    /// World position.
    fn position(&self) -> Vec3;
    /// Move to `position`.
    fn set_position(&mut self, position: Vec3);
    /// Change the render layer.
    fn set_layer(&mut self, layer: RenderLayer);
}

/// Plain scene node: transform, optional mesh, layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Scene-unique id, 0 until the object is placed in a scene.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// World position.
    pub position: Vec3,
    /// World rotation.
    pub rotation: Quat,
    /// Non-uniform scale.
    pub scale: Vec3,
    /// Geometry in local space.
    pub mesh: Option<MeshData>,
    /// Render layer.
    pub layer: RenderLayer,
    /// Inactive objects are ignored by the craft flow.
    pub active: bool,
}

impl SceneObject {
    /// Active object on the default layer at `position`.
    pub fn new(name: impl Into<String>, position: Vec3, mesh: Option<MeshData>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh,
            layer: RenderLayer::DEFAULT,
            active: true,
        }
    }

    /// Override the rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Override the scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl Renderable for SceneObject {
    fn mesh(&self) -> Option<&MeshData> {
        self.mesh.as_ref()
    }

    fn world_transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    fn layer(&self) -> RenderLayer {
        self.layer
    }
}

impl CaptureTarget for SceneObject {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_layer(&mut self, layer: RenderLayer) {
        self.layer = layer;
    }
}
