//! The slice of the scene the workbench reads: cameras, colliders and the
//! items placed on the bench.

use craftbench_core::{Aabb, ItemDefinition, LayerMask, RenderLayer};
use craftbench_render::{
    raycast, BoxCollider, Camera, CameraRig, CameraRole, CollisionSurface, RayHit, SceneObject,
};
use glam::{Vec2, Vec3};

/// Cameras, collision surfaces and placed items.
#[derive(Debug, Clone, Default)]
pub struct CraftScene {
    /// Every camera; the active one follows the rig's fallback chain.
    pub cameras: CameraRig,
    /// Collidable surfaces, including the workbench top.
    pub surfaces: Vec<BoxCollider>,
    /// Objects placed on the workbench.
    pub items: Vec<SceneObject>,
    next_id: u64,
}

impl CraftScene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// A 2 x 2 bench top at y = 0 tagged `surface_tag`, a workbench camera
    /// looking down at it and a main camera further back.
    pub fn with_bench(surface_tag: &str, viewport: Vec2) -> Self {
        let mut scene = Self::new();
        scene.add_surface(
            Aabb::from_center_size(Vec3::new(0.0, -0.05, 0.0), Vec3::new(2.0, 0.1, 2.0)),
            surface_tag,
        );

        let mut bench = Camera::new("workbench", CameraRole::Workbench, Vec3::new(0.0, 2.5, 1.2), viewport);
        bench.look_at(Vec3::ZERO);
        scene.cameras.add(bench);

        let mut main = Camera::new("main", CameraRole::Main, Vec3::new(0.0, 1.7, 4.0), viewport);
        main.look_at(Vec3::ZERO);
        scene.cameras.add(main);
        scene
    }

    /// Add a workbench top with the given bounds and tag.
    pub fn add_surface(&mut self, bounds: Aabb, tag: &str) {
        self.surfaces.push(BoxCollider::new(bounds, tag));
    }

    /// Spawn `item` as an active scene object at `position`, using its mesh
    /// and scale. Returns its index in `items`.
    pub fn place_item(&mut self, item: &ItemDefinition, position: Vec3) -> usize {
        self.next_id += 1;
        let mut object = SceneObject::new(item.name.clone(), position, item.mesh.clone())
            .with_scale(item.scale);
        object.id = self.next_id;
        self.items.push(object);
        self.items.len() - 1
    }

    /// Items taking part in crafting.
    pub fn active_items(&self) -> impl Iterator<Item = &SceneObject> {
        self.items.iter().filter(|item| item.active)
    }

    /// Number of active items.
    pub fn active_count(&self) -> usize {
        self.active_items().count()
    }

    /// World positions of the active items, in placement order.
    pub fn active_positions(&self) -> Vec<Vec3> {
        self.active_items().map(|item| item.position).collect()
    }

    /// Ids of the active items, in placement order.
    pub fn active_ids(&self) -> Vec<u64> {
        self.active_items().map(|item| item.id).collect()
    }

    /// Active items among `ids`, in placement order. Items removed or
    /// deactivated since the ids were taken are left out.
    pub fn items_with_ids(&self, ids: &[u64]) -> Vec<&SceneObject> {
        self.active_items()
            .filter(|item| ids.contains(&item.id))
            .collect()
    }

    /// Remove the items with the given ids, returning how many were removed.
    pub fn consume_items(&mut self, ids: &[u64]) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        before - self.items.len()
    }

    /// Where `point` appears through the active camera.
    pub fn screen_point(&self, point: Vec3) -> Option<Vec2> {
        self.cameras.active()?.world_to_screen(point)
    }

    /// Cast from the active camera through `screen`, ignoring the UI layer.
    pub fn pick(&self, screen: Vec2, max_distance: f32) -> Option<RayHit> {
        let ray = self.cameras.ray_from_screen(screen)?;
        let mask = LayerMask::ALL.without(RenderLayer::UI);
        raycast(
            &ray,
            self.surfaces.iter().map(|s| s as &dyn CollisionSurface),
            max_distance,
            mask,
        )
    }
}
