//! Geometry fusion: many placed items into one mesh centered on its own pivot.

use crate::scene::Renderable;
use craftbench_core::{Aabb, MaterialId, MeshData, SubMesh};
use glam::{Affine3A, Vec2, Vec3};
use tracing::{debug, warn};

/// Output of [`fuse`].
#[derive(Debug, Clone, PartialEq)]
pub struct FusedMesh {
    /// Combined mesh whose bounds are centered on the local origin.
    pub mesh: MeshData,
    /// World position that keeps the fused geometry where the items were.
    pub position: Vec3,
    /// Items that contributed geometry.
    pub contributed: usize,
    /// Items skipped for lacking geometry.
    pub skipped: usize,
}

impl FusedMesh {
    /// Local-to-world transform of the fused object.
    pub fn world_transform(&self) -> Affine3A {
        Affine3A::from_translation(self.position)
    }
}

/// Triangles grouped per material, in first-seen material order.
#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    groups: Vec<(MaterialId, Vec<u32>)>,
}

impl MeshBuilder {
    fn append(&mut self, mesh: &MeshData) {
        let base = self.positions.len() as u32;
        let count = mesh.positions.len();
        self.positions.extend_from_slice(&mesh.positions);
        self.normals
            .extend((0..count).map(|i| mesh.normals.get(i).copied().unwrap_or(Vec3::Y)));
        self.uvs
            .extend((0..count).map(|i| mesh.uvs.get(i).copied().unwrap_or(Vec2::ZERO)));

        for range in mesh.submesh_ranges() {
            let start = range.start as usize;
            let end = (start + range.count as usize).min(mesh.indices.len());
            let Some(indices) = mesh.indices.get(start..end) else {
                continue;
            };
            let group = match self.groups.iter().position(|(m, _)| *m == range.material) {
                Some(i) => &mut self.groups[i].1,
                None => {
                    self.groups.push((range.material, Vec::new()));
                    let last = self.groups.len() - 1;
                    &mut self.groups[last].1
                }
            };
            group.extend(indices.iter().map(|&i| base + i));
        }
    }

    fn build(self) -> MeshData {
        let mut indices = Vec::new();
        let mut submeshes = Vec::with_capacity(self.groups.len());
        for (material, group) in self.groups {
            submeshes.push(SubMesh {
                material,
                start: indices.len() as u32,
                count: group.len() as u32,
            });
            indices.extend(group);
        }
        MeshData {
            positions: self.positions,
            normals: self.normals,
            uvs: self.uvs,
            indices,
            submeshes,
        }
    }
}

/// Fuse `items` into one mesh.
///
/// The union of the items' world bounds (seeded at the first item's position)
/// gives the shared center. Every mesh is brought into the space of a root
/// placed at that center and concatenated, keeping material groups. The
/// result is then shifted so its bounds center sits at the local origin, and
/// `position` absorbs that shift so nothing moves visually. Items without
/// geometry are skipped. Returns `None` only for an empty item list.
pub fn fuse<R: Renderable + ?Sized>(items: &[&R]) -> Option<FusedMesh> {
    let first = items.first()?;

    let mut total = Aabb::at_point(first.world_transform().translation.into());
    for item in items {
        if let Some(bounds) = item.world_bounds() {
            total.encapsulate(&bounds);
        }
    }
    let center = total.center();
    let to_root = Affine3A::from_translation(-center);

    let mut builder = MeshBuilder::default();
    let mut contributed = 0;
    let mut skipped = 0;
    for item in items {
        match item.mesh().filter(|mesh| !mesh.is_empty()) {
            Some(mesh) => {
                builder.append(&mesh.transformed(&(to_root * item.world_transform())));
                contributed += 1;
            }
            None => {
                warn!("skipping workbench item without renderable geometry");
                skipped += 1;
            }
        }
    }

    let mut mesh = builder.build();
    let pivot = if mesh.is_empty() {
        Vec3::ZERO
    } else {
        mesh.bounds().center()
    };
    mesh.translate(-pivot);

    debug!(
        contributed,
        skipped,
        vertices = mesh.vertex_count(),
        "fused workbench items"
    );
    Some(FusedMesh {
        mesh,
        position: center + pivot,
        contributed,
        skipped,
    })
}
