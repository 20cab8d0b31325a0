//! Triangle mesh buffers shared by the fuser, the capture camera and the save file.

use crate::bounds::Aabb;
use glam::{Affine3A, Mat3A, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Material slot identifier. Submeshes with the same id share a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Contiguous run of `indices` drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMesh {
    /// Material used for this range.
    pub material: MaterialId,
    /// First index in [`MeshData::indices`].
    pub start: u32,
    /// Number of indices (multiple of 3).
    pub count: u32,
}

/// Indexed triangle mesh.
///
/// `normals` and `uvs` are either empty or the same length as `positions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions in local space.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals.
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Material ranges over `indices`.
    pub submeshes: Vec<SubMesh>,
}

impl MeshData {
    /// Empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether there is anything to draw.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Submesh ranges, falling back to one range over all indices with material 0.
    pub fn submesh_ranges(&self) -> Vec<SubMesh> {
        if self.submeshes.is_empty() {
            vec![SubMesh {
                material: MaterialId(0),
                start: 0,
                count: self.indices.len() as u32,
            }]
        } else {
            self.submeshes.clone()
        }
    }

    /// Local-space bounds of all vertices (zero box at the origin when empty).
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied()).unwrap_or(Aabb::ZERO)
    }

    /// Shift every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Copy of this mesh with positions and normals carried through `transform`.
    pub fn transformed(&self, transform: &Affine3A) -> MeshData {
        let normal_matrix: Mat3A = transform.matrix3.inverse().transpose();
        MeshData {
            positions: self
                .positions
                .iter()
                .map(|p| transform.transform_point3(*p))
                .collect(),
            normals: self
                .normals
                .iter()
                .map(|n| (normal_matrix * *n).normalize_or_zero())
                .collect(),
            uvs: self.uvs.clone(),
            indices: self.indices.clone(),
            submeshes: self.submeshes.clone(),
        }
    }

    /// Whether every index points at an existing vertex and attribute lengths agree.
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        (self.normals.is_empty() || self.normals.len() == n)
            && (self.uvs.is_empty() || self.uvs.len() == n)
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
            && self
                .submeshes
                .iter()
                .all(|s| (s.start + s.count) as usize <= self.indices.len())
    }

    /// Axis-aligned box with flat-shaded faces, centered on the origin.
    pub fn cuboid(size: Vec3, material: MaterialId) -> MeshData {
        let h = size * 0.5;
        // (normal, tangent u, tangent v) per face
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = MeshData::new();
        for (normal, u, v) in faces {
            let base = mesh.positions.len() as u32;
            let center = normal * h;
            let du = u * h;
            let dv = v * h;
            for (su, sv, uv) in [
                (-1.0, -1.0, Vec2::new(0.0, 0.0)),
                (1.0, -1.0, Vec2::new(1.0, 0.0)),
                (1.0, 1.0, Vec2::new(1.0, 1.0)),
                (-1.0, 1.0, Vec2::new(0.0, 1.0)),
            ] {
                mesh.positions.push(center + du * su + dv * sv);
                mesh.normals.push(normal);
                mesh.uvs.push(uv);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh.submeshes.push(SubMesh {
            material,
            start: 0,
            count: mesh.indices.len() as u32,
        });
        mesh
    }
}
