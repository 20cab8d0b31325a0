//! Software rasterizer used for offscreen renders.
//!
//! Orthographic, flat Lambert shading, z-buffered. Good enough for item icons
//! without a GPU.

use crate::camera::Camera;
use crate::scene::Renderable;
use craftbench_core::{Aabb, Icon, MaterialId};
use glam::{Mat4, Vec2, Vec3};
use std::collections::HashMap;

/// RGBA framebuffer with a depth buffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// RGBA, 4 bytes per pixel
    pub pixels: Vec<u8>,
    /// Depth buffer
    pub depth: Vec<f32>,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Framebuffer {
    /// Buffer cleared to transparent black.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: vec![f32::MAX; width * height],
            width,
            height,
        }
    }

    /// Fill with `color` and reset depth.
    pub fn clear(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
        self.depth.fill(f32::MAX);
    }

    /// Write `color` if `z` is nearer than what is stored.
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: [u8; 4]) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y * self.width + x;
        if z >= self.depth[idx] {
            return false;
        }
        self.depth[idx] = z;
        self.pixels[idx * 4..idx * 4 + 4].copy_from_slice(&color);
        true
    }

    /// Convert into an icon.
    pub fn into_icon(self) -> Option<Icon> {
        Icon::from_rgba(self.width as u32, self.height as u32, self.pixels)
    }
}

/// Base color per material.
#[derive(Debug, Clone)]
pub struct Palette {
    overrides: HashMap<MaterialId, [u8; 3]>,
}

const BUILTIN_COLORS: [[u8; 3]; 6] = [
    [190, 190, 190],
    [196, 120, 64],
    [84, 140, 200],
    [110, 180, 90],
    [210, 190, 80],
    [170, 90, 160],
];

impl Palette {
    /// Built-in colors only.
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Assign a color to `material`.
    pub fn set(&mut self, material: MaterialId, rgb: [u8; 3]) {
        self.overrides.insert(material, rgb);
    }

    /// Color for `material`.
    pub fn color(&self, material: MaterialId) -> [u8; 3] {
        self.overrides
            .get(&material)
            .copied()
            .unwrap_or(BUILTIN_COLORS[material.0 as usize % BUILTIN_COLORS.len()])
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws renderables through a camera's render settings.
#[derive(Debug, Clone)]
pub struct SoftwareRasterizer {
    /// Material colors.
    pub palette: Palette,
    /// Direction light travels in.
    pub light_dir: Vec3,
    /// Minimum brightness of unlit faces.
    pub ambient: f32,
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self {
            palette: Palette::new(),
            light_dir: Vec3::new(-0.4, -1.0, -0.3).normalize(),
            ambient: 0.35,
        }
    }
}

impl SoftwareRasterizer {
    /// Render every object on a layer in the camera's culling mask, framed
    /// orthographically along the camera's view direction. Output size is the
    /// camera's target, or its viewport when it has none.
    pub fn render<R: Renderable + ?Sized>(&self, camera: &Camera, objects: &[&R]) -> Framebuffer {
        let size = camera
            .render
            .target
            .map(|t| Vec2::new(t.x as f32, t.y as f32))
            .unwrap_or(camera.viewport);
        let (width, height) = (size.x.max(1.0) as usize, size.y.max(1.0) as usize);
        let mut frame = Framebuffer::new(width, height);
        frame.clear(camera.render.clear_color);

        let visible: Vec<&&R> = objects
            .iter()
            .filter(|obj| camera.render.culling_mask.contains(obj.layer()))
            .collect();
        let mut bounds: Option<Aabb> = None;
        for obj in &visible {
            if let Some(b) = obj.world_bounds() {
                bounds.get_or_insert(b).encapsulate(&b);
            }
        }
        let Some(bounds) = bounds else {
            return frame;
        };

        let forward = camera.forward();
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let center = bounds.center();
        let radius = (bounds.size().length() * 0.5).max(1e-3);
        let eye = center - forward * (radius * 2.0 + 1.0);
        let view = Mat4::look_to_rh(eye, forward, up);
        let half = radius * 1.05;
        let aspect = width as f32 / height as f32;
        let proj = Mat4::orthographic_rh(
            -half * aspect.max(1.0),
            half * aspect.max(1.0),
            -half / aspect.min(1.0),
            half / aspect.min(1.0),
            0.01,
            radius * 4.0 + 2.0,
        );
        let view_proj = proj * view;

        for obj in visible {
            let Some(mesh) = obj.mesh().filter(|m| !m.is_empty()) else {
                continue;
            };
            let world = mesh.transformed(&obj.world_transform());
            for range in world.submesh_ranges() {
                let base = self.palette.color(range.material);
                let start = range.start as usize;
                let end = (start + range.count as usize).min(world.indices.len());
                for tri in world.indices[start.min(end)..end].chunks_exact(3) {
                    let Some(corners) = triangle(&world.positions, tri) else {
                        continue;
                    };
                    let mut normal = (corners[1] - corners[0])
                        .cross(corners[2] - corners[0])
                        .normalize_or_zero();
                    if normal.dot(forward) > 0.0 {
                        normal = -normal;
                    }
                    let diffuse = normal.dot(-self.light_dir).max(0.0);
                    let shade = (self.ambient + (1.0 - self.ambient) * diffuse).clamp(0.0, 1.0);
                    let color = [
                        (base[0] as f32 * shade) as u8,
                        (base[1] as f32 * shade) as u8,
                        (base[2] as f32 * shade) as u8,
                        255,
                    ];
                    let screen = corners.map(|p| {
                        let ndc = view_proj.project_point3(p);
                        Vec3::new(
                            (ndc.x + 1.0) * 0.5 * width as f32,
                            (1.0 - ndc.y) * 0.5 * height as f32,
                            ndc.z,
                        )
                    });
                    rasterize_triangle(&mut frame, screen, color);
                }
            }
        }
        frame
    }
}

fn triangle(positions: &[Vec3], tri: &[u32]) -> Option<[Vec3; 3]> {
    Some([
        *positions.get(tri[0] as usize)?,
        *positions.get(tri[1] as usize)?,
        *positions.get(tri[2] as usize)?,
    ])
}

fn edge(a: Vec3, b: Vec3, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Fill a screen-space triangle using edge functions and the depth test.
fn rasterize_triangle(frame: &mut Framebuffer, v: [Vec3; 3], color: [u8; 4]) {
    let area = edge(v[0], v[1], v[2].x, v[2].y);
    if area.abs() < f32::EPSILON {
        return;
    }

    let min_x = v.iter().map(|p| p.x).fold(f32::MAX, f32::min).floor().max(0.0) as usize;
    let min_y = v.iter().map(|p| p.y).fold(f32::MAX, f32::min).floor().max(0.0) as usize;
    let max_x = (v.iter().map(|p| p.x).fold(f32::MIN, f32::max).ceil() as i64)
        .clamp(0, frame.width as i64) as usize;
    let max_y = (v.iter().map(|p| p.y).fold(f32::MIN, f32::max).ceil() as i64)
        .clamp(0, frame.height as i64) as usize;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(v[1], v[2], px, py) / area;
            let w1 = edge(v[2], v[0], px, py) / area;
            let w2 = edge(v[0], v[1], px, py) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let z = w0 * v[0].z + w1 * v[1].z + w2 * v[2].z;
            frame.set_pixel_with_depth(x, y, z, color);
        }
    }
}
