//! Scene cameras, screen-point rays and the active-camera fallback chain.

use crate::raycast::Ray;
use craftbench_core::LayerMask;
use glam::{Mat4, UVec2, Vec2, Vec3};
use tracing::error;

/// What a camera is used for. Drives the fallback chain in [`CameraRig::active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraRole {
    /// Dedicated close-up camera over the workbench.
    Workbench,
    /// The player's main view.
    Main,
    /// Anything else in the scene.
    Other,
}

/// Render-target state that icon capture swaps out and restores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Offscreen target size, `None` when drawing to the screen.
    pub target: Option<UVec2>,
    /// Clear color (straight RGBA).
    pub clear_color: [u8; 4],
    /// Layers this camera draws.
    pub culling_mask: LayerMask,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            target: None,
            clear_color: [49, 77, 121, 255],
            culling_mask: LayerMask::ALL,
        }
    }
}

/// Perspective camera with yaw/pitch orientation.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Name used in logs.
    pub name: String,
    /// Role in the fallback chain.
    pub role: CameraRole,
    /// Disabled cameras are skipped by the rig.
    pub enabled: bool,
    /// Camera position in world space
    pub position: Vec3,
    /// Rotation about +Y (radians, 0 looks along +X)
    pub yaw: f32,
    /// Rotation above the horizon (radians)
    pub pitch: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Screen size in pixels.
    pub viewport: Vec2,
    /// Target, clear color and culling mask.
    pub render: RenderSettings,
}

impl Camera {
    /// Camera at `position` with a 60 degree field of view.
    pub fn new(name: impl Into<String>, role: CameraRole, position: Vec3, viewport: Vec2) -> Self {
        Self {
            name: name.into(),
            role,
            enabled: true,
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_3,
            near: 0.05,
            far: 500.0,
            viewport,
            render: RenderSettings::default(),
        }
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    /// Get the right direction vector.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Get the up direction vector.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize()
    }

    /// Point the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(
            -std::f32::consts::FRAC_PI_2 + 0.001,
            std::f32::consts::FRAC_PI_2 - 0.001,
        );
    }

    /// Build the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// Build the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect(), self.near, self.far)
    }

    /// Build combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotate the camera by yaw/pitch deltas.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.001,
            std::f32::consts::FRAC_PI_2 - 0.001,
        );
    }

    /// Ray through a pixel (origin top-left) from the near plane outwards.
    pub fn screen_point_to_ray(&self, screen: Vec2) -> Ray {
        let size = self.viewport.max(Vec2::ONE);
        let ndc = Vec2::new(screen.x / size.x * 2.0 - 1.0, 1.0 - screen.y / size.y * 2.0);

        let inverse = self.view_projection_matrix().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    /// Pixel position of `point`, or `None` when it is behind the camera.
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

/// Every camera in the scene.
#[derive(Debug, Clone, Default)]
pub struct CameraRig {
    cameras: Vec<Camera>,
}

impl CameraRig {
    /// Empty rig.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a camera, returning its index.
    pub fn add(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    /// All cameras.
    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    /// Mutable camera by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Camera> {
        self.cameras.get_mut(index)
    }

    fn active_index(&self) -> Option<usize> {
        let enabled = |role: Option<CameraRole>| {
            self.cameras
                .iter()
                .position(|cam| cam.enabled && role.map_or(true, |r| cam.role == r))
        };
        enabled(Some(CameraRole::Workbench))
            .or_else(|| enabled(Some(CameraRole::Main)))
            .or_else(|| enabled(None))
    }

    /// Workbench camera, else the main camera, else any enabled camera.
    pub fn active(&self) -> Option<&Camera> {
        self.active_index().map(|i| &self.cameras[i])
    }

    /// Mutable form of [`Self::active`].
    pub fn active_mut(&mut self) -> Option<&mut Camera> {
        let index = self.active_index()?;
        self.cameras.get_mut(index)
    }

    /// Ray under `screen` from the active camera. Logs and returns `None`
    /// when the scene has no usable camera.
    pub fn ray_from_screen(&self, screen: Vec2) -> Option<Ray> {
        match self.active() {
            Some(camera) => Some(camera.screen_point_to_ray(screen)),
            None => {
                error!("no camera available for pointer ray");
                None
            }
        }
    }
}
