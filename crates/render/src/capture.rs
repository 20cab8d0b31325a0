//! Icon capture: an isolated offscreen snapshot of one object.
//!
//! The object is moved to the origin on the capture layer and the camera is
//! pointed at a square transparent target for a single render. Both are put
//! back by drop guards, so every exit path restores them.

use crate::camera::{Camera, RenderSettings};
use crate::raster::SoftwareRasterizer;
use crate::scene::CaptureTarget;
use craftbench_core::{Icon, RenderLayer};
use glam::{UVec2, Vec3};
use tracing::{debug, error, warn};

/// Default icon edge length in pixels.
pub const DEFAULT_ICON_SIZE: u32 = 256;

struct TargetRestore<'a, T: CaptureTarget + ?Sized> {
    target: &'a mut T,
    position: Vec3,
    layer: RenderLayer,
}

impl<'a, T: CaptureTarget + ?Sized> TargetRestore<'a, T> {
    fn new(target: &'a mut T) -> Self {
        let position = target.position();
        let layer = target.layer();
        Self {
            target,
            position,
            layer,
        }
    }
}

impl<T: CaptureTarget + ?Sized> Drop for TargetRestore<'_, T> {
    fn drop(&mut self) {
        self.target.set_position(self.position);
        self.target.set_layer(self.layer);
    }
}

struct CameraRestore<'a> {
    camera: &'a mut Camera,
    saved: RenderSettings,
}

impl<'a> CameraRestore<'a> {
    fn new(camera: &'a mut Camera) -> Self {
        let saved = camera.render;
        Self { camera, saved }
    }
}

impl Drop for CameraRestore<'_> {
    fn drop(&mut self) {
        self.camera.render = self.saved;
    }
}

/// Renders objects into square RGBA icons.
#[derive(Debug, Clone)]
pub struct IconCapture {
    size: u32,
    rasterizer: SoftwareRasterizer,
}

impl IconCapture {
    /// Capture producing `size` x `size` icons.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(1),
            rasterizer: SoftwareRasterizer::default(),
        }
    }

    /// Use a custom rasterizer (palette, lighting).
    pub fn with_rasterizer(mut self, rasterizer: SoftwareRasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Icon edge length.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Snapshot `target` through `camera`. Without a camera the gray
    /// placeholder is returned. The target's position and layer and the
    /// camera's render settings are unchanged afterwards.
    pub fn capture<T: CaptureTarget + ?Sized>(&self, target: &mut T, camera: Option<&mut Camera>) -> Icon {
        let mut guard = TargetRestore::new(target);
        guard.target.set_position(Vec3::ZERO);

        let Some(camera) = camera else {
            error!("no camera available for icon capture; using placeholder");
            return Icon::placeholder();
        };

        let mut cam = CameraRestore::new(camera);
        cam.camera.render = RenderSettings {
            target: Some(UVec2::splat(self.size)),
            clear_color: [0, 0, 0, 0],
            culling_mask: RenderLayer::CAPTURE.mask(),
        };
        guard.target.set_layer(RenderLayer::CAPTURE);

        let frame = self.rasterizer.render(cam.camera, &[&*guard.target]);
        match frame.into_icon() {
            Some(icon) => {
                debug!(
                    size = self.size,
                    opaque = icon.opaque_pixel_count(),
                    "icon captured"
                );
                icon
            }
            None => {
                warn!("offscreen frame had unexpected size; using placeholder");
                Icon::placeholder()
            }
        }
    }
}

impl Default for IconCapture {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraRole;
    use crate::scene::SceneObject;
    use craftbench_core::{LayerMask, MaterialId, MeshData};
    use glam::Vec2;

    fn object() -> SceneObject {
        SceneObject::new(
            "widget",
            Vec3::new(4.0, 1.0, -2.0),
            Some(MeshData::cuboid(Vec3::new(1.0, 0.5, 0.5), MaterialId(2))),
        )
    }

    fn camera() -> Camera {
        let mut cam = Camera::new("bench", CameraRole::Workbench, Vec3::new(-2.0, 2.0, 0.0), Vec2::new(640.0, 480.0));
        cam.look_at(Vec3::ZERO);
        cam
    }

    #[test]
    fn capture_restores_object_and_camera() {
        let mut obj = object();
        let mut cam = camera();
        let before_cam = cam.render;

        let icon = IconCapture::new(48).capture(&mut obj, Some(&mut cam));

        assert_eq!((icon.width(), icon.height()), (48, 48));
        assert!(icon.opaque_pixel_count() > 0);
        assert_eq!(icon.pixel(0, 0)[3], 0);
        assert_eq!(obj.position, Vec3::new(4.0, 1.0, -2.0));
        assert_eq!(obj.layer, RenderLayer::DEFAULT);
        assert_eq!(cam.render, before_cam);
        assert_eq!(cam.render.culling_mask, LayerMask::ALL);
    }

    #[test]
    fn missing_camera_yields_placeholder_and_restores_object() {
        let mut obj = object();
        let icon = IconCapture::default().capture(&mut obj, None);
        assert_eq!(icon, Icon::placeholder());
        assert_eq!(obj.position, Vec3::new(4.0, 1.0, -2.0));
    }

    #[test]
    fn object_without_mesh_gives_transparent_icon() {
        let mut obj = SceneObject::new("ghost", Vec3::ONE, None);
        let mut cam = camera();
        let icon = IconCapture::new(8).capture(&mut obj, Some(&mut cam));
        assert_eq!(icon.opaque_pixel_count(), 0);
        assert_eq!(icon.width(), 8);
    }
}
