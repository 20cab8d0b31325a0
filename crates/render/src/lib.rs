#![warn(missing_docs)]
//! Scene-facing side of crafting: cameras and pointer rays, collision
//! surfaces, geometry fusion and offscreen icon capture.

mod camera;
mod capture;
mod fuse;
mod raster;
mod raycast;
mod scene;

pub use camera::{Camera, CameraRig, CameraRole, RenderSettings};
pub use capture::{IconCapture, DEFAULT_ICON_SIZE};
pub use fuse::{fuse, FusedMesh};
pub use raster::{Framebuffer, Palette, SoftwareRasterizer};
pub use raycast::{raycast, BoxCollider, CollisionSurface, Ray, RayHit};
pub use scene::{CaptureTarget, Renderable, SceneObject};
