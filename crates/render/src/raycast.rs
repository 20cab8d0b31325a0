//! Rays against collidable scene geometry.

use craftbench_core::{Aabb, LayerMask, RenderLayer};
use glam::Vec3;

/// A 3D ray with origin and direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get point at distance t along ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a raycast against collision surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    /// World-space position of the hit point.
    pub point: Vec3,
    /// Outward normal of the face that was hit.
    pub normal: Vec3,
    /// The distance from the ray origin to the hit point.
    pub distance: f32,
    /// Tag of the surface that was hit.
    pub tag: String,
}

/// Anything a pointer ray can land on.
pub trait CollisionSurface {
    /// Layer used for mask filtering.
    fn layer(&self) -> RenderLayer;

    /// Tag reported on hits ("WorkbenchArea", ...).
    fn tag(&self) -> &str;

    /// Disabled surfaces are never hit.
    fn enabled(&self) -> bool {
        true
    }

    /// Entry distance and face normal, if the ray hits within `max_distance`.
    fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<(f32, Vec3)>;
}

/// Axis-aligned box collider.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCollider {
    /// World-space box.
    pub bounds: Aabb,
    /// Surface tag.
    pub tag: String,
    /// Layer the collider lives on.
    pub layer: RenderLayer,
    /// Whether rays can hit it.
    pub enabled: bool,
}

impl BoxCollider {
    /// Enabled collider on the default layer.
    pub fn new(bounds: Aabb, tag: impl Into<String>) -> Self {
        Self {
            bounds,
            tag: tag.into(),
            layer: RenderLayer::DEFAULT,
            enabled: true,
        }
    }

    /// Move to another layer.
    pub fn on_layer(mut self, layer: RenderLayer) -> Self {
        self.layer = layer;
        self
    }
}

impl CollisionSurface for BoxCollider {
    fn layer(&self) -> RenderLayer {
        self.layer
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    // Slab test. Rays starting inside report the exit face.
    fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<(f32, Vec3)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut near_normal = Vec3::ZERO;
        let mut far_normal = Vec3::ZERO;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (min, max) = (self.bounds.min[axis], self.bounds.max[axis]);

            if dir.abs() < f32::EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let mut t0 = (min - origin) / dir;
            let mut t1 = (max - origin) / dir;
            let mut n0 = Vec3::ZERO;
            n0[axis] = -1.0;
            let mut n1 = -n0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                std::mem::swap(&mut n0, &mut n1);
            }
            if t0 > t_near {
                t_near = t0;
                near_normal = n0;
            }
            if t1 < t_far {
                t_far = t1;
                far_normal = n1;
            }
            if t_near > t_far {
                return None;
            }
        }

        let (t, normal) = if t_near >= 0.0 {
            (t_near, near_normal)
        } else {
            (t_far, far_normal)
        };
        (t >= 0.0 && t <= max_distance).then_some((t, normal))
    }
}

/// Nearest hit among `surfaces` whose layer is in `mask`.
pub fn raycast<'a, I>(ray: &Ray, surfaces: I, max_distance: f32, mask: LayerMask) -> Option<RayHit>
where
    I: IntoIterator<Item = &'a dyn CollisionSurface>,
{
    let mut best: Option<(f32, Vec3, &dyn CollisionSurface)> = None;
    for surface in surfaces {
        if !surface.enabled() || !mask.contains(surface.layer()) {
            continue;
        }
        if let Some((distance, normal)) = surface.intersect(ray, max_distance) {
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, normal, surface));
            }
        }
    }

    best.map(|(distance, normal, surface)| RayHit {
        point: ray.at(distance),
        normal,
        distance,
        tag: surface.tag().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    fn table() -> BoxCollider {
        BoxCollider::new(
            Aabb::from_center_size(Vec3::ZERO, Vec3::new(2.0, 0.2, 2.0)),
            "WorkbenchArea",
        )
    }

    #[test]
    fn hit_reports_point_normal_and_tag() {
        let table = table();
        let hit = raycast(&down_ray(0.5, 0.5), [&table as &dyn CollisionSurface], 100.0, LayerMask::ALL)
            .unwrap();
        assert!((hit.point - Vec3::new(0.5, 0.1, 0.5)).length() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
        assert!((hit.distance - 9.9).abs() < 1e-5);
        assert_eq!(hit.tag, "WorkbenchArea");
    }

    #[test]
    fn miss_and_range_limit() {
        let table = table();
        let surfaces = [&table as &dyn CollisionSurface];
        assert!(raycast(&down_ray(5.0, 0.0), surfaces, 100.0, LayerMask::ALL).is_none());
        assert!(raycast(&down_ray(0.0, 0.0), surfaces, 5.0, LayerMask::ALL).is_none());
    }

    #[test]
    fn nearest_surface_wins_and_masked_layers_are_skipped() {
        let table = table();
        let panel = BoxCollider::new(
            Aabb::from_center_size(Vec3::new(0.0, 5.0, 0.0), Vec3::new(4.0, 0.1, 4.0)),
            "Panel",
        )
        .on_layer(RenderLayer::UI);
        let surfaces = [&table as &dyn CollisionSurface, &panel];

        let hit = raycast(&down_ray(0.0, 0.0), surfaces, 100.0, LayerMask::ALL).unwrap();
        assert_eq!(hit.tag, "Panel");

        let mask = LayerMask::ALL.without(RenderLayer::UI);
        let hit = raycast(&down_ray(0.0, 0.0), surfaces, 100.0, mask).unwrap();
        assert_eq!(hit.tag, "WorkbenchArea");
    }

    #[test]
    fn disabled_collider_is_ignored() {
        let mut table = table();
        table.enabled = false;
        assert!(raycast(&down_ray(0.0, 0.0), [&table as &dyn CollisionSurface], 100.0, LayerMask::ALL)
            .is_none());
    }
}
