//! Ready-made items and layouts.

use craftbench_core::{Icon, ItemDefinition, ItemRef, MaterialId, MeshData};
use glam::Vec3;

/// Item with a name only: no mesh, no icon.
pub fn bare_item(name: &str) -> ItemRef {
    ItemDefinition::new(name, format!("{name} fixture")).into_ref()
}

/// Item with a cube mesh of `size` on `material` and a solid 8x8 icon.
pub fn cube_item(name: &str, size: f32, material: u32, rgba: [u8; 4]) -> ItemRef {
    ItemDefinition::new(name, format!("{name} fixture"))
        .with_mesh(MeshData::cuboid(Vec3::splat(size), MaterialId(material)))
        .with_icon(Icon::filled(8, 8, rgba))
        .into_ref()
}

/// `count` points evenly spaced on a circle of `radius` around `center`, at
/// `center.y`.
pub fn ring_positions(center: Vec3, radius: f32, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count.max(1) as f32 * std::f32::consts::TAU;
            center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        })
        .collect()
}

/// Three cube items in distinct colors.
pub fn sample_items() -> Vec<ItemRef> {
    vec![
        cube_item("Gear", 0.2, 0, [200, 40, 40, 255]),
        cube_item("Spring", 0.1, 1, [40, 200, 40, 255]),
        cube_item("Plate", 0.3, 0, [40, 40, 200, 255]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_is_centered() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let points = ring_positions(center, 0.5, 4);
        let sum: Vec3 = points.iter().copied().sum();
        assert!((sum / 4.0 - center).length() < 1e-5);
    }
}
