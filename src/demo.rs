//! Demo content for the headless driver: first-run defaults and a bench
//! with a few parts laid out on it.

use craftbench_core::{Icon, ItemDefinition, ItemRef, MaterialId, MeshData};
use craftbench_workbench::{CraftScene, WorkbenchConfig};
use glam::{Vec2, Vec3};

pub const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

fn part(name: &str, description: &str, size: Vec3, material: u32, rgba: [u8; 4]) -> ItemRef {
    ItemDefinition::new(name, description)
        .with_mesh(MeshData::cuboid(size, MaterialId(material)))
        .with_icon(Icon::filled(16, 16, rgba))
        .into_ref()
}

pub fn storage_defaults() -> Vec<ItemRef> {
    vec![
        part("Gear", "A toothed wheel", Vec3::new(0.25, 0.05, 0.25), 0, [180, 60, 50, 255]),
        part("Spring", "A coiled spring", Vec3::new(0.08, 0.2, 0.08), 1, [70, 170, 70, 255]),
        part("Plate", "A flat metal plate", Vec3::new(0.35, 0.03, 0.2), 2, [60, 90, 190, 255]),
    ]
}

pub fn inventory_defaults() -> Vec<ItemRef> {
    vec![part("Bolt", "A short bolt", Vec3::new(0.04, 0.12, 0.04), 3, [200, 190, 80, 255])]
}

/// Bench scene with every storage default placed around the middle.
pub fn scene(config: &WorkbenchConfig, parts: &[ItemRef]) -> CraftScene {
    let mut scene = CraftScene::with_bench(&config.surface_tag, VIEWPORT);
    let count = parts.len().max(1);
    for (i, item) in parts.iter().enumerate() {
        let angle = i as f32 / count as f32 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos() * 0.45, 0.1, angle.sin() * 0.45);
        scene.place_item(item, position);
    }
    scene
}
