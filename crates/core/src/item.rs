//! Runtime item definitions.

use crate::icon::Icon;
use crate::mesh::MeshData;
use glam::Vec3;
use std::sync::Arc;

/// Shared handle to an item definition. Slots and catalogs hold these.
pub type ItemRef = Arc<ItemDefinition>;

/// Everything needed to show and spawn an item: name, description, mesh and icon.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefinition {
    /// Display name. Also the stacking identity.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Geometry for the world object, if any.
    pub mesh: Option<MeshData>,
    /// Inventory icon, if any.
    pub icon: Option<Icon>,
    /// Non-uniform scale applied to the spawned object.
    pub scale: Vec3,
}

impl ItemDefinition {
    /// Definition with only a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mesh: None,
            icon: None,
            scale: Vec3::ONE,
        }
    }

    /// Attach a mesh.
    pub fn with_mesh(mut self, mesh: MeshData) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Attach an icon.
    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Override the spawn scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> ItemRef {
        Arc::new(self)
    }

    /// Two definitions stack together when their display names match.
    pub fn stacks_with(&self, other: &ItemDefinition) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacking_is_by_name_not_instance() {
        let a = ItemDefinition::new("Gear", "small").into_ref();
        let b = ItemDefinition::new("Gear", "different text").into_ref();
        let c = ItemDefinition::new("Spring", "small").into_ref();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(a.stacks_with(&b));
        assert!(!a.stacks_with(&c));
    }
}
