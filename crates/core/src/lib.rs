#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod bounds;
pub mod icon;
pub mod item;
pub mod mesh;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use bounds::Aabb;
pub use icon::{Icon, IconError};
pub use item::{ItemDefinition, ItemRef};
pub use mesh::{MaterialId, MeshData, SubMesh};

/// Rendered-frame counter. All sampling and deferred work advances per frame.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FrameTick(pub u64);

impl FrameTick {
    /// First frame of any session.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` frames.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Render layer an object is drawn on (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderLayer(pub u8);

impl RenderLayer {
    /// Layer everything starts on.
    pub const DEFAULT: Self = Self(0);
    /// Screen-space UI; never hit by gameplay rays.
    pub const UI: Self = Self(5);
    /// Isolated layer used only while capturing icons.
    pub const CAPTURE: Self = Self(31);

    /// Mask containing only this layer.
    pub fn mask(self) -> LayerMask {
        LayerMask(1u32 << (self.0 & 31))
    }
}

/// Bit set of render layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// No layer.
    pub const NONE: Self = Self(0);

    /// Whether `layer` is part of this mask.
    pub fn contains(self, layer: RenderLayer) -> bool {
        self.0 & layer.mask().0 != 0
    }

    /// This mask with `layer` removed.
    pub fn without(self, layer: RenderLayer) -> Self {
        Self(self.0 & !layer.mask().0)
    }
}
