#![warn(missing_docs)]
//! Crafting workbench: wires the trace minigame, geometry fusion, icon
//! capture, the inventory ledger and the save file into one context object.

mod config;
mod scene;
mod workbench;

pub use config::{WorkbenchConfig, DEFAULT_CONFIG_PATH};
pub use scene::CraftScene;
pub use workbench::{
    CraftedItem, InventoryObserver, PointerInput, Workbench, UNNAMED_CREATION,
};
