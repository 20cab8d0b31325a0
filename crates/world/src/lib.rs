//! Craft state that does not depend on rendering: the slot ledger, the trace
//! path and its validator, the frame scheduler and the item save file.

mod catalog;
mod inventory;
mod persist;
mod time;
mod trace;

pub use catalog::*;
pub use inventory::*;
pub use persist::*;
pub use time::*;
pub use trace::*;
