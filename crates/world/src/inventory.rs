//! Inventory slot ledger for the player and storage containers.
//!
//! Slots are positional: emptying a slot resets its identity but keeps its
//! position. Stacking identity is the item's display name, so two distinct
//! definitions named "Gear" share a stack.

use craftbench_core::ItemRef;

/// One positional inventory slot.
#[derive(Debug, Clone, Default)]
pub struct InventorySlot {
    /// Item held by the slot, if any.
    pub item: Option<ItemRef>,
    /// Number of items; zero means the slot is empty.
    pub quantity: u32,
}

impl InventorySlot {
    /// Slot holding `quantity` of `item`.
    pub fn new(item: ItemRef, quantity: u32) -> Self {
        Self {
            item: Some(item),
            quantity,
        }
    }

    /// Empty slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Empty when there is no item or the quantity is zero.
    pub fn is_empty(&self) -> bool {
        self.item.is_none() || self.quantity == 0
    }

    /// Display name of the held item.
    pub fn name(&self) -> Option<&str> {
        self.item.as_ref().map(|item| item.name.as_str())
    }

    /// Whether both slots hold items with the same name.
    pub fn holds_same_item(&self, other: &InventorySlot) -> bool {
        match (&self.item, &other.item) {
            (Some(a), Some(b)) => a.stacks_with(b),
            _ => false,
        }
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        self.item = None;
        self.quantity = 0;
    }
}

/// Ordered list of slots for one container.
#[derive(Debug, Clone, Default)]
pub struct SlotLedger {
    slots: Vec<InventorySlot>,
}

impl SlotLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from existing slots.
    pub fn from_slots(slots: Vec<InventorySlot>) -> Self {
        Self { slots }
    }

    /// All slots in order, including empty ones.
    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    /// Number of positional slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the ledger has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Non-empty slots in order.
    pub fn occupied(&self) -> impl Iterator<Item = &InventorySlot> {
        self.slots.iter().filter(|slot| !slot.is_empty())
    }

    /// Slot at `index`.
    pub fn get(&self, index: usize) -> Option<&InventorySlot> {
        self.slots.get(index)
    }

    /// Mutable slot at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut InventorySlot> {
        self.slots.get_mut(index)
    }

    /// Add `quantity` of `item`, stacking onto the first non-empty slot with
    /// the same name or appending a new slot. Returns the slot index used.
    pub fn add_item(&mut self, item: ItemRef, quantity: u32) -> usize {
        if let Some(index) = self.find_item(&item.name) {
            let slot = &mut self.slots[index];
            slot.quantity = slot.quantity.saturating_add(quantity);
            return index;
        }

        self.slots.push(InventorySlot::new(item, quantity));
        self.slots.len() - 1
    }

    /// Append a slot as-is, without stacking.
    pub fn push_slot(&mut self, slot: InventorySlot) {
        self.slots.push(slot);
    }

    /// Remove up to `quantity` from the slot at `index`. Returns the amount
    /// actually removed; a slot reaching zero is cleared in place.
    pub fn remove(&mut self, index: usize, quantity: u32) -> u32 {
        let Some(slot) = self.slots.get_mut(index) else {
            return 0;
        };
        if slot.is_empty() {
            return 0;
        }

        let removed = quantity.min(slot.quantity);
        slot.quantity -= removed;
        if slot.quantity == 0 {
            slot.clear();
        }
        removed
    }

    /// Index of the first non-empty slot holding `name`.
    pub fn find_item(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| !slot.is_empty() && slot.name() == Some(name))
    }

    /// Total quantity of `name` across all slots.
    pub fn count_item(&self, name: &str) -> u32 {
        self.occupied()
            .filter(|slot| slot.name() == Some(name))
            .map(|slot| slot.quantity)
            .sum()
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Which container a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerId {
    /// The player's carried inventory.
    Player,
    /// The workbench storage box.
    Storage,
}

/// Address of a slot across both containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    /// Container holding the slot.
    pub container: ContainerId,
    /// Position within the container.
    pub index: usize,
}

impl SlotRef {
    /// Slot `index` in the player inventory.
    pub fn player(index: usize) -> Self {
        Self {
            container: ContainerId::Player,
            index,
        }
    }

    /// Slot `index` in the storage box.
    pub fn storage(index: usize) -> Self {
        Self {
            container: ContainerId::Storage,
            index,
        }
    }
}

/// Result of moving one slot onto another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target was empty; contents relocated.
    Moved,
    /// Same item; quantities combined into the target.
    Merged,
    /// Different items; contents exchanged.
    Swapped,
    /// Nothing changed (empty source, same slot or bad index).
    Ignored,
}

/// Player and storage ledgers plus the in-flight drag, if any.
#[derive(Debug, Clone, Default)]
pub struct Containers {
    /// Player inventory.
    pub player: SlotLedger,
    /// Storage box.
    pub storage: SlotLedger,
    drag: Option<SlotRef>,
}

impl Containers {
    /// Empty containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a ledger.
    pub fn ledger(&self, id: ContainerId) -> &SlotLedger {
        match id {
            ContainerId::Player => &self.player,
            ContainerId::Storage => &self.storage,
        }
    }

    /// Mutably borrow a ledger.
    pub fn ledger_mut(&mut self, id: ContainerId) -> &mut SlotLedger {
        match id {
            ContainerId::Player => &mut self.player,
            ContainerId::Storage => &mut self.storage,
        }
    }

    /// Slot at `at`.
    pub fn slot(&self, at: SlotRef) -> Option<&InventorySlot> {
        self.ledger(at.container).get(at.index)
    }

    /// True when neither container holds any slot.
    pub fn is_empty(&self) -> bool {
        self.player.is_empty() && self.storage.is_empty()
    }

    /// Move the contents of `from` onto `to`: relocate into an empty target,
    /// merge onto a same-name target, otherwise swap.
    pub fn move_slot(&mut self, from: SlotRef, to: SlotRef) -> MoveOutcome {
        if from == to {
            return MoveOutcome::Ignored;
        }
        let (Some(source), Some(target)) = (self.slot(from).cloned(), self.slot(to).cloned())
        else {
            return MoveOutcome::Ignored;
        };
        if source.is_empty() {
            return MoveOutcome::Ignored;
        }

        let (new_source, new_target, outcome) = if target.is_empty() {
            (InventorySlot::empty(), source, MoveOutcome::Moved)
        } else if target.holds_same_item(&source) {
            let merged = InventorySlot {
                item: target.item,
                quantity: target.quantity.saturating_add(source.quantity),
            };
            (InventorySlot::empty(), merged, MoveOutcome::Merged)
        } else {
            (target, source, MoveOutcome::Swapped)
        };

        self.put(from, new_source);
        self.put(to, new_target);
        outcome
    }

    fn put(&mut self, at: SlotRef, slot: InventorySlot) {
        if let Some(existing) = self.ledger_mut(at.container).get_mut(at.index) {
            *existing = slot;
        }
    }

    /// Start dragging a non-empty slot. Returns false when the slot is empty
    /// or missing.
    pub fn begin_drag(&mut self, from: SlotRef) -> bool {
        if self.slot(from).is_some_and(|slot| !slot.is_empty()) {
            self.drag = Some(from);
            true
        } else {
            false
        }
    }

    /// Slot currently being dragged.
    pub fn dragging(&self) -> Option<SlotRef> {
        self.drag
    }

    /// Finish the drag on `to`. Returns `None` when nothing was being dragged.
    pub fn drop_on(&mut self, to: SlotRef) -> Option<MoveOutcome> {
        let from = self.drag.take()?;
        Some(self.move_slot(from, to))
    }

    /// Abandon the drag, leaving both containers untouched.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }
}
