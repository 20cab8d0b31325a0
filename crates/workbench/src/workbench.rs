//! The crafting context: one explicitly constructed object owning the
//! inventory, the save store and the trace session, driven once per frame.

use crate::config::WorkbenchConfig;
use crate::scene::CraftScene;
use craftbench_core::{ItemDefinition, ItemRef};
use craftbench_render::{fuse, IconCapture, SceneObject};
use craftbench_world::{
    Containers, DefaultItems, ItemCatalog, ItemStore, MoveOutcome, PointerSample, Scheduler,
    SlotRef, StartOutcome, TimerHandle, TraceEvent, TraceGuide, TraceHit, TraceState,
    TraceValidator, MIN_CRAFT_ITEMS,
};
use glam::Vec2;
use tracing::{debug, info, warn};

/// Name given to crafts confirmed with a blank name.
pub const UNNAMED_CREATION: &str = "Unnamed Creation";

/// Notified after every inventory mutation so the UI can redraw.
pub trait InventoryObserver {
    /// Re-read both containers.
    fn refresh(&mut self, containers: &Containers);
}

impl<F: FnMut(&Containers)> InventoryObserver for F {
    fn refresh(&mut self, containers: &Containers) {
        self(containers)
    }
}

/// Raw pointer state for one frame, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerInput {
    /// Pointer position (origin top-left).
    pub position: Vec2,
    /// Button went down this frame.
    pub pressed: bool,
    /// Button is held this frame.
    pub held: bool,
    /// Button went up this frame.
    pub released: bool,
}

impl PointerInput {
    /// Button down at `position` (pressed and held).
    pub fn down(position: Vec2) -> Self {
        Self {
            position,
            pressed: true,
            held: true,
            released: false,
        }
    }

    /// Button held at `position`.
    pub fn hold(position: Vec2) -> Self {
        Self {
            position,
            held: true,
            ..Self::default()
        }
    }

    /// Button released at `position`.
    pub fn up(position: Vec2) -> Self {
        Self {
            position,
            released: true,
            ..Self::default()
        }
    }

    /// No button activity.
    pub fn idle(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    ResetFailedTrace,
}

/// A successful craft.
#[derive(Debug, Clone)]
pub struct CraftedItem {
    /// The new item definition, already in storage.
    pub item: ItemRef,
    /// History id assigned by the store.
    pub id: String,
    /// Fused object as it stood in the world.
    pub object: SceneObject,
    /// Workbench items consumed.
    pub consumed: usize,
}

/// Crafting workbench: trace session, inventory and persistence.
pub struct Workbench {
    config: WorkbenchConfig,
    store: ItemStore,
    containers: Containers,
    catalog: ItemCatalog,
    validator: TraceValidator,
    session_items: Vec<u64>,
    scheduler: Scheduler<DeferredAction>,
    pending_reset: Option<TimerHandle>,
    capture: IconCapture,
    observers: Vec<Box<dyn InventoryObserver>>,
}

impl Workbench {
    /// Workbench saving to `config.save_path()`. Call [`Self::initialize`]
    /// before use.
    pub fn new(config: WorkbenchConfig) -> Self {
        Self {
            store: ItemStore::with_path(config.save_path()),
            validator: TraceValidator::new(config.trace),
            capture: IconCapture::new(config.icon_size),
            containers: Containers::new(),
            catalog: ItemCatalog::new(),
            session_items: Vec::new(),
            scheduler: Scheduler::new(),
            pending_reset: None,
            observers: Vec::new(),
            config,
        }
    }

    /// Register a UI refresh observer.
    pub fn add_observer(&mut self, observer: Box<dyn InventoryObserver>) {
        self.observers.push(observer);
    }

    /// Load the save file, then seed defaults on first run or materialize
    /// saved items otherwise.
    pub fn initialize(&mut self, storage_defaults: Vec<ItemRef>, inventory_defaults: Vec<ItemRef>) {
        let defaults = DefaultItems {
            storage: storage_defaults,
            inventory: inventory_defaults,
            storage_quantity: self.config.default_storage_quantity,
            inventory_quantity: self.config.default_inventory_quantity,
        };
        self.store.load();
        self.catalog = self.store.initialize(&defaults, &mut self.containers);
        self.notify();
    }

    /// Active configuration.
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// Player and storage containers.
    pub fn containers(&self) -> &Containers {
        &self.containers
    }

    /// Every known item by name.
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Persistence store.
    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    /// Current trace state.
    pub fn state(&self) -> TraceState {
        self.validator.state()
    }

    /// Guide to draw, while a session exists.
    pub fn guide(&self) -> Option<TraceGuide> {
        self.validator.guide()
    }

    /// Whether a failure reset is waiting to fire.
    pub fn reset_pending(&self) -> bool {
        self.pending_reset
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    /// Enough active items on the bench to start.
    pub fn can_craft(&self, scene: &CraftScene) -> bool {
        scene.active_count() >= MIN_CRAFT_ITEMS
    }

    /// Scene ids of the items taking part in the current session.
    pub fn session_items(&self) -> &[u64] {
        &self.session_items
    }

    /// Start a trace around the active items, which then belong to the
    /// session until it ends. A no-op (reported through the outcome) with too
    /// few items or while a session is running.
    pub fn start_craft(&mut self, scene: &CraftScene) -> StartOutcome {
        let outcome = self.validator.start(&scene.active_positions());
        match outcome {
            StartOutcome::Started => self.session_items = scene.active_ids(),
            StartOutcome::TooFewItems => {
                debug!(items = scene.active_count(), "craft start ignored: too few items")
            }
            StartOutcome::SessionActive => debug!("craft start ignored: session in progress"),
        }
        outcome
    }

    /// Advance one frame: fire due deferred work, then feed the pointer to
    /// the trace validator.
    pub fn frame(&mut self, dt: f64, pointer: PointerInput, scene: &CraftScene) -> Option<TraceEvent> {
        for action in self.scheduler.advance(dt) {
            match action {
                DeferredAction::ResetFailedTrace => {
                    self.pending_reset = None;
                    if self.validator.state() == TraceState::Failed {
                        info!("failed craft trace reset");
                        self.end_session();
                    }
                }
            }
        }

        if !matches!(self.validator.state(), TraceState::Armed | TraceState::Tracing) {
            return None;
        }

        let hit = if pointer.held {
            scene
                .pick(pointer.position, self.config.ray_max_distance)
                .map(|hit| TraceHit {
                    point: hit.point,
                    on_workbench: hit.tag == self.config.surface_tag,
                })
        } else {
            None
        };
        let sample = PointerSample {
            pressed: pointer.pressed,
            held: pointer.held,
            released: pointer.released,
            hit,
        };

        let event = self.validator.sample(&sample);
        if event == Some(TraceEvent::Failed) {
            let handle = self.scheduler.schedule_after(
                self.config.trace.failure_reset_delay,
                DeferredAction::ResetFailedTrace,
            );
            self.pending_reset = Some(handle);
        }
        event
    }

    /// Finish a successful trace: fuse the session's items into one object,
    /// capture its icon, store it with quantity 1, record it in the history
    /// and notify observers. `None` unless the trace succeeded. When none of
    /// the session's items are left on the bench the session is discarded.
    pub fn confirm_craft(&mut self, name: &str, scene: &mut CraftScene) -> Option<CraftedItem> {
        if self.validator.state() != TraceState::Success {
            warn!(state = ?self.validator.state(), "craft confirm ignored: trace not complete");
            return None;
        }

        let name = match name.trim() {
            "" => UNNAMED_CREATION.to_string(),
            trimmed => trimmed.to_string(),
        };

        let parts = scene.items_with_ids(&self.session_items);
        let count = parts.len();
        let part_ids: Vec<u64> = parts.iter().map(|part| part.id).collect();
        let Some(fused) = fuse(&parts) else {
            warn!("craft confirm found no session items on the bench; session discarded");
            self.end_session();
            return None;
        };
        let mut object = SceneObject::new(name.clone(), fused.position, Some(fused.mesh.clone()));

        let icon = self.capture.capture(&mut object, scene.cameras.active_mut());
        let description = format!("Player-crafted fusion of {count} items");
        let item = ItemDefinition::new(name.clone(), description.clone())
            .with_mesh(fused.mesh.clone())
            .with_icon(icon.clone())
            .into_ref();

        self.containers.storage.add_item(item.clone(), 1);
        let id = self
            .store
            .record_crafted_item(&name, &fused.mesh, &icon, &description);
        self.catalog.insert(item.clone());
        self.validator.confirm();
        self.session_items.clear();
        let consumed = scene.consume_items(&part_ids);
        self.notify();

        info!(name = %name, id = %id, parts = count, "craft succeeded");
        Some(CraftedItem {
            item,
            id,
            object,
            consumed,
        })
    }

    /// Start dragging a slot.
    pub fn begin_drag(&mut self, from: SlotRef) -> bool {
        self.containers.begin_drag(from)
    }

    /// Drop the dragged slot onto `to`, refreshing observers if anything moved.
    pub fn drop_on(&mut self, to: SlotRef) -> Option<MoveOutcome> {
        let outcome = self.containers.drop_on(to)?;
        if outcome != MoveOutcome::Ignored {
            self.notify();
        }
        Some(outcome)
    }

    /// Abandon the drag in flight.
    pub fn cancel_drag(&mut self) -> bool {
        self.containers.cancel_drag()
    }

    /// Close the crafting UI: cancel the drag and any pending failure reset,
    /// discard the session and snapshot the inventory to disk.
    pub fn close(&mut self) {
        self.containers.cancel_drag();
        if let Some(handle) = self.pending_reset.take() {
            self.scheduler.cancel(handle);
        }
        self.end_session();
        self.save_state();
    }

    fn end_session(&mut self) {
        self.validator.reset();
        self.session_items.clear();
    }

    /// Snapshot both containers to disk. Ignored before initialization.
    pub fn save_state(&mut self) -> bool {
        self.store.save_current_state(&self.containers)
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer.refresh(&self.containers);
        }
    }
}
