//! Player item persistence.
//!
//! One binary file holds every item ever crafted (geometry, icon PNG and
//! metadata) plus the contents of the player and storage containers.
//! The file is a small header (magic, version, CRC32, payload length)
//! followed by a zstd-compressed bincode [`SaveRecord`]. Anything that fails
//! to decode is treated as corruption: the file is deleted and the store
//! starts over from an empty record.

use crate::catalog::ItemCatalog;
use crate::inventory::{Containers, InventorySlot, SlotLedger};
use craftbench_core::{Aabb, Icon, ItemDefinition, ItemRef, MeshData, SubMesh};
use crc32fast::Hasher;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Default file name inside the save directory.
pub const SAVE_FILE_NAME: &str = "player_items.dat";

/// Magic number for save identification ("CBSV" = craftbench save).
const SAVE_MAGIC: u32 = 0x4342_5356;

/// Current file framing version.
const FILE_VERSION: u16 = 1;

/// Header length in bytes.
const HEADER_LEN: usize = 14;

/// zstd level (balanced speed/compression).
const COMPRESSION_LEVEL: i32 = 3;

/// Version tag stored inside the record itself.
pub const SAVE_RECORD_VERSION: u32 = 1;

/// Errors raised while encoding, decoding or writing a save.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading or writing the file failed.
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// File shorter than its header claims.
    #[error("save file truncated: need {needed} bytes, have {found}")]
    Truncated {
        /// Bytes required.
        needed: usize,
        /// Bytes present.
        found: usize,
    },
    /// Wrong magic number.
    #[error("invalid save magic: expected 0x{expected:08X}, got 0x{found:08X}")]
    BadMagic {
        /// Expected magic.
        expected: u32,
        /// Magic in the file.
        found: u32,
    },
    /// Framing version this build cannot read.
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u16),
    /// Payload checksum mismatch.
    #[error("CRC32 mismatch: expected {expected:08X}, got {found:08X}")]
    Checksum {
        /// CRC in the header.
        expected: u32,
        /// CRC of the payload.
        found: u32,
    },
    /// zstd failure.
    #[error("failed to (de)compress save payload: {0}")]
    Compression(std::io::Error),
    /// bincode failure.
    #[error("failed to (de)serialize save record: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SaveHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl SaveHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: FILE_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.crc32.to_le_bytes());
        bytes[10..14].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() < HEADER_LEN {
            return Err(PersistError::Truncated {
                needed: HEADER_LEN,
                found: bytes.len(),
            });
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != SAVE_MAGIC {
            return Err(PersistError::BadMagic {
                expected: SAVE_MAGIC,
                found: magic,
            });
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FILE_VERSION {
            return Err(PersistError::UnsupportedVersion(version));
        }
        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

/// Bounding volume as center + size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredBounds {
    /// Box center.
    pub center: Vec3,
    /// Full box size.
    pub size: Vec3,
}

impl From<Aabb> for StoredBounds {
    fn from(bounds: Aabb) -> Self {
        Self {
            center: bounds.center(),
            size: bounds.size(),
        }
    }
}

impl From<StoredBounds> for Aabb {
    fn from(bounds: StoredBounds) -> Self {
        Aabb::from_center_size(bounds.center, bounds.size)
    }
}

/// One historical item: geometry, icon and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    /// Display name.
    pub name: String,
    /// Unique id assigned when recorded.
    pub id: String,
    /// PNG-encoded icon (empty when there was none).
    pub icon_png: Vec<u8>,
    /// Description text.
    pub description: String,
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangle indices.
    pub triangles: Vec<u32>,
    /// Vertex normals.
    pub normals: Vec<Vec3>,
    /// Vertex texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Material ranges.
    pub submeshes: Vec<SubMesh>,
    /// Mesh bounds.
    pub bounds: StoredBounds,
    /// Non-uniform spawn scale.
    pub scale: Vec3,
}

impl StoredItem {
    /// Capture `mesh` and `icon` under a fresh id.
    pub fn capture(name: &str, description: &str, mesh: Option<&MeshData>, icon: Option<&Icon>) -> Self {
        let mesh = mesh.cloned().unwrap_or_default();
        Self {
            name: name.to_string(),
            id: Uuid::new_v4().to_string(),
            icon_png: encode_icon(name, icon),
            description: description.to_string(),
            bounds: mesh.bounds().into(),
            vertices: mesh.positions,
            triangles: mesh.indices,
            normals: mesh.normals,
            uvs: mesh.uvs,
            submeshes: mesh.submeshes,
            scale: Vec3::ONE,
        }
    }

    /// Record for a designer-supplied definition, keeping its scale.
    pub fn from_definition(item: &ItemDefinition) -> Self {
        let mut stored = Self::capture(
            &item.name,
            &item.description,
            item.mesh.as_ref(),
            item.icon.as_ref(),
        );
        stored.scale = item.scale;
        stored
    }

    /// Mesh rebuilt from the stored buffers (`None` when there is no geometry).
    pub fn mesh(&self) -> Option<MeshData> {
        if self.vertices.is_empty() {
            return None;
        }
        Some(MeshData {
            positions: self.vertices.clone(),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            indices: self.triangles.clone(),
            submeshes: self.submeshes.clone(),
        })
    }

    /// Runtime definition. Unreadable icons become the gray placeholder.
    pub fn to_definition(&self) -> ItemDefinition {
        let mut item = ItemDefinition::new(&self.name, &self.description)
            .with_icon(decode_icon(&self.name, &self.icon_png))
            .with_scale(self.scale);
        item.mesh = self.mesh();
        item
    }
}

/// One saved slot: enough metadata to find the item again by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSlot {
    /// Item name (lookup key).
    pub name: String,
    /// Item description.
    pub description: String,
    /// PNG-encoded icon.
    pub icon_png: Vec<u8>,
    /// Quantity in the slot.
    pub quantity: u32,
}

impl StoredSlot {
    /// Snapshot a non-empty slot.
    pub fn from_slot(slot: &InventorySlot) -> Option<Self> {
        let item = slot.item.as_ref().filter(|_| !slot.is_empty())?;
        Some(Self {
            name: item.name.clone(),
            description: item.description.clone(),
            icon_png: encode_icon(&item.name, item.icon.as_ref()),
            quantity: slot.quantity,
        })
    }
}

/// Everything persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Record format version.
    pub save_version: u32,
    /// Every item ever recorded.
    pub items: Vec<StoredItem>,
    /// Player inventory slots.
    pub player: Vec<StoredSlot>,
    /// Storage box slots.
    pub storage: Vec<StoredSlot>,
}

impl SaveRecord {
    /// Empty record at the current version.
    pub fn new() -> Self {
        Self {
            save_version: SAVE_RECORD_VERSION,
            items: Vec::new(),
            player: Vec::new(),
            storage: Vec::new(),
        }
    }

    /// True when nothing has ever been saved.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.player.is_empty() && self.storage.is_empty()
    }
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize, compress and frame a record.
pub fn encode_record(record: &SaveRecord) -> Result<Vec<u8>, PersistError> {
    let serialized = bincode::serialize(record)?;
    let compressed =
        zstd::encode_all(&serialized[..], COMPRESSION_LEVEL).map_err(PersistError::Compression)?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let header = SaveHeader::new(hasher.finalize(), compressed.len() as u32);

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Inverse of [`encode_record`]. Never panics on arbitrary input.
pub fn decode_record(bytes: &[u8]) -> Result<SaveRecord, PersistError> {
    let header = SaveHeader::from_bytes(bytes)?;
    let payload = &bytes[HEADER_LEN..];
    let needed = header.payload_len as usize;
    if payload.len() < needed {
        return Err(PersistError::Truncated {
            needed: HEADER_LEN + needed,
            found: bytes.len(),
        });
    }
    let compressed = &payload[..needed];

    let mut hasher = Hasher::new();
    hasher.update(compressed);
    let computed = hasher.finalize();
    if computed != header.crc32 {
        return Err(PersistError::Checksum {
            expected: header.crc32,
            found: computed,
        });
    }

    let decompressed = zstd::decode_all(compressed).map_err(PersistError::Compression)?;
    Ok(bincode::deserialize(&decompressed)?)
}

fn encode_icon(name: &str, icon: Option<&Icon>) -> Vec<u8> {
    let Some(icon) = icon else {
        return Vec::new();
    };
    match icon.to_png() {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("failed to encode icon for '{name}': {err}");
            Vec::new()
        }
    }
}

fn decode_icon(name: &str, bytes: &[u8]) -> Icon {
    if bytes.is_empty() {
        warn!("no icon data for item '{name}'");
        return Icon::placeholder();
    }
    match Icon::from_png(bytes) {
        Ok(icon) => icon,
        Err(err) => {
            error!("failed to decode icon for '{name}': {err}");
            Icon::placeholder()
        }
    }
}

/// Designer-supplied items used only on first run.
#[derive(Debug, Clone)]
pub struct DefaultItems {
    /// Items seeded into the storage box.
    pub storage: Vec<ItemRef>,
    /// Items seeded into the player inventory.
    pub inventory: Vec<ItemRef>,
    /// Quantity per seeded storage slot.
    pub storage_quantity: u32,
    /// Quantity per seeded inventory slot.
    pub inventory_quantity: u32,
}

impl Default for DefaultItems {
    fn default() -> Self {
        Self {
            storage: Vec::new(),
            inventory: Vec::new(),
            storage_quantity: 1,
            inventory_quantity: 1,
        }
    }
}

/// Owner of the save file and the in-memory [`SaveRecord`].
#[derive(Debug)]
pub struct ItemStore {
    path: PathBuf,
    record: SaveRecord,
    initialized: bool,
}

impl ItemStore {
    /// Store writing `SAVE_FILE_NAME` inside `save_dir`.
    pub fn new<P: AsRef<Path>>(save_dir: P) -> Self {
        Self::with_path(save_dir.as_ref().join(SAVE_FILE_NAME))
    }

    /// Store writing to an explicit file path.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            record: SaveRecord::new(),
            initialized: false,
        }
    }

    /// Save file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// In-memory record.
    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    /// Whether first-run seeding or materialization has happened.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// No items recorded and both containers empty in the record.
    pub fn is_first_run(&self) -> bool {
        self.record.is_empty()
    }

    /// Read the record from disk. A missing file yields an empty record; a
    /// corrupt one is logged, deleted and replaced by an empty record.
    pub fn load(&mut self) {
        if !self.path.exists() {
            info!("no saved item data at {}; starting fresh", self.path.display());
            self.record = SaveRecord::new();
            return;
        }

        match fs::read(&self.path)
            .map_err(PersistError::from)
            .and_then(|bytes| decode_record(&bytes))
        {
            Ok(record) => {
                info!(
                    items = record.items.len(),
                    player = record.player.len(),
                    storage = record.storage.len(),
                    "loaded saved item data"
                );
                self.record = record;
            }
            Err(err) => {
                error!("failed to load item data from {}: {err}", self.path.display());
                self.record = SaveRecord::new();
                match fs::remove_file(&self.path) {
                    Ok(()) => info!("deleted corrupted save file"),
                    Err(err) => error!("failed to delete corrupted save file: {err}"),
                }
            }
        }
    }

    /// Write the record, replacing the previous file via a rename.
    pub fn try_save(&self) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = encode_record(&self.record)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// [`Self::try_save`], logging instead of returning the error.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => {
                info!(
                    items = self.record.items.len(),
                    player = self.record.player.len(),
                    storage = self.record.storage.len(),
                    "item data saved"
                );
                true
            }
            Err(err) => {
                error!("failed to save item data to {}: {err}", self.path.display());
                false
            }
        }
    }

    /// Append a crafted item to the history and persist. Returns its id.
    pub fn record_crafted_item(
        &mut self,
        name: &str,
        mesh: &MeshData,
        icon: &Icon,
        description: &str,
    ) -> String {
        let stored = StoredItem::capture(name, description, Some(mesh), Some(icon));
        let id = stored.id.clone();
        self.record.items.push(stored);
        self.save();
        info!("recorded player item '{name}' with id {id}");
        id
    }

    /// Copy the live containers into the record and persist. Ignored until
    /// the store has been initialized.
    pub fn save_current_state(&mut self, containers: &Containers) -> bool {
        if !self.initialized {
            return false;
        }
        self.snapshot_slots(containers);
        self.save()
    }

    fn snapshot_slots(&mut self, containers: &Containers) {
        let stored = |ledger: &SlotLedger| -> Vec<StoredSlot> {
            ledger.slots().iter().filter_map(StoredSlot::from_slot).collect()
        };
        self.record.player = stored(&containers.player);
        self.record.storage = stored(&containers.storage);
    }

    /// Seed the default items into the history and both containers, then persist.
    pub fn seed_defaults(&mut self, defaults: &DefaultItems, containers: &mut Containers) -> ItemCatalog {
        let mut catalog = ItemCatalog::new();

        for item in &defaults.storage {
            self.record.items.push(StoredItem::from_definition(item));
            containers.storage.add_item(item.clone(), defaults.storage_quantity);
            catalog.insert_if_absent(item.clone());
            info!("added '{}' to storage box", item.name);
        }

        for item in &defaults.inventory {
            if !self.record.items.iter().any(|stored| stored.name == item.name) {
                self.record.items.push(StoredItem::from_definition(item));
            }
            containers.player.add_item(item.clone(), defaults.inventory_quantity);
            catalog.insert_if_absent(item.clone());
            info!("added '{}' to player inventory", item.name);
        }

        self.snapshot_slots(containers);
        self.save();
        info!(
            storage = defaults.storage.len(),
            inventory = defaults.inventory.len(),
            "first-run defaults seeded"
        );
        catalog
    }

    /// Rebuild runtime definitions for every recorded item (plus any default
    /// not already recorded) and refill both containers from the saved slots.
    /// Slots naming unknown items are dropped.
    pub fn materialize_all(&self, defaults: &DefaultItems, containers: &mut Containers) -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        for stored in &self.record.items {
            catalog.insert(stored.to_definition().into_ref());
        }
        for item in defaults.storage.iter().chain(&defaults.inventory) {
            catalog.insert_if_absent(item.clone());
        }

        containers.player.clear();
        containers.storage.clear();
        for (saved, ledger) in [
            (&self.record.player, &mut containers.player),
            (&self.record.storage, &mut containers.storage),
        ] {
            for slot in saved {
                if slot.name.is_empty() {
                    continue;
                }
                match catalog.get(&slot.name) {
                    Some(item) => ledger.push_slot(InventorySlot::new(item, slot.quantity)),
                    None => warn!("dropping saved slot for unknown item '{}'", slot.name),
                }
            }
        }

        info!(
            player = containers.player.len(),
            storage = containers.storage.len(),
            "inventory materialized"
        );
        catalog
    }

    /// Load-time setup: seed defaults on first run, otherwise materialize.
    pub fn initialize(&mut self, defaults: &DefaultItems, containers: &mut Containers) -> ItemCatalog {
        let catalog = if self.is_first_run() {
            info!("first run detected; adding default items");
            self.seed_defaults(defaults, containers)
        } else {
            info!("existing save found; loading items");
            self.materialize_all(defaults, containers)
        };
        self.initialized = true;
        catalog
    }
}
