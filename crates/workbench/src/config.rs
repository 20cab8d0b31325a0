//! Workbench configuration loaded from TOML, falling back to defaults when
//! the file is missing or unreadable.

use anyhow::Result;
use craftbench_world::{TraceSettings, SAVE_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Default location of the workbench config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/workbench.toml";

/// Tunables for the crafting workbench.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Directory holding the save file.
    pub save_dir: PathBuf,
    /// Save file name inside `save_dir`.
    pub save_file: String,
    /// Collision tag of the workbench surface.
    pub surface_tag: String,
    /// Longest pointer ray, in world units.
    pub ray_max_distance: f32,
    /// Icon edge length in pixels.
    pub icon_size: u32,
    /// Quantity of each first-run storage item.
    pub default_storage_quantity: u32,
    /// Quantity of each first-run inventory item.
    pub default_inventory_quantity: u32,
    /// Trace path and matching parameters.
    pub trace: TraceSettings,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            save_file: SAVE_FILE_NAME.to_string(),
            surface_tag: "WorkbenchArea".to_string(),
            ray_max_distance: 100.0,
            icon_size: 256,
            default_storage_quantity: 1,
            default_inventory_quantity: 1,
            trace: TraceSettings::default(),
        }
    }
}

impl WorkbenchConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<WorkbenchConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    WorkbenchConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!(
                        "Workbench config not found at {}. Using defaults",
                        path.display()
                    );
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                WorkbenchConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Full path of the save file.
    pub fn save_path(&self) -> PathBuf {
        self.save_dir.join(&self.save_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = WorkbenchConfig::load_from_path(&dir.path().join("nope.toml"));
        assert_eq!(cfg, WorkbenchConfig::default());
        assert_eq!(cfg.trace.tolerance, 1.25);
        assert_eq!(cfg.save_path(), PathBuf::from("saves/player_items.dat"));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("workbench.toml");
        fs::write(
            &path,
            "icon_size = 64\nsurface_tag = \"Bench\"\n\n[trace]\ntolerance = 0.5\n",
        )
        .unwrap();

        let cfg = WorkbenchConfig::load_from_path(&path);
        assert_eq!(cfg.icon_size, 64);
        assert_eq!(cfg.surface_tag, "Bench");
        assert_eq!(cfg.trace.tolerance, 0.5);
        assert_eq!(cfg.trace.base_radius, 0.08);
        assert_eq!(cfg.ray_max_distance, 100.0);
    }

    #[test]
    fn garbage_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("workbench.toml");
        fs::write(&path, "icon_size = [[[").unwrap();
        assert_eq!(WorkbenchConfig::load_from_path(&path), WorkbenchConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/workbench.toml");
        let cfg = WorkbenchConfig {
            icon_size: 128,
            ..WorkbenchConfig::default()
        };
        cfg.save_to_path(&path).unwrap();
        assert_eq!(WorkbenchConfig::load_from_path(&path), cfg);
    }
}
