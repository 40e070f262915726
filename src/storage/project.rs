//! Project management
//!
//! Handles project initialization and provides access to the snapshot store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, SnapshotStore};
use crate::domain::Inventory;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a medstock project. Run 'medstock init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# medstock configuration

# Actor used when --as is not given
# current_actor = "user_main"

[actors]
main = "user_main"
authorized = ["user_authorized_1"]

[[actors.registry]]
id = "user_main"
name = "Main User"

[[actors.registry]]
id = "user_authorized_1"
name = "Authorized User"

[[actors.registry]]
id = "user_unauthorized_1"
name = "Unauthorized User"

[share]
base_url = "https://medstock.local/"
compress = true

[suggest]
# Runs medstock-suggest-<plugin> from .medstock/plugins or $PATH
# plugin = "gemini"
"#;

const DEFAULT_GITIGNORE: &str = r#"# Ignore interrupted writes
*.tmp
"#;

/// A medstock project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".medstock").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(".medstock");

        let plugins_dir = data_dir.join("plugins");
        fs::create_dir_all(&plugins_dir).with_context(|| {
            format!(
                "Failed to create plugins directory: {}",
                plugins_dir.display()
            )
        })?;

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, DEFAULT_GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .medstock directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(".medstock")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the snapshot store
    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::for_project(&self.root)
    }

    /// Returns the plugins directory
    pub fn plugins_dir(&self) -> PathBuf {
        self.data_dir().join("plugins")
    }

    /// Loads the stored snapshot into an inventory using the configured actors
    pub fn load_inventory(&self) -> Result<Inventory> {
        let snapshot = self.snapshot_store().load()?;
        let inventory = Inventory::new(self.config.project.actors.clone(), snapshot);
        Ok(inventory)
    }

    /// Persists the inventory; failures are logged and returned as `false`
    pub fn save_inventory(&self, inventory: &Inventory) -> bool {
        match self.snapshot_store().save(inventory.records()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "failed to save inventory");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Actor, RecordFields};
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.data_dir().is_dir());
        assert!(project.plugins_dir().is_dir());
        assert!(project.data_dir().join("config.toml").is_file());
        assert!(project.data_dir().join(".gitignore").is_file());
    }

    #[test]
    fn default_config_matches_builtin_actors() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let config = &project.config().project;
        assert_eq!(config.actors, crate::domain::ActorRegistry::default());
        assert!(config.share.compress);
        assert!(config.suggest.plugin.is_none());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap(); // Should not fail

        assert!(dir.path().join(".medstock").is_dir());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn inventory_round_trips_through_store() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let mut inventory = project.load_inventory().unwrap();
        assert!(inventory.is_empty());

        let actor = Actor::new("user_main", "Main User");
        inventory.create(&actor, RecordFields::named("Dipirona")).unwrap();
        assert!(project.save_inventory(&inventory));

        let reloaded = project.load_inventory().unwrap();
        assert_eq!(reloaded.records(), inventory.records());
    }
}
