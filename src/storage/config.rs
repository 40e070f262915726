//! Configuration handling for medstock
//!
//! Configuration is stored in `.medstock/config.toml` (project) and
//! `~/.config/medstock/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Actor, ActorError, ActorRegistry};

/// Base URL used for share links when none is configured
pub const DEFAULT_SHARE_BASE_URL: &str = "https://medstock.local/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Share link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// URL the share link is built on
    pub base_url: String,

    /// Gzip the payload before encoding
    pub compress: bool,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            compress: true,
        }
    }
}

/// Suggestion plugin settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SuggestConfig {
    /// Plugin name, resolved as `medstock-suggest-<name>`
    pub plugin: Option<String>,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Known actors and their roles
    pub actors: ActorRegistry,

    /// Actor used when `--as` is not given
    pub current_actor: Option<String>,

    /// Share link settings
    pub share: ShareConfig,

    /// Suggestion plugin settings
    pub suggest: SuggestConfig,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Actor used when neither `--as` nor the project names one
    pub actor: Option<String>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (project, project_root) = Self::load_project()?;

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "medstock", "medstock").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Picks the acting user: explicit override, then project, then global,
    /// then the registry's main actor.
    pub fn resolve_actor(&self, explicit: Option<&str>) -> Result<Actor> {
        let registry = &self.project.actors;
        let chosen = explicit
            .or(self.project.current_actor.as_deref())
            .or(self.global.actor.as_deref());

        match chosen {
            Some(id) => Ok(registry.require(id)?.clone()),
            None => registry
                .main_actor()
                .cloned()
                .ok_or_else(|| ActorError::UnknownMain(registry.main.clone()).into()),
        }
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Finds and loads project configuration
    fn load_project() -> Result<(ProjectConfig, Option<PathBuf>)> {
        match Self::find_project_root() {
            Some(root) => {
                let config = Self::load_project_config(&root)?;
                Ok((config, Some(root)))
            }
            None => Ok((ProjectConfig::default(), None)),
        }
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".medstock").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        Self::parse_project_config(&content).context("Failed to parse project config")
    }

    fn parse_project_config(content: &str) -> Result<ProjectConfig, ConfigError> {
        let config: ProjectConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config
            .actors
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }

    /// Finds the project root by looking for `.medstock/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(".medstock").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a medstock project. Run 'medstock init' first."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with(project: ProjectConfig, global: GlobalConfig) -> Config {
        Config {
            project,
            global,
            project_root: None,
        }
    }

    #[test]
    fn default_config() {
        let config = config_with(ProjectConfig::default(), GlobalConfig::default());

        assert!(config.project.share.compress);
        assert_eq!(config.project.share.base_url, DEFAULT_SHARE_BASE_URL);
        assert_eq!(config.project.actors.main, "user_main");
        assert_eq!(config.global.default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
current_actor = "ana"

[actors]
main = "ana"
authorized = ["bia"]

[[actors.registry]]
id = "ana"
name = "Ana"

[[actors.registry]]
id = "bia"
name = "Bia"

[share]
base_url = "https://stock.example/"
compress = false

[suggest]
plugin = "gemini"
"#;

        let config = Config::parse_project_config(toml).unwrap();
        assert_eq!(config.current_actor.as_deref(), Some("ana"));
        assert_eq!(config.actors.authorized, vec!["bia"]);
        assert!(!config.share.compress);
        assert_eq!(config.suggest.plugin.as_deref(), Some("gemini"));
    }

    #[test]
    fn inconsistent_actors_are_rejected() {
        let toml = r#"
[actors]
main = "ghost"

[[actors.registry]]
id = "ana"
name = "Ana"
"#;

        assert!(matches!(
            Config::parse_project_config(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
actor = "user_authorized_1"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.actor.as_deref(), Some("user_authorized_1"));
    }

    #[test]
    fn resolve_actor_precedence() {
        let project = ProjectConfig {
            current_actor: Some("user_authorized_1".to_string()),
            ..ProjectConfig::default()
        };
        let global = GlobalConfig {
            actor: Some("user_unauthorized_1".to_string()),
            ..GlobalConfig::default()
        };
        let config = config_with(project, global);

        assert_eq!(config.resolve_actor(Some("user_main")).unwrap().id, "user_main");
        assert_eq!(config.resolve_actor(None).unwrap().id, "user_authorized_1");

        let fallback = config_with(ProjectConfig::default(), GlobalConfig::default());
        assert_eq!(fallback.resolve_actor(None).unwrap().id, "user_main");
    }

    #[test]
    fn resolve_unknown_actor_fails() {
        let config = config_with(ProjectConfig::default(), GlobalConfig::default());
        assert!(config.resolve_actor(Some("nobody")).is_err());
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".medstock")).unwrap();

        // Change to a subdirectory
        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();
        std::env::set_current_dir(&sub_dir).unwrap();

        let root = Config::find_project_root();
        // Canonicalize both paths to handle macOS /var -> /private/var symlinks
        let expected = dir.path().canonicalize().ok();
        let actual = root.and_then(|p| p.canonicalize().ok());
        assert_eq!(actual, expected);

        // Reset current dir to avoid affecting other tests
        std::env::set_current_dir(dir.path()).unwrap();
    }

    #[test]
    fn config_not_in_project() {
        let config = config_with(ProjectConfig::default(), GlobalConfig::default());
        assert!(config.require_project_root().is_err());
    }
}
