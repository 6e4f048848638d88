//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/navtree/navtree.toml`
//! 3. Local config: `<dir>/.navtree.toml` (usually the working directory)
//! 4. Environment variables: `NAVTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::ident::DEFAULT_EXTERNAL_PREFIX;
use crate::domain::{expand_env_vars, DuplicatePolicy, DEFAULT_ORDER_STEP, MAX_ORDER_STEP};

/// Raw settings for intermediate parsing (all optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub menu_file: Option<PathBuf>,
    pub order_step: Option<i64>,
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub external_id_prefix: Option<String>,
}

/// Unified configuration for navtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Menu records file (default: menu.json)
    pub menu_file: PathBuf,
    /// Gap between sibling weights when renumbering (default: 10)
    pub order_step: i64,
    /// Handling of records sharing an identifier
    pub duplicate_policy: DuplicatePolicy,
    /// Prefix of generated external-link identifiers
    pub external_id_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            menu_file: PathBuf::from("menu.json"),
            order_step: DEFAULT_ORDER_STEP,
            duplicate_policy: DuplicatePolicy::default(),
            external_id_prefix: DEFAULT_EXTERNAL_PREFIX.to_string(),
        }
    }
}

/// Get the XDG config directory for navtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "navtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("navtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".navtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_policy(value: &str) -> Result<DuplicatePolicy, ApplicationError> {
    match value.trim() {
        "first-wins" => Ok(DuplicatePolicy::FirstWins),
        "reject" => Ok(DuplicatePolicy::Reject),
        other => Err(ApplicationError::Config {
            message: format!(
                "duplicate_policy: expected \"first-wins\" or \"reject\", got {:?}",
                other
            ),
        }),
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.menu_file.to_string_lossy().as_ref());
        self.menu_file = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            menu_file: overlay
                .menu_file
                .clone()
                .unwrap_or_else(|| self.menu_file.clone()),
            order_step: overlay.order_step.unwrap_or(self.order_step),
            duplicate_policy: overlay.duplicate_policy.unwrap_or(self.duplicate_policy),
            external_id_prefix: overlay
                .external_id_prefix
                .clone()
                .unwrap_or_else(|| self.external_id_prefix.clone()),
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if !(1..=MAX_ORDER_STEP).contains(&self.order_step) {
            return Err(ApplicationError::Config {
                message: format!(
                    "order_step must be between 1 and {}, got {}",
                    MAX_ORDER_STEP, self.order_step
                ),
            });
        }
        if self.external_id_prefix.is_empty() {
            return Err(ApplicationError::Config {
                message: "external_id_prefix must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.navtree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/navtree/navtree.toml`
    /// 3. Local config: `<local_dir>/.navtree.toml`
    /// 4. Environment variables: `NAVTREE_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Load from one explicit TOML file on top of defaults (no env vars).
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let mut settings = Self::default().merge_with(&raw);
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply NAVTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("NAVTREE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("menu_file") {
            settings.menu_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("order_step") {
            settings.order_step = val;
        }
        if let Ok(val) = config.get_string("duplicate_policy") {
            settings.duplicate_policy = parse_policy(&val)?;
        }
        if let Ok(val) = config.get_string("external_id_prefix") {
            settings.external_id_prefix = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# navtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/navtree/navtree.toml
#   Local:  ./.navtree.toml
#   Env:    NAVTREE_* environment variables (e.g. NAVTREE_ORDER_STEP=100)

# Menu records file (JSON array of identifier/name/weight/parent/url records)
# menu_file = "menu.json"

# Gap between sibling weights when the menu is renumbered (1..=1000000)
# order_step = 10

# Records sharing an identifier: "first-wins" keeps the first, "reject" fails
# duplicate_policy = "first-wins"

# Prefix for generated external-link identifiers
# external_id_prefix = "ext-"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
