//! Configuration module for brickctl.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::property::normalize;
use crate::domain::{
    CachingMode, DefaultProfile, DomainError, EncryptionMode, PropertyMap, PropertyValue,
    SecurityMode, DEFAULT_STORAGE_PROFILE,
};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for brickctl.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub dataset: DatasetConfig,
    pub share: ShareConfig,
}

/// Logging / tracing settings.
///
/// The libraries never install a subscriber; the embedding process reads
/// the level from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Dataset reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Value recorded in `racktop:storage_profile` on new datasets.
    pub storage_profile: String,
    /// Whether `ensure_absent_configured` destroys descendants.
    pub recursive_destroy: bool,
    /// Per-property overrides applied on top of the standard profile.
    pub defaults: PropertyMap,
}

/// Defaults for share descriptors built without explicit options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// SMB access-based enumeration.
    pub abe: bool,
    /// SMB client-side caching mode.
    pub csc: CachingMode,
    /// SMB encryption requirement.
    pub encrypt: EncryptionMode,
    /// NFS security flavor.
    pub nfs_security: SecurityMode,
    /// User-behavior monitoring on shared datasets.
    pub monitoring: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/brickctl/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("brickctl")
            .join("config.yaml")
    }

    /// Build the default property profile new datasets are created with:
    /// the standard profile, the configured storage profile, then
    /// `dataset.defaults`.
    pub fn default_profile(&self) -> Result<DefaultProfile, DomainError> {
        DefaultProfile::standard()
            .with(
                "racktop:storage_profile",
                self.dataset.storage_profile.as_str(),
            )?
            .with_all(&self.dataset.defaults)
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            storage_profile: DEFAULT_STORAGE_PROFILE.to_string(),
            recursive_destroy: false,
            defaults: PropertyMap::new(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            abe: false,
            csc: CachingMode::default(),
            encrypt: EncryptionMode::default(),
            nfs_security: SecurityMode::default(),
            monitoring: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"logging.level"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `dataset.storage_profile`.
const VALID_STORAGE_PROFILES: &[&str] =
    &["general_filesystem", "custom_filesystem", "vmware_filesystem"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        // --- dataset ---
        if !VALID_STORAGE_PROFILES.contains(&self.dataset.storage_profile.as_str()) {
            errors.push(ValidationError {
                field: "dataset.storage_profile".into(),
                message: format!(
                    "invalid storage profile '{}'; valid options: {}",
                    self.dataset.storage_profile,
                    VALID_STORAGE_PROFILES.join(", ")
                ),
            });
        }
        for (name, value) in &self.dataset.defaults {
            if let Err(err) = normalize(name, value.clone()) {
                errors.push(ValidationError {
                    field: format!("dataset.defaults.{name}"),
                    message: err.to_string(),
                });
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use brickctl_core::config::ConfigBuilder;
/// use brickctl_core::domain::EncryptionMode;
///
/// let config = ConfigBuilder::new()
///     .logging_level("debug")
///     .dataset_storage_profile("vmware_filesystem")
///     .share_encrypt(EncryptionMode::Required)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- dataset ---

    pub fn dataset_storage_profile(mut self, profile: impl Into<String>) -> Self {
        self.config.dataset.storage_profile = profile.into();
        self
    }

    pub fn dataset_recursive_destroy(mut self, recursive: bool) -> Self {
        self.config.dataset.recursive_destroy = recursive;
        self
    }

    pub fn dataset_default(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.config
            .dataset
            .defaults
            .insert(name.into(), value.into());
        self
    }

    // --- share ---

    pub fn share_abe(mut self, abe: bool) -> Self {
        self.config.share.abe = abe;
        self
    }

    pub fn share_csc(mut self, csc: CachingMode) -> Self {
        self.config.share.csc = csc;
        self
    }

    pub fn share_encrypt(mut self, encrypt: EncryptionMode) -> Self {
        self.config.share.encrypt = encrypt;
        self
    }

    pub fn share_nfs_security(mut self, security: SecurityMode) -> Self {
        self.config.share.nfs_security = security;
        self
    }

    pub fn share_monitoring(mut self, monitoring: bool) -> Self {
        self.config.share.monitoring = monitoring;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
