use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::ConfigError;
use super::kanister::{KanisterConfig, KubernetesConfig};
use super::logging::LoggingConfig;
use super::profiles::{ProfileConfig, WindowsConfig};
use super::schedule::ScheduleConfig;
use super::server::ServerConfig;
use crate::retention::{DeletionTarget, RetentionProfile};

const LOCAL_CONFIG_PATH: &str = "backup-pruner.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/backup-pruner/config.toml";

/// Main configuration structure for backup-pruner
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub kanister: KanisterConfig,

    #[serde(default)]
    pub kubernetes: KubernetesConfig,

    /// Age-bucketed daily/weekly windows
    #[serde(default)]
    pub windows: Option<WindowsConfig>,

    /// Unified-policy profiles
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,

    /// Directories holding one ConfigMap-style profile each
    #[serde(default)]
    pub profile_dirs: Vec<String>,
}

impl Default for Config {
    /// Without a config file the daily/weekly windows are active, matching
    /// the command-line defaults.
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            schedule: ScheduleConfig::default(),
            kanister: KanisterConfig::default(),
            kubernetes: KubernetesConfig::default(),
            windows: Some(WindowsConfig::default()),
            profiles: Vec::new(),
            profile_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. backup-pruner.toml in current directory
    /// 3. /etc/backup-pruner/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(bind) = overrides.metrics_bind {
            self.server.metrics_bind = bind;
        }
        if let Some(secs) = overrides.interval_secs {
            self.schedule.interval_secs = secs;
        }
        if let Some(namespace) = overrides.kanister_namespace {
            self.kanister.namespace = namespace;
        }

        let touches_windows = overrides.daily_backups.is_some()
            || overrides.weekly_backups.is_some()
            || overrides.blueprint_name.is_some()
            || overrides.location_profile.is_some();
        if touches_windows {
            let windows = self.windows.get_or_insert_with(WindowsConfig::default);
            if let Some(daily) = overrides.daily_backups {
                windows.daily = daily;
            }
            if let Some(weekly) = overrides.weekly_backups {
                windows.weekly = weekly;
            }
            if let Some(blueprint) = overrides.blueprint_name {
                windows.blueprint = blueprint;
            }
            if let Some(profile) = overrides.location_profile {
                windows.location_profile = profile;
            }
        }
    }

    /// Every configured profile: windows first, then inline profiles, then
    /// profile directories.
    pub fn retention_profiles(&self) -> Result<Vec<RetentionProfile>, ConfigError> {
        let mut profiles = Vec::new();

        if let Some(windows) = &self.windows {
            for policy in windows.policies() {
                profiles.push(RetentionProfile {
                    policy,
                    target: DeletionTarget {
                        blueprint: windows.blueprint.clone(),
                        location_profile: windows.location_profile.clone(),
                        namespace: self.kanister.namespace.clone(),
                    },
                });
            }
        }

        for profile in &self.profiles {
            profiles.push(profile.to_retention_profile(&self.kanister.namespace));
        }

        for dir in &self.profile_dirs {
            let profile = ProfileConfig::from_dir(dir)?;
            profiles.push(profile.to_retention_profile(&self.kanister.namespace));
        }

        let mut seen = HashSet::new();
        for profile in &profiles {
            profile
                .policy
                .validate()
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
            if !seen.insert(profile.name().to_string()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate retention profile: {}",
                    profile.name()
                )));
            }
        }

        Ok(profiles)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Schedule interval cannot be 0".to_string(),
            ));
        }
        if self.kanister.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Deletion poll interval cannot be 0".to_string(),
            ));
        }
        if self.kanister.namespace.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Kanister namespace cannot be empty".to_string(),
            ));
        }
        if self.retention_profiles()?.is_empty() {
            return Err(ConfigError::Validation(
                "No retention profiles configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub metrics_bind: Option<String>,
    pub interval_secs: Option<u64>,
    pub kanister_namespace: Option<String>,
    pub daily_backups: Option<u32>,
    pub weekly_backups: Option<u32>,
    pub blueprint_name: Option<String>,
    pub location_profile: Option<String>,
}
