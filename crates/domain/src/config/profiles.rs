use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::errors::ConfigError;
use crate::retention::{CountCap, DeletionTarget, RetentionAge, RetentionPolicy, RetentionProfile};

/// Count and age limits of one profile. Every field accepts an integer or a
/// numeric string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetentionConfig {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub minutes: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub hours: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub days: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub months: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub years: Option<u32>,
}

impl RetentionConfig {
    pub fn count_cap(&self) -> CountCap {
        match self.count {
            Some(count) => CountCap::Limit(count as usize),
            None => CountCap::Unlimited,
        }
    }

    pub fn max_age(&self) -> RetentionAge {
        RetentionAge {
            years: self.years.unwrap_or(0),
            months: self.months.unwrap_or(0),
            days: self.days.unwrap_or(0),
            hours: self.hours.unwrap_or(0),
            minutes: self.minutes.unwrap_or(0),
        }
    }

    fn set(&mut self, field: &str, raw: &str) -> Result<(), ConfigError> {
        let value = Some(parse_u32(&format!("retention.{}", field), raw)?);
        match field {
            "count" => self.count = value,
            "minutes" => self.minutes = value,
            "hours" => self.hours = value,
            "days" => self.days = value,
            "months" => self.months = value,
            "years" => self.years = value,
            other => {
                return Err(ConfigError::Validation(format!(
                    "Unknown retention field: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// A retention profile as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfileConfig {
    /// Schedule tag of the backups this profile manages.
    pub name: String,

    #[serde(default)]
    pub namespace: Option<String>,

    pub blueprint: String,

    /// Kanister location profile of the object store holding the backups.
    pub profile: String,

    #[serde(default)]
    pub retention: RetentionConfig,
}

impl ProfileConfig {
    /// Builds a profile from flat key-value data, e.g. a ConfigMap.
    ///
    /// Recognised keys: `name`, `namespace`, `blueprint`, `profile` and
    /// either `retention` (a JSON object) or `retention.<field>` entries.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let required = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::Validation(format!("Missing profile key: {}", key)))
        };

        let mut retention = match map.get("retention") {
            Some(raw) => serde_json::from_str::<RetentionConfig>(raw)
                .map_err(|e| ConfigError::Parse(format!("retention: {}", e)))?,
            None => RetentionConfig::default(),
        };

        for (key, value) in map {
            if let Some(field) = key.strip_prefix("retention.") {
                retention.set(field, value)?;
            }
        }

        Ok(Self {
            name: required("name")?,
            namespace: map
                .get("namespace")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            blueprint: required("blueprint")?,
            profile: required("profile")?,
            retention,
        })
    }

    /// Reads a directory holding one file per key, the layout of a mounted
    /// ConfigMap. Hidden entries (`..data` and friends) are ignored.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let read_err = |e: std::io::Error| ConfigError::FileRead(path.display().to_string(), e.to_string());

        let mut map = BTreeMap::new();
        for entry in std::fs::read_dir(path).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let key = entry.file_name().to_string_lossy().into_owned();
            if key.starts_with('.') || !entry.path().is_file() {
                continue;
            }
            let value = std::fs::read_to_string(entry.path())
                .map_err(|e| ConfigError::FileRead(entry.path().display().to_string(), e.to_string()))?;
            map.insert(key, value.trim().to_string());
        }

        Self::from_map(&map)
    }

    pub fn to_retention_profile(&self, default_namespace: &str) -> RetentionProfile {
        RetentionProfile {
            policy: RetentionPolicy::new(
                self.name.clone(),
                self.retention.count_cap(),
                self.retention.max_age(),
            ),
            target: DeletionTarget {
                blueprint: self.blueprint.clone(),
                location_profile: self.profile.clone(),
                namespace: self
                    .namespace
                    .clone()
                    .unwrap_or_else(|| default_namespace.to_string()),
            },
        }
    }
}

/// Daily/weekly windows over backups tagged `daily` and `weekly`.
/// A window set to 0 is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowsConfig {
    #[serde(default = "default_daily", deserialize_with = "lenient_u32_required")]
    pub daily: u32,

    #[serde(default = "default_weekly", deserialize_with = "lenient_u32_required")]
    pub weekly: u32,

    #[serde(default = "default_blueprint")]
    pub blueprint: String,

    #[serde(default = "default_location_profile")]
    pub location_profile: String,
}

impl WindowsConfig {
    pub fn policies(&self) -> Vec<RetentionPolicy> {
        let mut policies = Vec::with_capacity(2);
        if self.daily > 0 {
            policies.push(RetentionPolicy::daily(self.daily));
        }
        if self.weekly > 0 {
            policies.push(RetentionPolicy::weekly(self.weekly));
        }
        policies
    }
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            daily: default_daily(),
            weekly: default_weekly(),
            blueprint: default_blueprint(),
            location_profile: default_location_profile(),
        }
    }
}

fn default_daily() -> u32 {
    7
}

fn default_weekly() -> u32 {
    4
}

fn default_blueprint() -> String {
    "postgres-bp".to_string()
}

fn default_location_profile() -> String {
    "s3-profile".to_string()
}

fn parse_u32(field: &str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

impl NumberOrString {
    fn into_u32<E: serde::de::Error>(self) -> Result<u32, E> {
        match self {
            Self::Number(n) => u32::try_from(n)
                .map_err(|_| E::custom(format!("number out of range: {}", n))),
            Self::Text(s) => s
                .trim()
                .parse::<u32>()
                .map_err(|_| E::custom(format!("invalid number: {:?}", s))),
        }
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_u32)
        .transpose()
}

fn lenient_u32_required<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_u32()
}
