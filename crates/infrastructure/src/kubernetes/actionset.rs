//! Kanister `ActionSet` schema and its normalization into [`BackupRecord`].
//!
//! Every field is optional so a single malformed object never aborts a
//! listing: it decodes to [`Decoded::Skip`] instead.

use backup_pruner_domain::{BackupRecord, BackupStatus, NO_PROFILE};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const BACKUP_ACTION: &str = "backup";
const SCHEDULE_KEY: &str = "backup-schedule";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionSetList {
    pub items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionSet {
    pub metadata: ObjectMeta,
    pub spec: Option<ActionSetSpec>,
    pub status: Option<ActionSetStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub creation_timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionSetSpec {
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionSpec {
    pub name: Option<String>,
    pub options: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionSetStatus {
    pub state: Option<String>,
    pub actions: Vec<ActionStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActionStatus {
    pub artifacts: Option<BTreeMap<String, Artifact>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Artifact {
    pub key_value: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoActions,
    NotABackup(String),
    MissingName,
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActions => f.write_str("no actions"),
            Self::NotABackup(action) => write!(f, "action is {:?}", action),
            Self::MissingName => f.write_str("no metadata.name"),
            Self::Malformed(e) => write!(f, "malformed object: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Backup(BackupRecord),
    Skip(SkipReason),
}

impl ActionSet {
    /// State of the action set, `Unknown` when it has no status yet.
    pub fn state(&self) -> BackupStatus {
        self.status
            .as_ref()
            .and_then(|s| s.state.as_deref())
            .map(BackupStatus::parse)
            .unwrap_or(BackupStatus::Unknown)
    }

    fn schedule(&self) -> Option<String> {
        let from_options = self
            .spec
            .as_ref()
            .and_then(|spec| spec.actions.first())
            .and_then(|action| action.options.as_ref())
            .and_then(|options| options.get(SCHEDULE_KEY))
            .and_then(scalar_to_string);

        from_options.or_else(|| {
            self.status
                .iter()
                .flat_map(|status| status.actions.iter())
                .filter_map(|action| action.artifacts.as_ref())
                .flat_map(|artifacts| artifacts.values())
                .filter_map(|artifact| artifact.key_value.as_ref())
                .find_map(|kv| kv.get(SCHEDULE_KEY).and_then(scalar_to_string))
        })
    }

    pub fn into_record(self) -> Decoded {
        let action = match self.spec.as_ref().and_then(|spec| spec.actions.first()) {
            Some(action) => action.name.clone().unwrap_or_default(),
            None => return Decoded::Skip(SkipReason::NoActions),
        };
        if action != BACKUP_ACTION {
            return Decoded::Skip(SkipReason::NotABackup(action));
        }

        let identifier = match self.metadata.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Decoded::Skip(SkipReason::MissingName),
        };

        let created_at = self
            .metadata
            .creation_timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|t| t.with_timezone(&Utc));

        let profile = self.schedule().unwrap_or_else(|| NO_PROFILE.to_string());

        Decoded::Backup(BackupRecord::new(
            identifier,
            created_at,
            self.state(),
            profile,
        ))
    }
}

/// Decodes one raw list item.
pub fn decode(item: Value) -> Decoded {
    match serde_json::from_value::<ActionSet>(item) {
        Ok(action_set) => action_set.into_record(),
        Err(e) => Decoded::Skip(SkipReason::Malformed(e.to_string())),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}
