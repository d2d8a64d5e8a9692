#![allow(dead_code)]

use backup_pruner_domain::{BackupRecord, BackupStatus, DeletionTarget};
use chrono::{DateTime, NaiveDate, Utc};

pub fn at(date: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn backup(id: &str, date: &str, status: BackupStatus, profile: &str) -> BackupRecord {
    BackupRecord::new(id, Some(at(date)), status, profile)
}

pub fn complete(id: &str, date: &str) -> BackupRecord {
    backup(id, date, BackupStatus::Complete, "daily")
}

pub fn target() -> DeletionTarget {
    DeletionTarget {
        blueprint: "postgres-bp".to_string(),
        location_profile: "s3-profile".to_string(),
        namespace: "kanister".to_string(),
    }
}
