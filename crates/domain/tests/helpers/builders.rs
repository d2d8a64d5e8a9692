#![allow(dead_code)]
use backup_pruner_domain::{BackupRecord, BackupStatus};
use chrono::{DateTime, NaiveDate, Utc};

pub fn at(date: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn at_time(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
}

pub struct BackupRecordBuilder {
    identifier: String,
    created_at: Option<DateTime<Utc>>,
    status: BackupStatus,
    profile: String,
}

impl BackupRecordBuilder {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            created_at: Some(at("2022-01-01")),
            status: BackupStatus::Complete,
            profile: "daily".to_string(),
        }
    }

    pub fn created(mut self, date: &str) -> Self {
        self.created_at = Some(at(date));
        self
    }

    pub fn undated(mut self) -> Self {
        self.created_at = None;
        self
    }

    pub fn status(mut self, status: BackupStatus) -> Self {
        self.status = status;
        self
    }

    pub fn profile(mut self, profile: &str) -> Self {
        self.profile = profile.to_string();
        self
    }

    pub fn build(self) -> BackupRecord {
        BackupRecord::new(self.identifier, self.created_at, self.status, self.profile)
    }
}
