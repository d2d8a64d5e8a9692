use chrono::{DateTime, Days, Months, TimeDelta, Utc};
use std::fmt;

use crate::errors::DomainError;

/// Composite maximum age of a retained backup.
///
/// Applied to "now" with calendar arithmetic: years and months first, then
/// days, then hours and minutes. Month subtraction clamps to the last valid
/// day of the target month, so the order matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionAge {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl RetentionAge {
    pub fn days(days: u32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }

    /// Oldest instant a retained backup may have, exclusive.
    ///
    /// Returns `None` when no age limit is configured. An age reaching past
    /// the representable range saturates at the earliest representable time.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_unbounded() {
            return None;
        }

        let total_months = self
            .years
            .checked_mul(12)
            .and_then(|m| m.checked_add(self.months));

        let cutoff = total_months
            .and_then(|m| now.checked_sub_months(Months::new(m)))
            .and_then(|t| t.checked_sub_days(Days::new(u64::from(self.days))))
            .and_then(|t| t.checked_sub_signed(TimeDelta::hours(i64::from(self.hours))))
            .and_then(|t| t.checked_sub_signed(TimeDelta::minutes(i64::from(self.minutes))))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        Some(cutoff)
    }
}

impl fmt::Display for RetentionAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            return f.write_str("unbounded");
        }
        write!(
            f,
            "{}y{}mo{}d{}h{}m",
            self.years, self.months, self.days, self.hours, self.minutes
        )
    }
}

/// Cap on the number of retained complete backups.
///
/// `Limit(0)` is an explicit "retain none"; an absent cap is `Unlimited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountCap {
    Unlimited,
    Limit(usize),
}

impl CountCap {
    /// Number of backups over the cap.
    pub fn excess(&self, retained: usize) -> usize {
        match self {
            Self::Unlimited => 0,
            Self::Limit(max) => retained.saturating_sub(*max),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl fmt::Display for CountCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Limit(max) => write!(f, "{}", max),
        }
    }
}

/// How many and how long backups of one profile are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Matched against [`BackupRecord::profile`](crate::BackupRecord).
    pub profile_name: String,
    pub max_count: CountCap,
    pub max_age: RetentionAge,
}

impl RetentionPolicy {
    pub fn new(profile_name: impl Into<String>, max_count: CountCap, max_age: RetentionAge) -> Self {
        Self {
            profile_name: profile_name.into(),
            max_count,
            max_age,
        }
    }

    /// `count` backups tagged `daily`, none older than `count` days.
    pub fn daily(count: u32) -> Self {
        Self::new("daily", CountCap::Limit(count as usize), RetentionAge::days(count))
    }

    /// `count` backups tagged `weekly`, none older than `count` weeks.
    pub fn weekly(count: u32) -> Self {
        Self::new(
            "weekly",
            CountCap::Limit(count as usize),
            RetentionAge::days(count.saturating_mul(7)),
        )
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.profile_name.trim().is_empty() {
            return Err(DomainError::InvalidPolicy(
                "profile name cannot be empty".to_string(),
            ));
        }
        if self.max_count.is_unlimited() && self.max_age.is_unbounded() {
            return Err(DomainError::InvalidPolicy(format!(
                "profile '{}' has neither a count cap nor a maximum age",
                self.profile_name
            )));
        }
        Ok(())
    }
}

/// Where the deletion executor finds the backup data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTarget {
    pub blueprint: String,
    pub location_profile: String,
    pub namespace: String,
}

/// One independently evaluated unit: a policy plus its deletion target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionProfile {
    pub policy: RetentionPolicy,
    pub target: DeletionTarget,
}

impl RetentionProfile {
    pub fn name(&self) -> &str {
        &self.policy.profile_name
    }
}
