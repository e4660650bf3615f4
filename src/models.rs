// src/models.rs
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Days at or below which a paid subscription counts as expiring.
pub const EXPIRING_THRESHOLD_DAYS: i64 = 7;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientStatus {
    Active,
    Expiring,
    Expired,
}

impl ClientStatus {
    /// The only way a status is ever produced. Depends on the day count alone.
    pub fn from_days(days: i64) -> Self {
        if days <= 0 {
            ClientStatus::Expired
        } else if days <= EXPIRING_THRESHOLD_DAYS {
            ClientStatus::Expiring
        } else {
            ClientStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Expiring => "expiring",
            ClientStatus::Expired => "expired",
        }
    }

    /// Capitalised form used for list labels, e.g. "Expiring".
    pub fn label(&self) -> &'static str {
        match self {
            ClientStatus::Active => "Active",
            ClientStatus::Expiring => "Expiring",
            ClientStatus::Expired => "Expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(ClientStatus::Active),
            "expiring" => Some(ClientStatus::Expiring),
            "expired" => Some(ClientStatus::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and end date recomputed together from a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedSubscription {
    pub status: ClientStatus,
    pub end_date: DateTime<Utc>,
}

pub fn derive_subscription(days: i64, now: DateTime<Utc>) -> DerivedSubscription {
    DerivedSubscription {
        status: ClientStatus::from_days(days),
        end_date: days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(Duration::try_seconds)
            .and_then(|offset| now.checked_add_signed(offset))
            .unwrap_or(if days > 0 { DateTime::<Utc>::MAX_UTC } else { DateTime::<Utc>::MIN_UTC }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subscription_days: i64,
    pub subscription_end_date: DateTime<Utc>,
    pub status: ClientStatus,
    pub last_update: DateTime<Utc>,
    pub notes: String,
}

impl Client {
    /// Builds a client whose derived fields are consistent with `subscription_days`.
    pub fn new(id: String, fields: NewClient, now: DateTime<Utc>) -> Self {
        let derived = derive_subscription(fields.subscription_days, now);
        Self {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            subscription_days: fields.subscription_days,
            subscription_end_date: derived.end_date,
            status: derived.status,
            last_update: now,
            notes: fields.notes,
        }
    }

    /// Shallow merge of `patch`; `last_update` always moves to `now`.
    pub fn apply_patch(&mut self, patch: ClientPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(days) = patch.subscription_days {
            let derived = derive_subscription(days, now);
            self.subscription_days = days;
            self.status = derived.status;
            self.subscription_end_date = derived.end_date;
        }
        self.last_update = now;
    }

    /// Initials for the avatar badge, e.g. "Jane Doe" -> "JD".
    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect()
}

/// Fields accepted by a partial update. Derived fields are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subscription_days: Option<i64>,
    pub notes: Option<String>,
}

impl ClientPatch {
    pub fn days(days: i64) -> Self {
        Self { subscription_days: Some(days), ..Default::default() }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self { notes: Some(notes.into()), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subscription_days: i64,
    pub notes: String,
}
