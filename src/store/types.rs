//! Core record types for the Sawdesk record store
//!
//! This module defines the entities the reporting engine reads:
//! - `Client`, `BladeType`, `Blade`: the shop's inventory of customer blades
//! - `SharpeningRecord`: immutable history of sharpening jobs
//! - `Operator`: shop staff accounts
//! - `BladeDetail` / `RecordDetail`: joined read views
//! - `BladeFilter` / `RecordFilter`: filter builders for store queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which part of the blade was serviced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharpenKind {
    /// Tooth edge only
    Edge,
    /// Tooth face only
    Face,
    /// Full sharpening (edge and face)
    Full,
}

impl SharpenKind {
    /// Get all kinds for iteration
    pub fn all() -> &'static [SharpenKind] {
        &[SharpenKind::Edge, SharpenKind::Face, SharpenKind::Full]
    }

    /// Stored/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SharpenKind::Edge => "EDGE",
            SharpenKind::Face => "FACE",
            SharpenKind::Full => "FULL",
        }
    }
}

impl std::fmt::Display for SharpenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharpenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EDGE" => Ok(SharpenKind::Edge),
            "FACE" => Ok(SharpenKind::Face),
            "FULL" => Ok(SharpenKind::Full),
            _ => Err(format!(
                "Invalid sharpen kind: {}. Use EDGE, FACE or FULL",
                s
            )),
        }
    }
}

/// Operator account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Shop manager, may view global statistics
    Manager,
    /// Bench operator
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "MANAGER",
            Role::Operator => "OPERATOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MANAGER" => Ok(Role::Manager),
            "OPERATOR" => Ok(Role::Operator),
            _ => Err(format!("Invalid role: {}. Use MANAGER or OPERATOR", s)),
        }
    }
}

/// A customer of the shop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Client {
    /// Create a client with only a name (id assigned by the store)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            phone: None,
            address: None,
        }
    }

    /// Builder method: set phone
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Builder method: set address
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Catalog entry describing a kind of saw blade
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BladeType {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl BladeType {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            code: code.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Builder method: set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// A physical blade owned by one client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blade {
    pub id: i64,
    /// Unique shop code stamped on the blade
    pub code: String,
    pub client_id: i64,
    pub blade_type_id: i64,
    /// Advanced whenever a sharpening record is stored for this blade
    #[serde(default)]
    pub last_sharpened_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Blade {
    /// Create an active, never-sharpened blade
    pub fn new(code: impl Into<String>, client_id: i64, blade_type_id: i64) -> Self {
        Self {
            id: 0,
            code: code.into(),
            client_id,
            blade_type_id,
            last_sharpened_at: None,
            active: true,
        }
    }

    /// Builder method: set active flag
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// One sharpening job performed on a blade
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharpeningRecord {
    pub id: i64,
    pub blade_id: i64,
    pub kind: SharpenKind,
    #[serde(default)]
    pub notes: Option<String>,
    pub operator_id: i64,
    pub performed_at: DateTime<Utc>,
}

/// Input for storing a new sharpening record
#[derive(Debug, Clone)]
pub struct NewSharpening {
    pub blade_id: i64,
    pub kind: SharpenKind,
    pub notes: Option<String>,
    pub operator_id: i64,
    pub performed_at: DateTime<Utc>,
}

impl NewSharpening {
    /// Create a sharpening performed now
    pub fn new(blade_id: i64, kind: SharpenKind, operator_id: i64) -> Self {
        Self {
            blade_id,
            kind,
            notes: None,
            operator_id,
            performed_at: Utc::now(),
        }
    }

    /// Builder method: set performed_at
    pub fn at(mut self, performed_at: DateTime<Utc>) -> Self {
        self.performed_at = performed_at;
        self
    }

    /// Builder method: set notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A shop staff account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operator {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub active: bool,
}

impl Operator {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            id: 0,
            name: name.into(),
            role,
            active: true,
        }
    }
}

/// A blade joined with its type and owning client
#[derive(Debug, Clone, PartialEq)]
pub struct BladeDetail {
    pub blade: Blade,
    pub blade_type: BladeType,
    pub client: Client,
}

/// A sharpening record joined with blade, client and operator names
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDetail {
    pub record: SharpeningRecord,
    pub blade_code: String,
    pub client_id: i64,
    pub client_name: String,
    pub operator_name: String,
}

/// Sort order for blade listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BladeOrder {
    /// Alphabetical by code
    #[default]
    Code,
    /// Oldest sharpening first, never-sharpened blades before all others
    LastSharpenedAsc,
}

/// Filter for blade queries
#[derive(Debug, Clone, Default)]
pub struct BladeFilter {
    pub client_id: Option<i64>,
    pub active_only: bool,
    /// Case-insensitive substring of the blade code
    pub code_contains: Option<String>,
    /// last_sharpened_at >= bound (never-sharpened blades excluded)
    pub sharpened_since: Option<DateTime<Utc>>,
    /// last_sharpened_at <= bound (never-sharpened blades excluded)
    pub sharpened_until: Option<DateTime<Utc>>,
    /// last_sharpened_at IS NULL OR last_sharpened_at < cutoff
    pub stale_before: Option<DateTime<Utc>>,
    pub order: BladeOrder,
}

impl BladeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client_id: i64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn code_contains(mut self, fragment: impl Into<String>) -> Self {
        self.code_contains = Some(fragment.into());
        self
    }

    pub fn sharpened_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.sharpened_since = since;
        self
    }

    pub fn sharpened_until(mut self, until: Option<DateTime<Utc>>) -> Self {
        self.sharpened_until = until;
        self
    }

    pub fn stale_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.stale_before = Some(cutoff);
        self
    }

    pub fn order(mut self, order: BladeOrder) -> Self {
        self.order = order;
        self
    }
}

/// Filter for sharpening record queries
///
/// Results are always ordered by `performed_at` descending.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub blade_id: Option<i64>,
    pub client_id: Option<i64>,
    /// performed_at >= since (inclusive)
    pub since: Option<DateTime<Utc>>,
    /// performed_at <= until (inclusive)
    pub until: Option<DateTime<Utc>>,
    pub kind: Option<SharpenKind>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blade(mut self, blade_id: i64) -> Self {
        self.blade_id = Some(blade_id);
        self
    }

    pub fn client(mut self, client_id: i64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Set both bounds of a closed window
    pub fn between(self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since(since).until(until)
    }

    pub fn kind(mut self, kind: SharpenKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Lower bound that may be absent (search parameters)
    pub fn performed_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self
    }

    pub fn performed_until(mut self, until: Option<DateTime<Utc>>) -> Self {
        self.until = until;
        self
    }

    pub fn of_kind(mut self, kind: Option<SharpenKind>) -> Self {
        self.kind = kind;
        self
    }
}
