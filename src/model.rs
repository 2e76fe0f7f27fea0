//! Value types for tracked players.
//!
//! An [`Identity`] names a player by stable UUID or by display name; a
//! [`TimeRecord`] is the persisted row tracking when that player's timer was
//! created and last checkpointed.

use uuid::Uuid;

/// A player reference, resolved to one canonical key internally.
///
/// Exactly one of the two fields drives each store lookup: the explicit UUID
/// when present, the display name otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    unique_id: Option<Uuid>,
    name: String,
}

impl Identity {
    /// Identity with a stable unique id (authenticated player)
    pub fn by_id(unique_id: Uuid, name: impl Into<String>) -> Self {
        Identity {
            unique_id: Some(unique_id),
            name: name.into(),
        }
    }

    /// Identity known only by display name (offline player)
    pub fn by_name(name: impl Into<String>) -> Self {
        Identity {
            unique_id: None,
            name: name.into(),
        }
    }

    pub fn unique_id(&self) -> Option<Uuid> {
        self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical key for this identity: the explicit UUID when present,
    /// otherwise a name-derived key. The same name always derives the same
    /// key, matching the offline-player identity scheme.
    pub fn derived_key(&self) -> Uuid {
        self.unique_id.unwrap_or_else(|| offline_key(&self.name))
    }
}

/// Namespace-hash a display name into a deterministic UUID
pub fn offline_key(name: &str) -> Uuid {
    Uuid::new_v3(
        &Uuid::NAMESPACE_OID,
        format!("OfflinePlayer:{}", name).as_bytes(),
    )
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One player's accumulated-time row.
///
/// Elapsed active time is computed, not stored: `measure_time - created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRecord {
    unique_id: Uuid,
    name: String,
    measure_time: i64,
    created_at: i64,
}

impl TimeRecord {
    pub fn new(unique_id: Uuid, name: impl Into<String>, measure_time: i64, created_at: i64) -> Self {
        TimeRecord {
            unique_id,
            name: name.into(),
            measure_time,
            created_at,
        }
    }

    pub fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last checkpoint, epoch milliseconds
    pub fn measure_time(&self) -> i64 {
        self.measure_time
    }

    /// Row creation time, epoch milliseconds. Set once, never mutated.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Accumulated active time in milliseconds
    pub fn elapsed_millis(&self) -> i64 {
        self.measure_time - self.created_at
    }

    /// Render the elapsed time as `"1d 2h 3m 4s"`, omitting zero segments
    pub fn formatted(&self) -> String {
        let mut seconds = self.elapsed_millis() / 1000;
        let mut parts = Vec::new();

        if seconds >= 86400 {
            parts.push(format!("{}d", seconds / 86400));
            seconds %= 86400;
        }
        if seconds >= 3600 {
            parts.push(format!("{}h", seconds / 3600));
            seconds %= 3600;
        }
        if seconds >= 60 {
            parts.push(format!("{}m", seconds / 60));
            seconds %= 60;
        }
        if seconds > 0 {
            parts.push(format!("{}s", seconds));
        }

        if parts.is_empty() {
            "0s".to_string()
        } else {
            parts.join(" ")
        }
    }
}
