//! Global snooze gate.
//!
//! A single persisted deadline that every nag timer consults before acting.
//! While `now < snooze_until` no timer may start an attempt; instead it
//! reschedules itself for exactly the moment the snooze ends.
//!
//! Reads fail open: an unreadable or corrupt deadline counts as "not
//! snoozing", so a broken store can never silently disable the prompts.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::clock::{offset, until};
use crate::error::StorageError;
use crate::storage::{keys, KvStore};

/// Shared handle to the snooze deadline. Clones observe the same state.
#[derive(Clone)]
pub struct SnoozeGate {
    store: Arc<dyn KvStore>,
    // Serializes read-then-write sequences between timers.
    guard: Arc<Mutex<()>>,
}

impl std::fmt::Debug for SnoozeGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnoozeGate").finish_non_exhaustive()
    }
}

impl SnoozeGate {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Current deadline, if one was ever recorded and can be read.
    pub fn snooze_until(&self) -> Option<DateTime<Utc>> {
        let _lock = self.guard.lock().ok();
        self.read()
    }

    pub fn is_snoozing(&self, now: DateTime<Utc>) -> bool {
        self.snooze_until().is_some_and(|until| now < until)
    }

    /// Time left until the snooze ends, or `None` when not snoozing.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.snooze_until()
            .filter(|until| now < *until)
            .map(|deadline| until(now, deadline))
    }

    /// Suppress nagging until `now + duration`, saturating at the latest
    /// representable instant. Returns the new deadline.
    pub fn snooze_for(
        &self,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StorageError> {
        let deadline = offset(now, duration);
        let _lock = self.guard.lock()?;
        self.store
            .set(keys::SNOOZE_UNTIL, &deadline.timestamp_millis().to_string())?;
        debug!(until = %deadline, "snooze gate set");
        Ok(deadline)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        let _lock = self.guard.lock()?;
        self.store.delete(keys::SNOOZE_UNTIL)
    }

    fn read(&self) -> Option<DateTime<Utc>> {
        let raw = match self.store.get(keys::SNOOZE_UNTIL) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "snooze deadline unreadable, treating as not snoozing");
                return None;
            }
        };
        match raw.trim().parse::<i64>() {
            Ok(ms) => Utc.timestamp_millis_opt(ms).single(),
            Err(_) => {
                warn!(value = %raw, "corrupt snooze deadline, treating as not snoozing");
                None
            }
        }
    }
}
