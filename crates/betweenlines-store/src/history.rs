//! Client-local history of letters this device created.
//!
//! The ledger is a JSON array of [`HistoryEntry`] (newest first) stored under
//! a single key in a [`LocalStorage`]. Entries expire after the retention
//! window. Expired entries are dropped lazily: any read that sees one rewrites
//! the stored ledger without it.
//!
//! History is a convenience, so no operation here returns an error. Failures
//! are logged and the caller carries on.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use betweenlines_shared::constants::HISTORY_STORAGE_KEY;
use betweenlines_shared::HistoryEntry;
use chrono::Utc;
use tracing::{debug, error};

use crate::error::Result;
use crate::local_storage::LocalStorage;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now_millis)))
    }

    pub fn set(&self, now_millis: i64) {
        self.0.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

pub struct HistoryLedger<S: LocalStorage> {
    storage: S,
    clock: Box<dyn Clock>,
}

impl<S: LocalStorage> HistoryLedger<S> {
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }

    pub fn with_clock(storage: S, clock: impl Clock + 'static) -> Self {
        Self {
            storage,
            clock: Box::new(clock),
        }
    }

    /// Record a letter. Saving an id that is already present changes nothing.
    pub fn save(&self, id: &str, link: &str, recipient_name: &str) {
        if let Err(e) = self.try_save(id, link, recipient_name) {
            error!(error = %e, id = %id, "Failed to save letter to history");
        }
    }

    fn try_save(&self, id: &str, link: &str, recipient_name: &str) -> Result<()> {
        let mut history = self.list();

        if history.iter().any(|entry| entry.id == id) {
            debug!(id = %id, "Letter already in history");
            return Ok(());
        }

        let now = self.clock.now_millis();
        history.insert(0, HistoryEntry::new(id, link, recipient_name, now));
        self.persist(&history)
    }

    /// Unexpired entries, newest first.
    pub fn list(&self) -> Vec<HistoryEntry> {
        match self.load_valid() {
            Ok(history) => history,
            Err(e) => {
                error!(error = %e, "Failed to get letter history");
                Vec::new()
            }
        }
    }

    fn load_valid(&self) -> Result<Vec<HistoryEntry>> {
        let Some(stored) = self.storage.get_item(HISTORY_STORAGE_KEY)? else {
            return Ok(Vec::new());
        };

        let history: Vec<HistoryEntry> = serde_json::from_str(&stored)?;
        let total = history.len();

        let now = self.clock.now_millis();
        let valid: Vec<HistoryEntry> = history
            .into_iter()
            .filter(|entry| !entry.is_expired(now))
            .collect();

        if valid.len() != total {
            debug!(removed = total - valid.len(), "Dropping expired history entries");
            if let Err(e) = self.persist(&valid) {
                error!(error = %e, "Failed to compact letter history");
            }
        }

        Ok(valid)
    }

    /// Remove one entry. Unknown ids are ignored.
    pub fn delete(&self, id: &str) {
        let remaining: Vec<HistoryEntry> = self
            .list()
            .into_iter()
            .filter(|entry| entry.id != id)
            .collect();

        if let Err(e) = self.persist(&remaining) {
            error!(error = %e, id = %id, "Failed to delete letter from history");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(HISTORY_STORAGE_KEY) {
            error!(error = %e, "Failed to clear history");
        }
    }

    pub fn count(&self) -> usize {
        self.list().len()
    }

    fn persist(&self, history: &[HistoryEntry]) -> Result<()> {
        let json = serde_json::to_string(history)?;
        self.storage.set_item(HISTORY_STORAGE_KEY, &json)
    }
}
