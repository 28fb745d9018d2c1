use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Pending verification for one email address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerificationRecord {
    pub code: u32,
    pub issued_at: SystemTime,
    pub attempts: u32,
}

impl VerificationRecord {
    #[must_use]
    pub const fn new(code: u32, issued_at: SystemTime) -> Self {
        Self {
            code,
            issued_at,
            attempts: 0,
        }
    }

    /// Expired once strictly more than `ttl` has elapsed since issuance.
    /// A clock that moved backwards never expires a record.
    #[must_use]
    pub fn is_expired(&self, now: SystemTime, ttl: Duration) -> bool {
        now.duration_since(self.issued_at)
            .is_ok_and(|elapsed| elapsed > ttl)
    }
}

type Slot = Arc<AsyncMutex<Option<VerificationRecord>>>;

/// In-memory map from email address to its pending record.
///
/// Each address has its own async lock so a whole read-check-update (including
/// the mail send that follows a match) runs as one critical section, while
/// different addresses never contend. The index mutex is only held for map
/// bookkeeping and never across an `.await`.
#[derive(Debug, Default)]
pub struct OtpStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl OtpStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to the record of `email`, waiting for any
    /// other holder to finish.
    pub async fn lock(&self, email: &str) -> RecordGuard {
        let slot = self.slot(email);
        RecordGuard {
            record: slot.lock_owned().await,
        }
    }

    pub async fn get(&self, email: &str) -> Option<VerificationRecord> {
        let slot = self.existing_slot(email)?;
        let record = *slot.lock().await;
        record
    }

    /// Insert or replace the record of `email`.
    pub async fn set(&self, email: &str, record: VerificationRecord) {
        self.lock(email).await.set(record);
    }

    /// Remove the record of `email`. Deleting a missing record is a no-op.
    pub async fn delete(&self, email: &str) {
        if let Some(slot) = self.existing_slot(email) {
            slot.lock().await.take();
        }
    }

    /// Number of addresses holding a record. Slots busy in a critical section
    /// are counted as pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| slot.try_lock().map_or(true, |record| record.is_some()))
            .count()
    }

    fn existing_slot(&self, email: &str) -> Option<Slot> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(email).map(Arc::clone)
    }

    fn slot(&self, email: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(email) {
            return Arc::clone(slot);
        }

        // Drop slots nobody references that no longer hold a record.
        slots.retain(|_, slot| {
            Arc::strong_count(slot) > 1 || slot.try_lock().is_ok_and(|record| record.is_some())
        });

        let slot = Arc::new(AsyncMutex::new(None));
        slots.insert(email.to_owned(), Arc::clone(&slot));
        slot
    }
}

/// Exclusive handle on one address's record, released on drop.
#[derive(Debug)]
pub struct RecordGuard {
    record: OwnedMutexGuard<Option<VerificationRecord>>,
}

impl RecordGuard {
    #[must_use]
    pub fn get(&self) -> Option<VerificationRecord> {
        *self.record
    }

    pub fn set(&mut self, record: VerificationRecord) {
        *self.record = Some(record);
    }

    pub fn delete(&mut self) {
        self.record.take();
    }
}
