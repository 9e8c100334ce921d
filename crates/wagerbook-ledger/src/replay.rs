//! Transaction replay guard.
//!
//! A signed transaction is valid forever, so anyone holding a copy could
//! resubmit it. The guard remembers committed [`TxId`]s and rejects a
//! second submission with [`WagerError::DuplicateTransaction`].
//!
//! Memory is bounded: past `max_size` entries the oldest id is evicted.
//! UUIDv7 ids are time-ordered, so the guard keeps the newest evicted id as
//! a low-water mark and rejects anything at or below it with
//! [`WagerError::TransactionExpired`]. Signers must submit promptly.

use std::collections::{HashSet, VecDeque};

use wagerbook_types::{Result, TxId, WagerError};

/// Default number of committed transaction ids remembered.
pub const DEFAULT_REPLAY_WINDOW: usize = 100_000;

pub struct ReplayGuard {
    seen: HashSet<TxId>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<TxId>,
    max_size: usize,
    /// Newest id evicted so far.
    low_water: Option<TxId>,
}

impl ReplayGuard {
    /// Create a guard remembering up to `max_size` ids (at least one).
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            seen: HashSet::with_capacity(max_size.min(1024)),
            order: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            low_water: None,
        }
    }

    /// Fail if `tx_id` was already committed or is too old to tell.
    ///
    /// # Errors
    /// Returns [`WagerError::DuplicateTransaction`] or
    /// [`WagerError::TransactionExpired`].
    pub fn check(&self, tx_id: &TxId) -> Result<()> {
        if self.low_water.is_some_and(|mark| *tx_id <= mark) {
            return Err(WagerError::TransactionExpired(*tx_id));
        }
        if self.seen.contains(tx_id) {
            return Err(WagerError::DuplicateTransaction(*tx_id));
        }
        Ok(())
    }

    /// Record a committed transaction.
    ///
    /// # Errors
    /// Returns [`WagerError::DuplicateTransaction`] if already recorded.
    pub fn mark_committed(&mut self, tx_id: TxId) -> Result<()> {
        self.check(&tx_id)?;

        if self.seen.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
                self.low_water = self.low_water.max(Some(oldest));
            }
        }

        self.seen.insert(tx_id);
        self.order.push_back(tx_id);
        Ok(())
    }

    /// Ids at or below this mark are rejected as expired.
    #[must_use]
    pub fn low_water(&self) -> Option<TxId> {
        self.low_water
    }

    #[must_use]
    pub fn contains(&self, tx_id: &TxId) -> bool {
        self.seen.contains(tx_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_WINDOW)
    }
}
