//! Per-borrower serialization.
//!
//! Every mutation of a borrower's conversation, recommendations, or profile
//! runs under that borrower's async mutex. Different borrowers never contend
//! with each other.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::BorrowerId;

pub struct BorrowerLocks {
    locks: Mutex<HashMap<BorrowerId, Arc<Mutex<()>>>>,
}

impl BorrowerLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the borrower's mutex, creating it on first use. The guard
    /// is owned so it can be held across await points.
    pub async fn acquire(&self, borrower_id: &BorrowerId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(*borrower_id)
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

impl Default for BorrowerLocks {
    fn default() -> Self {
        Self::new()
    }
}
