use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default number of simultaneous network operations.
pub const DEFAULT_BUDGET: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

/// Counting admission control for network operations.
///
/// Listing fetches and downloads each hold one [`GatePermit`] while their
/// request is in flight. Waiters are admitted in FIFO order, so no branch of
/// the traversal starves. Clones share the same budget.
#[derive(Clone, Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    budget: NonZeroUsize,
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    active: AtomicUsize,
    peak: AtomicUsize,
    admitted: AtomicUsize,
}

impl ConcurrencyGate {
    pub fn new(budget: NonZeroUsize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(budget.get())),
            budget,
            counters: Arc::default(),
        }
    }

    /// Waits until fewer than `budget` permits are outstanding.
    pub async fn acquire(&self) -> GatePermit {
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is owned by the gate and never closed.
            Err(_) => unreachable!("concurrency gate semaphore closed"),
        };

        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(active, Ordering::SeqCst);
        self.counters.admitted.fetch_add(1, Ordering::SeqCst);

        GatePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        }
    }

    pub fn budget(&self) -> NonZeroUsize { self.budget }

    /// Operations currently holding a permit.
    pub fn active(&self) -> usize { self.counters.active.load(Ordering::SeqCst) }

    /// Highest number of simultaneously held permits observed so far.
    pub fn peak(&self) -> usize { self.counters.peak.load(Ordering::SeqCst) }

    /// Total permits handed out since creation.
    pub fn admitted(&self) -> usize { self.counters.admitted.load(Ordering::SeqCst) }
}

impl Default for ConcurrencyGate {
    fn default() -> Self { Self::new(DEFAULT_BUDGET) }
}

/// One admitted operation. Dropping it releases the slot.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl GatePermit {
    pub fn release(self) {}
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Decrement before the semaphore permit field is dropped so `active`
        // never exceeds the budget.
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
    }
}
