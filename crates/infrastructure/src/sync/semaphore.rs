use dnsq_domain::{Context, DomainError, InvariantViolation};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counting semaphore whose procurement can be abandoned through a [`Context`].
///
/// Each successful [`procure`](Self::procure) must be followed by exactly one
/// [`vacate`](Self::vacate). Vacating more often than procuring poisons the
/// semaphore: every later call fails with [`InvariantViolation::Poisoned`].
/// Waiters are not served in any particular order.
#[derive(Debug)]
pub struct Semaphore {
    permits: tokio::sync::Semaphore,
    capacity: u16,
    held: AtomicUsize,
    poisoned: AtomicBool,
}

impl Semaphore {
    pub fn new(capacity: u16) -> Self {
        Self {
            permits: tokio::sync::Semaphore::new(capacity as usize),
            capacity,
            held: AtomicUsize::new(0),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Waits for one unit of capacity.
    ///
    /// Returns [`DomainError::Cancelled`] without consuming capacity when `ctx`
    /// finishes first, including when it is already finished on entry.
    pub async fn procure(&self, ctx: &Context) -> Result<(), DomainError> {
        if self.is_poisoned() {
            return Err(InvariantViolation::Poisoned.into());
        }
        if ctx.is_done() {
            return Err(DomainError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = ctx.done() => Err(DomainError::Cancelled),
            permit = self.permits.acquire() => match permit {
                Ok(permit) => {
                    permit.forget();
                    self.held.fetch_add(1, Ordering::AcqRel);
                    Ok(())
                }
                // Closed only by poisoning.
                Err(_) => Err(InvariantViolation::Poisoned.into()),
            },
        }
    }

    /// Releases one unit of capacity.
    pub fn vacate(&self) -> Result<(), InvariantViolation> {
        if self.is_poisoned() {
            return Err(InvariantViolation::Poisoned);
        }
        if self
            .held
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |held| {
                held.checked_sub(1)
            })
            .is_err()
        {
            self.poison();
            return Err(InvariantViolation::VacatedUnprocured);
        }
        self.permits.add_permits(1);
        Ok(())
    }

    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Units currently procured and not yet vacated.
    pub fn held(&self) -> usize {
        self.held.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    fn poison(&self) {
        self.poisoned.store(true, Ordering::Release);
        self.permits.close();
    }
}
