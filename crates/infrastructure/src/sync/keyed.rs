use super::semaphore::Semaphore;
use dnsq_domain::{Context, DomainError, InvariantViolation};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct SemaphoreEntry {
    semaphore: Arc<Semaphore>,
    /// Holders plus waiters registered under this key.
    active: u16,
}

/// String-keyed semaphores of a fixed capacity, created on first use and
/// removed as soon as no procurement for the key is pending or held.
///
/// Bookkeeping happens in one short critical section that is never held
/// across the wait for per-key capacity. The bookkeeping lock itself is a
/// blocking mutex and is not cancellable: the context is checked once before
/// registering, and only the wait for capacity observes it afterwards. A
/// procurement that is cancelled, or whose future is dropped while waiting,
/// unregisters itself synchronously before returning, so an idle key never
/// keeps an entry.
///
/// Contract breaches (vacating a key that holds no unit) poison the registry;
/// from then on every call fails with [`InvariantViolation::Poisoned`].
pub struct KeyedSemaphoreRegistry {
    entries: Mutex<HashMap<String, SemaphoreEntry>>,
    capacity: u16,
    poisoned: AtomicBool,
}

impl KeyedSemaphoreRegistry {
    pub fn new(capacity: u16) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
            poisoned: AtomicBool::new(false),
        }
    }

    /// Procures one unit of `key`'s capacity.
    ///
    /// Exactly one [`vacate`](Self::vacate) of the same key must follow a
    /// successful call. Fails with [`DomainError::CapacityExhausted`] when
    /// 65535 procurements are already pending for the key.
    pub async fn procure(&self, ctx: &Context, key: &str) -> Result<(), DomainError> {
        let semaphore = self.register(ctx, key)?;
        let registration = Registration {
            registry: self,
            key,
            armed: true,
        };
        semaphore.procure(ctx).await?;
        registration.complete();
        Ok(())
    }

    /// Like [`procure`](Self::procure), returning a guard that vacates the
    /// key when dropped.
    pub async fn procure_permit(
        &self,
        ctx: &Context,
        key: &str,
    ) -> Result<KeyedPermit<'_>, DomainError> {
        self.procure(ctx, key).await?;
        Ok(KeyedPermit {
            registry: self,
            key: key.to_string(),
            released: false,
        })
    }

    /// Releases one unit of `key`'s capacity.
    pub fn vacate(&self, key: &str) -> Result<(), InvariantViolation> {
        let mut entries = self.entries()?;
        let Some(entry) = entries.get_mut(key) else {
            return Err(self.poison(InvariantViolation::UnknownKey(key.to_string())));
        };
        if entry.active == 0 {
            return Err(self.poison(InvariantViolation::ReleasedUnprocured(key.to_string())));
        }
        if let Err(violation) = entry.semaphore.vacate() {
            return Err(self.poison(violation));
        }
        entry.active -= 1;
        if entry.active == 0 {
            entries.remove(key);
        }
        Ok(())
    }

    fn register(&self, ctx: &Context, key: &str) -> Result<Arc<Semaphore>, DomainError> {
        if ctx.is_done() {
            return Err(DomainError::Cancelled);
        }
        let mut entries = self.entries()?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| SemaphoreEntry {
                semaphore: Arc::new(Semaphore::new(self.capacity)),
                active: 0,
            });
        if entry.active == u16::MAX {
            return Err(DomainError::CapacityExhausted {
                key: key.to_string(),
            });
        }
        entry.active += 1;
        Ok(Arc::clone(&entry.semaphore))
    }

    fn abandon(&self, key: &str) -> Result<(), InvariantViolation> {
        let mut entries = self.entries()?;
        let Some(entry) = entries.get_mut(key) else {
            return Err(self.poison(InvariantViolation::UnknownKey(key.to_string())));
        };
        if entry.active == 0 {
            return Err(self.poison(InvariantViolation::AbandonedUnprocured(key.to_string())));
        }
        entry.active -= 1;
        if entry.active == 0 {
            entries.remove(key);
        }
        Ok(())
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, SemaphoreEntry>>, InvariantViolation> {
        if self.is_poisoned() {
            return Err(InvariantViolation::Poisoned);
        }
        self.entries
            .lock()
            .map_err(|_| self.poison(InvariantViolation::Poisoned))
    }

    fn poison(&self, violation: InvariantViolation) -> InvariantViolation {
        self.poisoned.store(true, Ordering::Release);
        violation
    }

    fn snapshot(&self) -> MutexGuard<'_, HashMap<String, SemaphoreEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.snapshot().contains_key(key)
    }

    /// Pending plus held procurements for `key`; `None` when the key has no entry.
    pub fn active_count(&self, key: &str) -> Option<u16> {
        self.snapshot().get(key).map(|entry| entry.active)
    }

    /// Units of `key` currently held.
    pub fn held_count(&self, key: &str) -> usize {
        self.snapshot()
            .get(key)
            .map_or(0, |entry| entry.semaphore.held())
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl std::fmt::Debug for KeyedSemaphoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedSemaphoreRegistry")
            .field("capacity", &self.capacity)
            .field("keys", &self.len())
            .field("poisoned", &self.is_poisoned())
            .finish()
    }
}

/// Unwinds a registration whose wait did not succeed.
struct Registration<'a> {
    registry: &'a KeyedSemaphoreRegistry,
    key: &'a str,
    armed: bool,
}

impl Registration<'_> {
    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if self.armed {
            // A failed abandon has already poisoned the registry.
            let _ = self.registry.abandon(self.key);
        }
    }
}

/// One procured unit of a key, vacated on drop.
#[must_use = "dropping the permit vacates the key immediately"]
pub struct KeyedPermit<'a> {
    registry: &'a KeyedSemaphoreRegistry,
    key: String,
    released: bool,
}

impl KeyedPermit<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Vacates now, reporting a contract breach instead of dropping it.
    pub fn release(mut self) -> Result<(), InvariantViolation> {
        self.released = true;
        self.registry.vacate(&self.key)
    }
}

impl Drop for KeyedPermit<'_> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.registry.vacate(&self.key);
        }
    }
}
