use dnsq_domain::{DomainError, InvariantViolation};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Publishes one result to any number of receivers.
///
/// Receivers that subscribe before or after [`distribute`](Self::distribute)
/// all get the value, each as its own clone. The distributor serves receivers
/// until it is dropped (or [`close`](Self::close)d); a receiver still waiting
/// at that point gets [`DomainError::DistributorClosed`]. Receivers that
/// already hold a [`DistributionReceiver`] keep seeing a published value
/// after the distributor is gone.
#[derive(Debug)]
pub struct Distributor<T> {
    sender: watch::Sender<Option<T>>,
    distributed: AtomicBool,
}

impl<T: Clone> Distributor<T> {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            distributed: AtomicBool::new(false),
        }
    }

    /// Publishes `value`. Only the first call succeeds.
    pub fn distribute(&self, value: T) -> Result<(), InvariantViolation> {
        if self.distributed.swap(true, Ordering::AcqRel) {
            return Err(InvariantViolation::AlreadyDistributed);
        }
        self.sender.send_replace(Some(value));
        Ok(())
    }

    /// Waits for the published value and returns a copy of it.
    pub async fn receive(&self) -> Result<T, DomainError> {
        self.subscribe().receive().await
    }

    pub fn subscribe(&self) -> DistributionReceiver<T> {
        DistributionReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn is_distributed(&self) -> bool {
        self.distributed.load(Ordering::Acquire)
    }

    /// Handles currently subscribed.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stops serving receivers.
    pub fn close(self) {}
}

impl<T: Clone> Default for Distributor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`Distributor`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DistributionReceiver<T> {
    receiver: watch::Receiver<Option<T>>,
}

impl<T: Clone> DistributionReceiver<T> {
    /// Waits for the published value and returns a copy of it.
    ///
    /// Has no timeout of its own; race it against a context to bound the wait.
    pub async fn receive(&self) -> Result<T, DomainError> {
        let mut receiver = self.receiver.clone();
        let published = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| DomainError::DistributorClosed)?;
        let value: Option<T> = (*published).clone();
        value.ok_or(DomainError::DistributorClosed)
    }

    /// Copy of the value when already published.
    pub fn try_receive(&self) -> Option<T> {
        (*self.receiver.borrow()).clone()
    }
}
