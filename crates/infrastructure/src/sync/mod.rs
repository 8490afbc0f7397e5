//! Concurrency building blocks for bounding and coalescing queries.
//!
//! - `semaphore`: cancellable counting semaphore
//! - `keyed`: per-key semaphores created on demand and reclaimed when idle
//! - `distributor`: one published result, copied to every receiver

pub mod distributor;
pub mod keyed;
pub mod semaphore;

pub use distributor::{DistributionReceiver, Distributor};
pub use keyed::{KeyedPermit, KeyedSemaphoreRegistry};
pub use semaphore::Semaphore;
