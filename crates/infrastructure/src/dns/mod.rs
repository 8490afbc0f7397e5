pub mod address;
pub mod client;
pub mod client_pool;
pub mod coalescing;
pub mod forwarding;
pub mod querier;
pub mod transport;

pub use address::{construct_address, construct_hostport, is_ipv4, is_ipv6};
pub use client::{DnsClient, DEFAULT_EXCHANGE_TIMEOUT};
pub use client_pool::{ClientPool, ClientPoolBuilder};
pub use coalescing::CoalescingQuerier;
pub use querier::NetworkQuerier;
