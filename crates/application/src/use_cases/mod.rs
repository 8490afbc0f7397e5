pub mod resolve_host;

pub use resolve_host::{answer_addresses, HostResolution, ResolveHostUseCase};
