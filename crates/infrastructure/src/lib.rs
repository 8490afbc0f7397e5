pub mod dns;
pub mod sync;
