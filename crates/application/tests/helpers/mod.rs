#![allow(dead_code)]

pub mod mock_querier;

pub use mock_querier::{response_bytes, MockAnswer, MockQuerier};
