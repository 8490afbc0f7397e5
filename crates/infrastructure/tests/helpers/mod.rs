pub mod counting_querier;
pub mod dns_server_mock;

#[allow(unused_imports)]
pub use counting_querier::CountingQuerier;
#[allow(unused_imports)]
pub use dns_server_mock::{build_mock_response, MockBehavior, MockDnsServer, MOCK_ANSWER};
