mod querier;

pub use querier::{Querier, QueryResponse};
