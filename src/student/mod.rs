//! Student records and the client that fetches them from the upstream API.

pub mod fetcher;
pub mod models;

pub use fetcher::{FetchError, StudentFetcher, StudentSource, TransportFailure};
pub use models::StudentRecord;
