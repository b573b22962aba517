pub mod fetch;
pub mod pipeline;

pub use fetch::{Fetch, HttpFetcher, StaticFetcher};
pub use pipeline::{Pipeline, RunStats};
