pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod postcode;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{CrawlConfig, RecordTemplate};
pub use crawlers::{Fetch, HttpFetcher, Pipeline, RunStats, StaticFetcher};
pub use postcode::{PostcodeCache, PostcodeGeo, PostcodeResolver, PostcodeService, PostcodesIo};
pub use results::{Field, ListingRecord, Region};
pub use utils::NOT_AVAILABLE;
