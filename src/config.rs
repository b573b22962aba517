use crate::error::ConfigError;
use crate::results::{Field, ListingRecord};
use crate::utils::NOT_AVAILABLE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration for a crawl of the developer site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Location index page the crawl starts from
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Base that relative hrefs are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for page requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Geocoding service settings
    #[serde(default)]
    pub postcode: PostcodeConfig,

    /// Keyword lists driving proximity, parking and room counting
    #[serde(default)]
    pub keywords: KeywordConfig,

    /// Accordion identifiers of the floor-plan blocks
    #[serde(default)]
    pub floors: FloorConfig,

    /// Default values every listing record starts from
    #[serde(default)]
    pub template: RecordTemplate,
}

/// Configuration for the postcode lookup service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostcodeConfig {
    /// Endpoint the path-escaped postcode is appended to
    #[serde(default = "default_postcode_api_base")]
    pub api_base: String,

    /// Timeout for a single lookup, in seconds
    #[serde(default = "default_postcode_timeout_secs")]
    pub timeout_secs: u64,
}

/// Keyword configuration for the text-matching extractors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Regex (matched case-insensitively) selecting proximity features
    #[serde(default = "default_proximity_pattern")]
    pub proximity_pattern: String,

    /// Substrings marking a feature as a parking feature
    #[serde(default = "default_parking_keywords")]
    pub parking: Vec<String>,

    /// Substrings of a room name counted as a living room
    #[serde(default = "default_couch_keywords")]
    pub couch: Vec<String>,

    /// Substrings of a room name counted as a bathroom
    #[serde(default = "default_bathroom_keywords")]
    pub bathroom: Vec<String>,
}

/// Identifiers of the floor-plan accordion items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorConfig {
    #[serde(default = "default_ground_floor_id")]
    pub ground_floor_id: String,

    #[serde(default = "default_first_floor_id")]
    pub first_floor_id: String,
}

/// Field defaults a listing record is seeded from.
///
/// Fields not named here default to `NOT_AVAILABLE`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordTemplate {
    pub defaults: BTreeMap<Field, String>,
}

impl RecordTemplate {
    /// Builds a fresh record with every field present
    pub fn seed(&self) -> ListingRecord {
        let mut record = ListingRecord::new();
        for field in Field::ALL {
            let value = self
                .defaults
                .get(&field)
                .map(String::as_str)
                .unwrap_or(NOT_AVAILABLE);
            record.set(field, value);
        }
        record
    }

    /// Sets a default value for one field
    pub fn with_default(mut self, field: Field, value: impl Into<String>) -> Self {
        self.defaults.insert(field, value.into());
        self
    }
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            postcode: PostcodeConfig::default(),
            keywords: KeywordConfig::default(),
            floors: FloorConfig::default(),
            template: RecordTemplate::default(),
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Parsed site base URL
    pub fn site_base(&self) -> Result<Url, ConfigError> {
        parse_url(&self.base_url)
    }

    /// Parsed start URL
    pub fn start(&self) -> Result<Url, ConfigError> {
        parse_url(&self.start_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::new(&default_start_url())
    }
}

impl Default for PostcodeConfig {
    fn default() -> Self {
        Self {
            api_base: default_postcode_api_base(),
            timeout_secs: default_postcode_timeout_secs(),
        }
    }
}

impl PostcodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            proximity_pattern: default_proximity_pattern(),
            parking: default_parking_keywords(),
            couch: default_couch_keywords(),
            bathroom: default_bathroom_keywords(),
        }
    }
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            ground_floor_id: default_ground_floor_id(),
            first_floor_id: default_first_floor_id(),
        }
    }
}

fn parse_url(url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|source| ConfigError::Url {
        url: url.to_string(),
        source,
    })
}

fn default_start_url() -> String {
    "https://www.persimmonhomes.com/new-homes".to_string()
}

fn default_base_url() -> String {
    "https://www.persimmonhomes.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_postcode_api_base() -> String {
    "https://api.postcodes.io/postcodes/".to_string()
}

fn default_postcode_timeout_secs() -> u64 {
    5
}

fn default_proximity_pattern() -> String {
    r"\b(schools?|nursery|college|university|station|railway|bus|shops?|supermarket|town centre|city centre|park|hospital|doctors?|motorway|m\d+|a\d+|miles?|minutes?)\b"
        .to_string()
}

fn default_parking_keywords() -> Vec<String> {
    ["parking", "garage", "carport", "driveway"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_couch_keywords() -> Vec<String> {
    ["living", "lounge", "family", "sitting", "snug"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_bathroom_keywords() -> Vec<String> {
    ["bathroom", "en-suite", "ensuite", "shower"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ground_floor_id() -> String {
    "ground-floor".to_string()
}

fn default_first_floor_id() -> String {
    "first-floor".to_string()
}
