//! Postcode geocoding with a write-once cache.
//!
//! Every distinct normalized postcode reaches the service at most once for
//! the lifetime of a `PostcodeCache`, whether the lookup succeeded or not.

use crate::config::PostcodeConfig;
use crate::error::{ConfigError, LookupError};
use crate::utils::{NOT_AVAILABLE, first_available};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Geographic data resolved for one postcode
#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeGeo {
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub area: String,
    pub subarea: String,
}

impl PostcodeGeo {
    pub fn not_available() -> Self {
        Self {
            city: NOT_AVAILABLE.to_string(),
            latitude: NOT_AVAILABLE.to_string(),
            longitude: NOT_AVAILABLE.to_string(),
            area: NOT_AVAILABLE.to_string(),
            subarea: NOT_AVAILABLE.to_string(),
        }
    }

    fn from_result(result: PostcodeResult) -> Self {
        Self {
            city: first_available([result.admin_district, result.nuts]),
            latitude: first_available([result.latitude.and_then(coordinate)]),
            longitude: first_available([result.longitude.and_then(coordinate)]),
            area: first_available([result.admin_ward]),
            subarea: first_available([result.parish]),
        }
    }
}

/// Renders a coordinate with at least one decimal place; zero counts as
/// missing.
fn coordinate(value: f64) -> Option<String> {
    if value == 0.0 || !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 {
        Some(format!("{value:.1}"))
    } else {
        Some(value.to_string())
    }
}

/// Envelope returned by the postcode service
#[derive(Debug, Deserialize)]
struct PostcodeResponse {
    #[serde(default)]
    result: Option<PostcodeResult>,
}

/// The fields of a postcode result this crate reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostcodeResult {
    #[serde(default)]
    pub admin_district: Option<String>,
    #[serde(default)]
    pub nuts: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub admin_ward: Option<String>,
    #[serde(default)]
    pub parish: Option<String>,
}

/// External geocoding lookup
pub trait PostcodeService {
    fn lookup(&self, postcode: &str) -> Result<PostcodeResult, LookupError>;
}

/// Client for api.postcodes.io
pub struct PostcodesIo {
    client: Client,
    endpoint: Url,
}

impl PostcodesIo {
    pub fn new(config: &PostcodeConfig) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(&config.api_base).map_err(|source| ConfigError::Url {
            url: config.api_base.clone(),
            source,
        })?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { client, endpoint })
    }

    fn lookup_url(&self, postcode: &str) -> Result<Url, LookupError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Endpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .push(postcode);
        Ok(url)
    }
}

impl PostcodeService for PostcodesIo {
    fn lookup(&self, postcode: &str) -> Result<PostcodeResult, LookupError> {
        let url = self.lookup_url(postcode)?;
        let response = self.client.get(url).send()?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let parsed: PostcodeResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Body(e.to_string()))?;
        Ok(parsed.result.unwrap_or_default())
    }
}

/// Normalized postcode -> resolved entry; entries are never replaced
#[derive(Debug, Default)]
pub struct PostcodeCache {
    entries: Mutex<HashMap<String, Arc<PostcodeGeo>>>,
}

impl PostcodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, postcode: &str) -> Option<Arc<PostcodeGeo>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(postcode)
            .cloned()
    }

    /// Stores an entry unless one exists, returning whichever is cached
    pub fn insert(&self, postcode: String, geo: PostcodeGeo) -> Arc<PostcodeGeo> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(postcode).or_insert_with(|| Arc::new(geo)))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves postcodes through a service, memoized in a shared cache
pub struct PostcodeResolver {
    service: Box<dyn PostcodeService>,
    cache: Arc<PostcodeCache>,
}

impl PostcodeResolver {
    pub fn new(service: Box<dyn PostcodeService>, cache: Arc<PostcodeCache>) -> Self {
        Self { service, cache }
    }

    pub fn cache(&self) -> &Arc<PostcodeCache> {
        &self.cache
    }

    pub fn lookup_postcode_data(&self, postcode: &str) -> Arc<PostcodeGeo> {
        let postcode = normalize_postcode(postcode);
        if postcode.is_empty() || postcode == NOT_AVAILABLE {
            return Arc::new(PostcodeGeo::not_available());
        }

        if let Some(cached) = self.cache.get(&postcode) {
            ::log::debug!("Postcode cache hit for {}", postcode);
            return cached;
        }

        ::log::info!("Looking up postcode data for: {}", postcode);
        let geo = match self.service.lookup(&postcode) {
            Ok(result) => PostcodeGeo::from_result(result),
            Err(e) => {
                ::log::warn!("Postcode lookup failed for {}: {}", postcode, e);
                PostcodeGeo::not_available()
            }
        };

        self.cache.insert(postcode, geo)
    }
}

pub fn normalize_postcode(postcode: &str) -> String {
    postcode.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Fake service that counts calls and answers from a fixed result
    struct CountingService {
        calls: Rc<Cell<usize>>,
        answer: Option<PostcodeResult>,
    }

    impl PostcodeService for CountingService {
        fn lookup(&self, _postcode: &str) -> Result<PostcodeResult, LookupError> {
            self.calls.set(self.calls.get() + 1);
            self.answer.clone().ok_or(LookupError::Status(404))
        }
    }

    fn resolver(answer: Option<PostcodeResult>) -> (PostcodeResolver, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let service = CountingService {
            calls: Rc::clone(&calls),
            answer,
        };
        let resolver = PostcodeResolver::new(Box::new(service), Arc::new(PostcodeCache::new()));
        (resolver, calls)
    }

    fn leeds() -> PostcodeResult {
        PostcodeResult {
            admin_district: Some("Leeds".to_string()),
            nuts: Some("Leeds NUTS".to_string()),
            latitude: Some(53.79),
            longitude: Some(-1.54),
            admin_ward: Some("Little London".to_string()),
            parish: None,
        }
    }

    #[test]
    fn test_variants_share_one_lookup() {
        let (resolver, calls) = resolver(Some(leeds()));
        let first = resolver.lookup_postcode_data(" ls2 7ez ");
        let second = resolver.lookup_postcode_data("LS2 7EZ");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(first.city, "Leeds");
        assert_eq!(first.latitude, "53.79");
        assert_eq!(first.longitude, "-1.54");
        assert_eq!(first.area, "Little London");
        assert_eq!(first.subarea, NOT_AVAILABLE);
    }

    #[test]
    fn test_failures_are_cached() {
        let (resolver, calls) = resolver(None);
        let first = resolver.lookup_postcode_data("XX1 1XX");
        let second = resolver.lookup_postcode_data("xx1 1xx");

        assert_eq!(*first, PostcodeGeo::not_available());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn test_empty_and_sentinel_skip_the_service() {
        let (resolver, calls) = resolver(Some(leeds()));
        assert_eq!(*resolver.lookup_postcode_data("   "), PostcodeGeo::not_available());
        assert_eq!(
            *resolver.lookup_postcode_data("not_available"),
            PostcodeGeo::not_available()
        );
        assert_eq!(calls.get(), 0);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_city_falls_back_to_nuts() {
        let result = PostcodeResult {
            admin_district: None,
            ..leeds()
        };
        assert_eq!(PostcodeGeo::from_result(result).city, "Leeds NUTS");

        let result = PostcodeResult {
            admin_district: Some(String::new()),
            nuts: None,
            ..leeds()
        };
        assert_eq!(PostcodeGeo::from_result(result).city, NOT_AVAILABLE);
    }

    #[test]
    fn test_coordinates_keep_a_decimal_place() {
        let result = PostcodeResult {
            latitude: Some(54.0),
            longitude: Some(-1.0),
            ..leeds()
        };
        let geo = PostcodeGeo::from_result(result);
        assert_eq!(geo.latitude, "54.0");
        assert_eq!(geo.longitude, "-1.0");
    }

    #[test]
    fn test_zero_coordinate_is_not_available() {
        let result = PostcodeResult {
            latitude: Some(51.48),
            longitude: Some(0.0),
            ..leeds()
        };
        let geo = PostcodeGeo::from_result(result);
        assert_eq!(geo.latitude, "51.48");
        assert_eq!(geo.longitude, NOT_AVAILABLE);
    }

    #[test]
    fn test_shared_cache_across_resolvers() {
        let cache = Arc::new(PostcodeCache::new());
        let calls = Rc::new(Cell::new(0));
        let make = || {
            PostcodeResolver::new(
                Box::new(CountingService {
                    calls: Rc::clone(&calls),
                    answer: Some(leeds()),
                }),
                Arc::clone(&cache),
            )
        };

        make().lookup_postcode_data("LS2 7EZ");
        make().lookup_postcode_data("ls2 7ez");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_lookup_url_escapes_postcode() {
        let service = PostcodesIo::new(&PostcodeConfig::default()).unwrap();
        let url = service.lookup_url("LS2 7EZ").unwrap();
        assert_eq!(url.as_str(), "https://api.postcodes.io/postcodes/LS2%207EZ");
    }

    #[test]
    fn test_response_envelope_parses() {
        let body = r#"{"status":200,"result":{"postcode":"LS2 7EZ","admin_district":"Leeds","latitude":53.8,"longitude":-1.55,"parish":null}}"#;
        let parsed: PostcodeResponse = serde_json::from_str(body).unwrap();
        let geo = PostcodeGeo::from_result(parsed.result.unwrap());
        assert_eq!(geo.city, "Leeds");
        assert_eq!(geo.latitude, "53.8");
        assert_eq!(geo.subarea, NOT_AVAILABLE);
    }
}
