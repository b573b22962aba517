use crate::utils::{NOT_AVAILABLE, title_case};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Named fields of a listing record, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    Region,
    Outlet,
    SchemesOffers,
    Proximity,
    Url,
    Plot,
    Type,
    Address,
    Postcode,
    Location,
    County,
    City,
    Latitude,
    Longitude,
    Bedroom,
    PriceLatest,
    Availability,
    PriceRange,
    GroundFloorDimensions,
    FirstFloorDimensions,
    ParkingConfiguration,
    LivingRoom,
    Bathroom,
    Features,
}

impl Field {
    pub const ALL: [Field; 24] = [
        Field::Region,
        Field::Outlet,
        Field::SchemesOffers,
        Field::Proximity,
        Field::Url,
        Field::Plot,
        Field::Type,
        Field::Address,
        Field::Postcode,
        Field::Location,
        Field::County,
        Field::City,
        Field::Latitude,
        Field::Longitude,
        Field::Bedroom,
        Field::PriceLatest,
        Field::Availability,
        Field::PriceRange,
        Field::GroundFloorDimensions,
        Field::FirstFloorDimensions,
        Field::ParkingConfiguration,
        Field::LivingRoom,
        Field::Bathroom,
        Field::Features,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Region => "REGION",
            Field::Outlet => "OUTLET",
            Field::SchemesOffers => "SCHEMES_OFFERS",
            Field::Proximity => "PROXIMITY",
            Field::Url => "URL",
            Field::Plot => "PLOT",
            Field::Type => "TYPE",
            Field::Address => "ADDRESS",
            Field::Postcode => "POSTCODE",
            Field::Location => "LOCATION",
            Field::County => "COUNTY",
            Field::City => "CITY",
            Field::Latitude => "LATITUDE",
            Field::Longitude => "LONGITUDE",
            Field::Bedroom => "BEDROOM",
            Field::PriceLatest => "PRICE_LATEST",
            Field::Availability => "AVAILABILITY",
            Field::PriceRange => "PRICE_RANGE",
            Field::GroundFloorDimensions => "GROUND_FLOOR_DIMENSIONS",
            Field::FirstFloorDimensions => "FIRST_FLOOR_DIMENSIONS",
            Field::ParkingConfiguration => "PARKING_CONFIGURATION",
            Field::LivingRoom => "LIVING_ROOM",
            Field::Bathroom => "BATHROOM",
            Field::Features => "FEATURES",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted listing, keyed by field in output order.
///
/// Records come from `RecordTemplate::seed`, so every field is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ListingRecord {
    fields: BTreeMap<Field, String>,
}

impl ListingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Value of a field, or the sentinel if it was never set
    pub fn get(&self, field: Field) -> &str {
        self.fields
            .get(&field)
            .map(String::as_str)
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Area and sub-area labels taken from a location URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub area: String,
    pub sub_area: String,
}

impl Region {
    /// Derives the region from path segments 2 and 3 of a location URL
    /// (`/new-homes/north-west/cheshire` -> "North West", "Cheshire").
    pub fn from_url(url: &Url) -> Self {
        let parts: Vec<&str> = url.path().trim_matches('/').split('/').collect();
        if parts.len() >= 3 {
            Self {
                area: canonical_label(parts[1]),
                sub_area: canonical_label(parts[2]),
            }
        } else {
            Self::not_available()
        }
    }

    pub fn not_available() -> Self {
        Self {
            area: NOT_AVAILABLE.to_string(),
            sub_area: NOT_AVAILABLE.to_string(),
        }
    }
}

fn canonical_label(segment: &str) -> String {
    title_case(&segment.replace('-', " "))
}

/// A location page found on the location index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationLink {
    pub url: String,
    pub region: Region,
}

/// A property (development) page found on a location page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLink {
    pub url: String,
    pub region: String,
}

/// A plot page found in a property's available-homes section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotLink {
    pub url: String,
    pub region: String,
    pub scheme_offer: String,
}
