//! Plot page extraction.
//!
//! A plot page carries a marketing header (name, house type, address, and an
//! icon list with bedrooms and price), floor-plan accordions with embedded
//! JSON room sizes, a feature list and an icon-title strip. Everything is
//! read relative to the header; a page without one yields no record.

use crate::config::{FloorConfig, RecordTemplate};
use crate::crawlers::fetch::Fetch;
use crate::filter::KeywordFilter;
use crate::parsers::dimensions::dimensions_or_sentinel;
use crate::parsers::static_selector;
use crate::postcode::PostcodeResolver;
use crate::results::{Field, ListingRecord};
use crate::utils::{NOT_AVAILABLE, capitalize_words, join_or_sentinel, stripped_text};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static HEADER: LazyLock<Selector> = LazyLock::new(|| static_selector(".marketing-header"));
static PRIMARY_HEADING: LazyLock<Selector> =
    LazyLock::new(|| static_selector(".marketing-heading--primary"));
static SECONDARY_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    static_selector(".marketing-header__secondary-heading h2.marketing-heading--secondary")
});
static ADDRESS: LazyLock<Selector> =
    LazyLock::new(|| static_selector(".marketing-header__address .address"));
static DETAIL_ITEM: LazyLock<Selector> =
    LazyLock::new(|| static_selector(".marketing-header__details .icon-list__item"));
static ICON_USE: LazyLock<Selector> = LazyLock::new(|| static_selector("use"));
static FEATURE_ITEM: LazyLock<Selector> =
    LazyLock::new(|| static_selector("ul.feature-list li.feature-list__item"));
static ICON_TITLE: LazyLock<Selector> = LazyLock::new(|| static_selector(".l-icons__icon-title"));

static LEADING_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^from\s*").expect("invalid regex: leading from"));

const BEDROOM_ICON: &str = "bedroom-bar";
const PRICE_ICON: &str = "price-bar";
const FOR_SALE: &str = "For Sale";
const COMING_SOON: &str = "Coming Soon";

/// Values handed down from the location and property stages
#[derive(Debug, Clone, Copy)]
pub struct PlotContext<'c> {
    pub region: &'c str,
    pub outlet: &'c str,
    pub scheme_offer: &'c str,
    pub proximity: &'c str,
}

/// Turns plot pages into listing records
#[derive(Clone, Copy)]
pub struct PlotStage<'a> {
    fetcher: &'a dyn Fetch,
    resolver: &'a PostcodeResolver,
    filter: &'a KeywordFilter,
    floors: &'a FloorConfig,
    template: &'a RecordTemplate,
}

impl<'a> PlotStage<'a> {
    pub fn new(
        fetcher: &'a dyn Fetch,
        resolver: &'a PostcodeResolver,
        filter: &'a KeywordFilter,
        floors: &'a FloorConfig,
        template: &'a RecordTemplate,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            filter,
            floors,
            template,
        }
    }

    /// Fetches a plot page and builds its record.
    ///
    /// Returns `None` when the page cannot be fetched or has no marketing
    /// header.
    pub fn parse_plot_data(
        &self,
        plot_url: &str,
        region: &str,
        outlet: &str,
        scheme_offer: &str,
        proximity: &str,
    ) -> Option<ListingRecord> {
        let document = self.fetcher.fetch_document(plot_url)?;
        let context = PlotContext {
            region,
            outlet,
            scheme_offer,
            proximity,
        };

        let record = self.build_record(&document, plot_url, context);
        if record.is_none() {
            ::log::warn!("No marketing header on {}, skipping plot", plot_url);
        }
        record
    }

    /// Builds a record from an already parsed plot page
    pub fn build_record(
        &self,
        document: &Html,
        plot_url: &str,
        context: PlotContext,
    ) -> Option<ListingRecord> {
        let header = document.select(&HEADER).next()?;

        // Start from the template, then overwrite what the page provides
        let mut record = self.template.seed();
        record.set(Field::Region, context.region);
        record.set(Field::Outlet, context.outlet);
        record.set(Field::SchemesOffers, context.scheme_offer);
        record.set(Field::Proximity, context.proximity);
        record.set(Field::Url, plot_url);

        // Plot name and house type
        record.set(Field::Plot, first_text(header, &PRIMARY_HEADING));
        // TYPE keeps its template default when the heading element is absent
        if let Some(heading) = header.select(&SECONDARY_HEADING).next() {
            record.set(Field::Type, non_empty_or_sentinel(stripped_text(heading)));
        }

        // Address and the parts split out of it
        let address = header
            .select(&ADDRESS)
            .next()
            .map(stripped_text)
            .unwrap_or_default();
        let parts = AddressParts::parse(&address);
        record.set(Field::Address, address.as_str());
        record.set(Field::Postcode, parts.postcode.as_str());
        record.set(Field::Location, parts.location);
        record.set(Field::County, parts.county);

        // Geocode the postcode (cached)
        let geo = self.resolver.lookup_postcode_data(&parts.postcode);
        record.set(Field::City, geo.city.as_str());
        record.set(Field::Latitude, geo.latitude.as_str());
        record.set(Field::Longitude, geo.longitude.as_str());

        // Bedrooms and price from the icon list
        let details = HeaderDetails::read(header);
        record.set(Field::Bedroom, details.bedroom);
        record.set(Field::PriceLatest, details.price.as_str());
        record.set(Field::Availability, details.availability);
        // PRICE_RANGE mirrors PRICE_LATEST; the page shows a single price
        record.set(Field::PriceRange, details.price);

        // Floor plans; room counts are taken from the rendered lines
        let ground = dimensions_or_sentinel(document, &self.floors.ground_floor_id);
        let first = dimensions_or_sentinel(document, &self.floors.first_floor_id);
        let floors = [ground.as_str(), first.as_str()];
        let couches = count_rooms(&floors, |room| self.filter.is_couch_room(room));
        let bathrooms = count_rooms(&floors, |room| self.filter.is_bathroom(room));

        // Derived fields
        record.set(Field::ParkingConfiguration, parking_configuration(document, self.filter));
        record.set(Field::LivingRoom, counted(couches, "Couch"));
        record.set(Field::Bathroom, counted(bathrooms, "Bathroom"));
        record.set(Field::GroundFloorDimensions, ground);
        record.set(Field::FirstFloorDimensions, first);
        record.set(Field::Features, features(document));

        Some(record)
    }
}

/// Postcode, location and county derived from a comma-separated address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParts {
    pub postcode: String,
    pub location: String,
    pub county: String,
}

impl AddressParts {
    pub fn parse(address: &str) -> Self {
        let postcode = if address.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            address.rsplit(',').next().unwrap_or_default().trim().to_string()
        };

        let parts: Vec<&str> = address
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        let (location, county) = match parts.len() {
            n if n >= 3 => (parts[n - 3].to_string(), parts[n - 2].to_string()),
            _ => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };

        Self {
            postcode,
            location,
            county,
        }
    }
}

/// Bedroom, price and availability read from the header's icon list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDetails {
    pub bedroom: String,
    pub price: String,
    pub availability: &'static str,
}

impl Default for HeaderDetails {
    fn default() -> Self {
        Self {
            bedroom: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            availability: FOR_SALE,
        }
    }
}

impl HeaderDetails {
    pub fn read(header: ElementRef) -> Self {
        let mut details = Self::default();

        for item in header.select(&DETAIL_ITEM) {
            let Some(icon) = item.select(&ICON_USE).next() else {
                continue;
            };
            let icon_ref = icon_reference(icon);
            let text = stripped_text(item);

            if icon_ref.contains(BEDROOM_ICON) {
                details.bedroom = text;
            } else if icon_ref.contains(PRICE_ICON) {
                if text.to_lowercase().contains("coming soon") {
                    details.availability = COMING_SOON;
                }
                details.price = LEADING_FROM.replace(&text, "").into_owned();
            }
        }

        details
    }
}

/// The `href` of an SVG `<use>`, whether written as `href` or `xlink:href`
fn icon_reference<'e>(icon: ElementRef<'e>) -> &'e str {
    icon.value()
        .attrs()
        .find(|(name, _)| *name == "href" || *name == "xlink:href")
        .map(|(_, value)| value)
        .unwrap_or_default()
}

fn first_text(scope: ElementRef, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn non_empty_or_sentinel(text: String) -> String {
    if text.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        text
    }
}

/// Parking-related features, word-capitalized, first occurrence only
fn parking_configuration(document: &Html, filter: &KeywordFilter) -> String {
    let mut matches: Vec<String> = Vec::new();
    for item in document.select(&FEATURE_ITEM) {
        let lowered = stripped_text(item).to_lowercase();
        if filter.is_parking(&lowered) {
            let value = capitalize_words(&lowered);
            if !matches.contains(&value) {
                matches.push(value);
            }
        }
    }
    join_or_sentinel(&matches, "/")
}

/// Counts dimension lines whose room-name token satisfies `is_match`.
///
/// The room-name token is the second whitespace-separated word of a line
/// (`"2. Living Room 4.8m x 3.4m(...)"` -> `living`).
pub fn count_rooms<F>(dimensions: &[&str], is_match: F) -> usize
where
    F: Fn(&str) -> bool,
{
    dimensions
        .iter()
        .flat_map(|text| text.lines())
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter(|room| is_match(&room.to_lowercase()))
        .count()
}

fn counted(count: usize, label: &str) -> String {
    if count == 0 {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{count} {label}")
    }
}

fn features(document: &Html) -> String {
    let titles: Vec<String> = document.select(&ICON_TITLE).map(stripped_text).collect();
    join_or_sentinel(&titles, " / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(inner: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body><div class="marketing-header">{inner}</div></body></html>"#
        ))
    }

    fn details_of(doc: &Html) -> HeaderDetails {
        let header = doc.select(&HEADER).next().unwrap();
        HeaderDetails::read(header)
    }

    #[test]
    fn test_address_parts() {
        let parts = AddressParts::parse("Plot 12, Oak Fields, Crewe, Cheshire, CW1 4AA");
        assert_eq!(parts.postcode, "CW1 4AA");
        assert_eq!(parts.location, "Crewe");
        assert_eq!(parts.county, "Cheshire");
    }

    #[test]
    fn test_short_addresses_have_no_location() {
        for address in ["", "CW1 4AA", "Cheshire, CW1 4AA", "Crewe, , CW1 4AA", ", ,"] {
            let parts = AddressParts::parse(address);
            assert_eq!(parts.location, NOT_AVAILABLE, "address {:?}", address);
            assert_eq!(parts.county, NOT_AVAILABLE, "address {:?}", address);
        }
    }

    #[test]
    fn test_postcode_edges() {
        assert_eq!(AddressParts::parse("").postcode, NOT_AVAILABLE);
        assert_eq!(AddressParts::parse(" CW1 4AA ").postcode, "CW1 4AA");
        assert_eq!(AddressParts::parse("Crewe, Cheshire,").postcode, "");
    }

    #[test]
    fn test_coming_soon_price() {
        let doc = header(
            r##"<div class="marketing-header__details"><ul>
                <li class="icon-list__item"><svg><use xlink:href="#icon-price-bar"></use></svg>From Coming Soon £450,000</li>
            </ul></div>"##,
        );
        let details = details_of(&doc);
        assert_eq!(details.price, "Coming Soon £450,000");
        assert_eq!(details.availability, COMING_SOON);
        assert_eq!(details.bedroom, NOT_AVAILABLE);
    }

    #[test]
    fn test_bedroom_and_price() {
        let doc = header(
            r##"<div class="marketing-header__details"><ul>
                <li class="icon-list__item"><svg><use href="#icon-bedroom-bar"></use></svg> 4 Bedrooms </li>
                <li class="icon-list__item"><svg><use xlink:href="#icon-price-bar"></use></svg>from <span>£325,995</span></li>
                <li class="icon-list__item">No icon</li>
            </ul></div>"##,
        );
        let details = details_of(&doc);
        assert_eq!(details.bedroom, "4 Bedrooms");
        assert_eq!(details.price, "£325,995");
        assert_eq!(details.availability, FOR_SALE);
    }

    #[test]
    fn test_parking_configuration() {
        let doc = Html::parse_document(
            r#"<ul class="feature-list">
                <li class="feature-list__item">Garage</li>
                <li class="feature-list__item">garden</li>
                <li class="feature-list__item">Driveway Access</li>
                <li class="feature-list__item">GARAGE</li>
            </ul>"#,
        );
        assert_eq!(
            parking_configuration(&doc, &KeywordFilter::default()),
            "Garage/Driveway Access"
        );
    }

    #[test]
    fn test_parking_configuration_none() {
        let doc = Html::parse_document(
            r#"<ul class="feature-list"><li class="feature-list__item">Garden</li></ul>"#,
        );
        assert_eq!(parking_configuration(&doc, &KeywordFilter::default()), NOT_AVAILABLE);
    }

    #[test]
    fn test_count_rooms() {
        let filter = KeywordFilter::default();
        let ground = "1. Kitchen 3.5m x 2.9m(11'6 x 9'6)\n2. Living Room 4.8m x 3.4m(15'9 x 11'2)\n3. WC 1.6m x 0.9m(5'3 x 2'11)";
        let first = "1. Bedroom 3.9m x 3.1m(12'9 x 10'2)\n2. En-suite 2.1m x 1.3m(6'11 x 4'3)\n3. Bathroom 2.0m x 1.9m(6'7 x 6'3)";
        let floors = [ground, first, NOT_AVAILABLE];

        assert_eq!(count_rooms(&floors, |room| filter.is_couch_room(room)), 1);
        assert_eq!(count_rooms(&floors, |room| filter.is_bathroom(room)), 2);
        assert_eq!(counted(2, "Bathroom"), "2 Bathroom");
        assert_eq!(counted(0, "Couch"), NOT_AVAILABLE);
    }

    #[test]
    fn test_features() {
        let doc = Html::parse_document(
            r#"<div class="l-icons">
                <span class="l-icons__icon-title">Energy efficient</span>
                <span class="l-icons__icon-title">Turf to rear garden</span>
            </div>"#,
        );
        assert_eq!(features(&doc), "Energy efficient / Turf to rear garden");
        assert_eq!(features(&Html::parse_document("<p></p>")), NOT_AVAILABLE);
    }
}
