use crate::crawlers::fetch::Fetch;
use crate::filter::KeywordFilter;
use crate::parsers::static_selector;
use crate::results::{PlotLink, PropertyLink};
use crate::utils::{NOT_AVAILABLE, capitalize_words, join_or_sentinel, resolve_url, stripped_text};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static PROPERTY_CARD: LazyLock<Selector> = LazyLock::new(|| static_selector(".location-list-card"));
static PROPERTY_HEADING: LazyLock<Selector> =
    LazyLock::new(|| static_selector("a.location-list-card__heading"));
static CURRENT_BREADCRUMB: LazyLock<Selector> =
    LazyLock::new(|| static_selector(".breadcrumb__item-link--current"));
static FEATURE_TEXT: LazyLock<Selector> = LazyLock::new(|| static_selector(".feature-list__item-text"));
static AVAILABLE_HOMES: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"div[data-jump="available-homes"]"#));
static PLOT_CARD: LazyLock<Selector> = LazyLock::new(|| static_selector(".plot-list__plot"));
static PLOT_LINK: LazyLock<Selector> = LazyLock::new(|| static_selector("a.plot"));

/// Scheme-message classes, in the order their texts are joined
static SCHEME_MESSAGES: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        static_selector(".plot__status-message--custom"),
        static_selector(".plot__status-message--highlight"),
        static_selector(".plot__details-product-tag"),
    ]
});

/// Reads location pages and property (development) pages
#[derive(Clone, Copy)]
pub struct PropertyStage<'a> {
    fetcher: &'a dyn Fetch,
    base: &'a Url,
    filter: &'a KeywordFilter,
}

impl<'a> PropertyStage<'a> {
    pub fn new(fetcher: &'a dyn Fetch, base: &'a Url, filter: &'a KeywordFilter) -> Self {
        Self {
            fetcher,
            base,
            filter,
        }
    }

    /// Yields one property per listing card on a location page, tagged with
    /// the location's region.
    pub fn extract_properties(
        &self,
        location_url: &str,
        region: &str,
    ) -> impl Iterator<Item = PropertyLink> + use<'a> {
        ::log::info!("Discovering properties on {}", location_url);

        let hrefs = match self.fetcher.fetch_document(location_url) {
            Some(document) => property_hrefs(&document),
            None => Vec::new(),
        };
        ::log::debug!("Found {} property cards", hrefs.len());

        let base = self.base;
        let region = region.to_string();
        hrefs.into_iter().filter_map(move |href| {
            let url = resolve_url(base, &href)?;
            Some(PropertyLink {
                url: url.into(),
                region: region.clone(),
            })
        })
    }

    /// Reads the outlet name and the nearby-amenity features of a property
    pub fn extract_outlet_and_proximity(&self, property_url: &str) -> (String, String) {
        let Some(document) = self.fetcher.fetch_document(property_url) else {
            return (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string());
        };

        let outlet = document
            .select(&CURRENT_BREADCRUMB)
            .next()
            .map(stripped_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let proximities: Vec<String> = document
            .select(&FEATURE_TEXT)
            .map(stripped_text)
            .filter(|text| self.filter.is_proximity(text))
            .collect();

        (outlet, join_or_sentinel(&proximities, " / "))
    }

    /// Lists the plots in a property's available-homes section
    pub fn extract_plots(&self, property_url: &str, region: &str) -> Vec<PlotLink> {
        let Some(document) = self.fetcher.fetch_document(property_url) else {
            return Vec::new();
        };

        let Some(section) = document.select(&AVAILABLE_HOMES).next() else {
            ::log::debug!("No available homes on {}", property_url);
            return Vec::new();
        };

        let plots: Vec<PlotLink> = section
            .select(&PLOT_CARD)
            .filter_map(|card| {
                // Cards without a plot link are skipped
                let href = card.select(&PLOT_LINK).next()?.value().attr("href")?;
                let url = resolve_url(self.base, href)?;
                Some(PlotLink {
                    url: url.into(),
                    region: region.to_string(),
                    scheme_offer: scheme_offer(card),
                })
            })
            .collect();

        ::log::info!("Found {} plots on {}", plots.len(), property_url);
        plots
    }
}

fn property_hrefs(document: &Html) -> Vec<String> {
    document
        .select(&PROPERTY_CARD)
        .filter_map(|card| card.select(&PROPERTY_HEADING).next())
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Joins the card's scheme messages, each word-capitalized
fn scheme_offer(card: ElementRef) -> String {
    let messages: Vec<String> = SCHEME_MESSAGES
        .iter()
        .filter_map(|selector| card.select(selector).next())
        .map(stripped_text)
        .filter(|text| !text.is_empty())
        .map(|text| capitalize_words(&text))
        .collect();

    join_or_sentinel(&messages, " / ")
}
