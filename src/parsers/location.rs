use crate::crawlers::fetch::Fetch;
use crate::parsers::static_selector;
use crate::results::{LocationLink, Region};
use crate::utils::resolve_url;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static LOCATION_LINK: LazyLock<Selector> =
    LazyLock::new(|| static_selector(".location-group__list .location-group__link"));

/// Reads the site's location index
#[derive(Clone, Copy)]
pub struct LocationStage<'a> {
    fetcher: &'a dyn Fetch,
    base: &'a Url,
}

impl<'a> LocationStage<'a> {
    pub fn new(fetcher: &'a dyn Fetch, base: &'a Url) -> Self {
        Self { fetcher, base }
    }

    /// Yields one link per location on the index page, in page order.
    ///
    /// An index page that cannot be fetched yields nothing.
    pub fn extract_locations(&self, start_url: &str) -> impl Iterator<Item = LocationLink> + use<'a> {
        ::log::info!("Discovering locations from {}", start_url);

        let hrefs = match self.fetcher.fetch_document(start_url) {
            Some(document) => location_hrefs(&document),
            None => Vec::new(),
        };
        ::log::debug!("Found {} location links", hrefs.len());

        let base = self.base;
        hrefs.into_iter().filter_map(move |href| {
            let url = resolve_url(base, &href)?;
            let region = Region::from_url(&url);
            Some(LocationLink {
                url: url.into(),
                region,
            })
        })
    }
}

fn location_hrefs(document: &Html) -> Vec<String> {
    document
        .select(&LOCATION_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawlers::fetch::StaticFetcher;
    use crate::utils::NOT_AVAILABLE;

    const INDEX: &str = r#"<html><body>
        <ul class="location-group__list">
          <li><a class="location-group__link" href="/new-homes/north-west/cheshire">Cheshire</a></li>
          <li><a class="location-group__link">No href</a></li>
          <li><a class="location-group__link" href="">Empty href</a></li>
          <li><a class="location-group__link" href="https://www.example.com/new-homes/yorkshire">Yorkshire</a></li>
        </ul>
        <a class="location-group__link" href="/outside-the-list">Ignored</a>
        </body></html>"#;

    #[test]
    fn test_extract_locations() {
        let fetcher = StaticFetcher::new().with_page("https://www.example.com/new-homes", INDEX);
        let base = Url::parse("https://www.example.com").unwrap();
        let stage = LocationStage::new(&fetcher, &base);

        let links: Vec<LocationLink> = stage
            .extract_locations("https://www.example.com/new-homes")
            .collect();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://www.example.com/new-homes/north-west/cheshire");
        assert_eq!(links[0].region.area, "North West");
        assert_eq!(links[0].region.sub_area, "Cheshire");
        assert_eq!(links[1].region.area, NOT_AVAILABLE);
        assert_eq!(links[1].region.sub_area, NOT_AVAILABLE);
        assert!(links.iter().all(|link| link.url != "https://www.example.com/"));
    }

    #[test]
    fn test_empty_href_is_skipped() {
        let index = r#"<ul class="location-group__list">
            <li><a class="location-group__link" href="">Empty</a></li>
            </ul>"#;
        let fetcher = StaticFetcher::new().with_page("https://www.example.com/new-homes", index);
        let base = Url::parse("https://www.example.com").unwrap();
        let stage = LocationStage::new(&fetcher, &base);

        assert_eq!(stage.extract_locations("https://www.example.com/new-homes").count(), 0);
    }

    #[test]
    fn test_unfetchable_index_is_empty() {
        let fetcher = StaticFetcher::new();
        let base = Url::parse("https://www.example.com").unwrap();
        let stage = LocationStage::new(&fetcher, &base);

        assert_eq!(stage.extract_locations("https://www.example.com/new-homes").count(), 0);
    }
}
