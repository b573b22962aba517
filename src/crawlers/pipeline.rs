use crate::config::CrawlConfig;
use crate::crawlers::fetch::{Fetch, HttpFetcher};
use crate::error::ConfigError;
use crate::filter::KeywordFilter;
use crate::parsers::{LocationStage, PlotStage, PropertyStage};
use crate::postcode::{PostcodeCache, PostcodeResolver, PostcodesIo};
use crate::results::ListingRecord;
use std::cell::Cell;
use std::sync::Arc;
use url::Url;

/// Counters for one walk of the site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub locations: usize,
    pub properties: usize,
    pub plots: usize,
    pub records: usize,
}

impl RunStats {
    /// Plots that were found but produced no record
    pub fn skipped_plots(&self) -> usize {
        self.plots.saturating_sub(self.records)
    }
}

/// Walks location index -> property pages -> plot pages
pub struct Pipeline {
    config: CrawlConfig,
    base: Url,
    filter: KeywordFilter,
    fetcher: Box<dyn Fetch>,
    resolver: PostcodeResolver,
    limit: Option<usize>,
    stats: Cell<RunStats>,
}

impl Pipeline {
    /// Create a pipeline from its collaborators
    pub fn new(
        config: CrawlConfig,
        fetcher: Box<dyn Fetch>,
        resolver: PostcodeResolver,
    ) -> Result<Self, ConfigError> {
        let base = config.site_base()?;
        config.start()?;
        let filter = KeywordFilter::new(&config.keywords)?;

        Ok(Self {
            config,
            base,
            filter,
            fetcher,
            resolver,
            limit: None,
            stats: Cell::new(RunStats::default()),
        })
    }

    /// Create a pipeline that fetches over HTTP and geocodes with postcodes.io
    pub fn from_config(config: CrawlConfig) -> Result<Self, ConfigError> {
        let fetcher = HttpFetcher::new(&config)?;
        let service = PostcodesIo::new(&config.postcode)?;
        let resolver = PostcodeResolver::new(Box::new(service), Arc::new(PostcodeCache::new()));
        Self::new(config, Box::new(fetcher), resolver)
    }

    /// Stop after this many records
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn stats(&self) -> RunStats {
        self.stats.get()
    }

    pub fn location_stage(&self) -> LocationStage<'_> {
        LocationStage::new(self.fetcher.as_ref(), &self.base)
    }

    pub fn property_stage(&self) -> PropertyStage<'_> {
        PropertyStage::new(self.fetcher.as_ref(), &self.base, &self.filter)
    }

    pub fn plot_stage(&self) -> PlotStage<'_> {
        PlotStage::new(
            self.fetcher.as_ref(),
            &self.resolver,
            &self.filter,
            &self.config.floors,
            &self.config.template,
        )
    }

    /// Lazily yields listing records in page order.
    ///
    /// Each page is fetched only when the iterator reaches it, so stopping
    /// early (or hitting the limit) leaves the rest of the site untouched.
    pub fn records(&self) -> impl Iterator<Item = ListingRecord> + '_ {
        let properties = self.property_stage();
        let plots = self.plot_stage();

        // Locations from the index page, then each location's properties
        self.location_stage()
            .extract_locations(&self.config.start_url)
            .flat_map(move |location| {
                self.bump(|s| s.locations += 1);
                ::log::info!("Location {} ({})", location.url, location.region.area);
                properties.extract_properties(&location.url, &location.region.area)
            })
            // Property-level values are shared by every plot of the property
            .flat_map(move |property| {
                self.bump(|s| s.properties += 1);
                let (outlet, proximity) = properties.extract_outlet_and_proximity(&property.url);
                let found = properties.extract_plots(&property.url, &property.region);
                found
                    .into_iter()
                    .map(move |plot| (plot, outlet.clone(), proximity.clone()))
            })
            // Plots without a marketing header drop out here
            .filter_map(move |(plot, outlet, proximity)| {
                self.bump(|s| s.plots += 1);
                let record = plots.parse_plot_data(
                    &plot.url,
                    &plot.region,
                    &outlet,
                    &plot.scheme_offer,
                    &proximity,
                )?;
                self.bump(|s| s.records += 1);
                Some(record)
            })
            .take(self.limit.unwrap_or(usize::MAX))
    }

    fn bump(&self, update: impl FnOnce(&mut RunStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}
