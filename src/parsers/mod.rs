pub mod dimensions;
pub mod location;
pub mod plot;
pub mod property;


pub use location::LocationStage;
pub use plot::{PlotContext, PlotStage};
pub use property::PropertyStage;

use scraper::Selector;

/// Parses a selector written into the source; these are known to be valid
pub(crate) fn static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}
