use crate::config::KeywordConfig;
use regex::{Regex, RegexBuilder};

/// Compiled keyword rules used by the property and plot extractors
#[derive(Debug)]
pub struct KeywordFilter {
    proximity: Regex,
    parking: Vec<String>,
    couch: Vec<String>,
    bathroom: Vec<String>,
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(&KeywordConfig::default()).expect("Default proximity pattern should be valid")
    }
}

impl KeywordFilter {
    /// Compile the filter from configuration
    pub fn new(config: &KeywordConfig) -> Result<Self, regex::Error> {
        let proximity = RegexBuilder::new(&config.proximity_pattern)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            proximity,
            parking: lowercase_all(&config.parking),
            couch: lowercase_all(&config.couch),
            bathroom: lowercase_all(&config.bathroom),
        })
    }

    /// Whether a feature-list entry describes something nearby
    pub fn is_proximity(&self, text: &str) -> bool {
        self.proximity.is_match(text)
    }

    /// Whether an already lower-cased feature mentions parking
    pub fn is_parking(&self, lowered: &str) -> bool {
        contains_any(lowered, &self.parking)
    }

    /// Whether a lower-cased room name counts as a living room
    pub fn is_couch_room(&self, room: &str) -> bool {
        contains_any(room, &self.couch)
    }

    /// Whether a lower-cased room name counts as a bathroom
    pub fn is_bathroom(&self, room: &str) -> bool {
        contains_any(room, &self.bathroom)
    }
}

fn lowercase_all(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}
