use scraper::ElementRef;
use url::Url;

/// Marker stored in any record field whose source data is missing
pub const NOT_AVAILABLE: &str = "NOT_AVAILABLE";

/// Collects an element's text the way listing pages are read: every text
/// node trimmed, empty nodes dropped, the rest concatenated.
pub fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Title-cases a label: a letter is upper-cased when it starts a run of
/// letters and lower-cased otherwise ("north-west" -> "North-West").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Capitalizes each whitespace-separated word and joins them with single spaces
pub fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Resolves a (possibly relative) href against the site base
pub fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            ::log::debug!("Could not resolve href {:?} against {}: {}", href, base, e);
            None
        }
    }
}

/// Returns the first non-empty candidate, or the sentinel
pub fn first_available<I>(candidates: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Joins values with `separator`, or yields the sentinel when there are none
pub fn join_or_sentinel(values: &[String], separator: &str) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("north west"), "North West");
        assert_eq!(title_case("EAST midlands"), "East Midlands");
        assert_eq!(title_case("st-albans"), "St-Albans");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("  only   2 LEFT "), "Only 2 Left");
        assert_eq!(capitalize_words("driveway access"), "Driveway Access");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_stripped_text_concatenates_trimmed_nodes() {
        let doc = Html::parse_fragment("<p>  From <span> £450,000 </span>\n</p>");
        let selector = Selector::parse("p").unwrap();
        let p = doc.select(&selector).next().unwrap();
        assert_eq!(stripped_text(p), "From£450,000");
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://www.example.com").unwrap();
        assert_eq!(
            resolve_url(&base, "/new-homes/north-west").map(String::from),
            Some("https://www.example.com/new-homes/north-west".to_string())
        );
        assert_eq!(
            resolve_url(&base, "https://other.org/x").map(String::from),
            Some("https://other.org/x".to_string())
        );
    }

    #[test]
    fn test_first_available() {
        let value = first_available([None, Some(String::new()), Some("Leeds".to_string())]);
        assert_eq!(value, "Leeds");
        assert_eq!(first_available([None, Some("  ".to_string())]), NOT_AVAILABLE);
    }

    #[test]
    fn test_join_or_sentinel() {
        assert_eq!(join_or_sentinel(&[], " / "), NOT_AVAILABLE);
        let values = vec!["a".to_string(), "b".to_string()];
        assert_eq!(join_or_sentinel(&values, " / "), "a / b");
    }
}
