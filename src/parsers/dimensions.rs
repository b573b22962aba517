use crate::error::DimensionError;
use crate::utils::NOT_AVAILABLE;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Attribute carrying the JSON room list of a floor-plan block
const DIMENSIONS_ATTR: &str = "data-floor-plan-v2-dimensions";

/// Room entry as embedded in the page
#[derive(Debug, Clone, Default, Deserialize)]
struct RoomDimension {
    #[serde(default)]
    room: Option<Value>,
    #[serde(default)]
    metric: Option<Value>,
    #[serde(default)]
    imperial: Option<String>,
}

/// Strings verbatim, other scalars in their JSON form, null as empty
fn display_value(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}

/// One rendered floor-plan line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionLine {
    pub ordinal: usize,
    pub room: String,
    pub metric: String,
    pub imperial: String,
}

impl fmt::Display for DimensionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} {}({})",
            self.ordinal, self.room, self.metric, self.imperial
        )
    }
}

/// Parses the JSON room list, numbering rooms from 1 and dropping the
/// inch marks from imperial sizes.
pub fn parse_dimensions(raw: &str) -> Result<Vec<DimensionLine>, DimensionError> {
    let rooms: Vec<RoomDimension> = serde_json::from_str(&raw.replace("&quot;", "\""))?;

    Ok(rooms
        .into_iter()
        .enumerate()
        .map(|(idx, room)| DimensionLine {
            ordinal: idx + 1,
            room: display_value(room.room),
            metric: display_value(room.metric),
            imperial: room.imperial.unwrap_or_default().replace('"', ""),
        })
        .collect())
}

pub fn render_lines(lines: &[DimensionLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads the floor-plan block for `floor_id` from a plot page
pub fn extract_dimensions(document: &Html, floor_id: &str) -> Result<String, DimensionError> {
    let selector = Selector::parse(&format!(
        r#"button[data-floor-plan-v2-accordion-item-id="{floor_id}"] .floor-plan-v2__accordion-item-content"#
    ))
    .map_err(|_| DimensionError::Selector {
        floor_id: floor_id.to_string(),
    })?;

    let block = document
        .select(&selector)
        .next()
        .ok_or_else(|| DimensionError::MissingBlock {
            floor_id: floor_id.to_string(),
        })?;

    let raw = block
        .value()
        .attr(DIMENSIONS_ATTR)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| DimensionError::MissingAttribute {
            floor_id: floor_id.to_string(),
        })?;

    Ok(render_lines(&parse_dimensions(raw)?))
}

/// Like `extract_dimensions`, with any failure reported as the sentinel
pub fn dimensions_or_sentinel(document: &Html, floor_id: &str) -> String {
    match extract_dimensions(document, floor_id) {
        Ok(rendered) => rendered,
        Err(e) => {
            ::log::debug!("Floor plan unavailable: {}", e);
            NOT_AVAILABLE.to_string()
        }
    }
}
