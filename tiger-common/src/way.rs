//! OSM way data model and tag helpers
//!
//! The shapes follow what Overpass returns for `out meta geom` queries:
//! each way element carries its node id list, display geometry, tags and
//! the server-assigned version needed for optimistic-concurrency uploads.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Tag mapping for an OSM element. Keys are unique; an absent key means the
/// tag does not exist. A `BTreeMap` keeps iteration (and therefore XML
/// output) deterministic.
pub type Tags = BTreeMap<String, String>;

/// Bounding box of a way, used only for display
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}

/// A single point of a way's display geometry
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// An OSM way as fetched from Overpass.
///
/// `nodes` is the ordered geometry path and must be preserved as-is on
/// upload. `version` is required by the OSM API's optimistic-concurrency
/// check; Overpass only includes it for `out meta` queries, so it defaults
/// to 0 when absent and must be refreshed before upload in that case.
#[derive(Debug, Clone, Deserialize)]
pub struct OsmWay {
    pub id: u64,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub nodes: Vec<u64>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub geometry: Vec<Coordinate>,
    #[serde(default)]
    pub user: Option<String>,
}

impl OsmWay {
    /// Display name for the review prompt: `name` tag, else `ref`, else the
    /// highway class.
    pub fn display_name(&self) -> &str {
        self.tags
            .get("name")
            .or_else(|| self.tags.get("ref"))
            .or_else(|| self.tags.get("highway"))
            .map(String::as_str)
            .unwrap_or("(unnamed)")
    }
}

/// Remove TIGER import tags from a tag set.
///
/// Drops every key whose lowercase form starts with `tiger`. With
/// `keep_reviewed`, `tiger:reviewed` survives (the fix disposition keeps it
/// so the way stays in review queries).
pub fn filter_tiger_tags(tags: &Tags, keep_reviewed: bool) -> Tags {
    tags.iter()
        .filter(|(key, _)| {
            let is_tiger = key.to_lowercase().starts_with("tiger");
            !is_tiger || (keep_reviewed && key.as_str() == "tiger:reviewed")
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Render a tag set in the manual-editing text format: one `key=value` line
/// per tag.
pub fn format_tags_text(tags: &Tags) -> String {
    tags.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the manual-editing text format.
///
/// Each non-empty line must be `key=value`; an empty value after `=` means
/// "remove this key" and is returned as `None`. A line without `=` is a
/// parse error and the whole update is rejected.
pub fn parse_tags_text(text: &str) -> Result<Vec<(String, Option<String>)>> {
    let mut updates = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| Error::Parse(format!("tag line without '=': {:?}", line)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Parse(format!("tag line with empty key: {:?}", line)));
        }
        let value = value.trim();
        updates.push((
            key.to_string(),
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            },
        ));
    }
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn filter_tiger_drops_all_tiger_keys() {
        let input = tags(&[
            ("highway", "residential"),
            ("tiger:cfcc", "A41"),
            ("tiger:county", "Travis, TX"),
            ("tiger:reviewed", "no"),
            ("name", "Main Street"),
        ]);
        let filtered = filter_tiger_tags(&input, false);
        assert_eq!(filtered, tags(&[("highway", "residential"), ("name", "Main Street")]));
    }

    #[test]
    fn filter_tiger_can_keep_reviewed() {
        let input = tags(&[("tiger:cfcc", "A41"), ("tiger:reviewed", "no")]);
        let filtered = filter_tiger_tags(&input, true);
        assert_eq!(filtered, tags(&[("tiger:reviewed", "no")]));
    }

    #[test]
    fn filter_tiger_is_case_insensitive() {
        let input = tags(&[("Tiger:name_base", "Main")]);
        assert!(filter_tiger_tags(&input, false).is_empty());
    }

    #[test]
    fn tags_text_round_trip() {
        let input = tags(&[("highway", "residential"), ("name", "Elm Street")]);
        let text = format_tags_text(&input);
        assert_eq!(text, "highway=residential\nname=Elm Street");

        let updates = parse_tags_text(&text).unwrap();
        assert_eq!(
            updates,
            vec![
                ("highway".to_string(), Some("residential".to_string())),
                ("name".to_string(), Some("Elm Street".to_string())),
            ]
        );
    }

    #[test]
    fn empty_value_means_removal() {
        let updates = parse_tags_text("surface=\n").unwrap();
        assert_eq!(updates, vec![("surface".to_string(), None)]);
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(parse_tags_text("no equals sign").is_err());
        assert!(parse_tags_text("=value").is_err());
    }

    #[test]
    fn overpass_way_deserializes() {
        let json = r#"{
            "type": "way",
            "id": 42,
            "version": 3,
            "bounds": {"minlat": 30.0, "minlon": -97.8, "maxlat": 30.1, "maxlon": -97.7},
            "nodes": [1, 2, 3],
            "geometry": [
                {"lat": 30.0, "lon": -97.8},
                {"lat": 30.1, "lon": -97.7}
            ],
            "tags": {"highway": "residential", "tiger:reviewed": "no"}
        }"#;
        let way: OsmWay = serde_json::from_str(json).unwrap();
        assert_eq!(way.id, 42);
        assert_eq!(way.version, 3);
        assert_eq!(way.nodes, vec![1, 2, 3]);
        assert_eq!(way.tags.get("highway").map(String::as_str), Some("residential"));
        assert_eq!(way.display_name(), "residential");
    }
}
