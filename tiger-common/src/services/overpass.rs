//! Overpass API client
//!
//! Fetches candidate TIGER ways for a relation or bounding box. The query
//! selects highway ways still marked `tiger:reviewed=no` that are missing
//! either a surface or a lane count, minus classes that are not worth
//! reviewing (service ways, footpaths, proposed roads, tracks).

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::way::OsmWay;

const DEFAULT_INTERPRETER_URL: &str = "https://overpass-api.de/api/interpreter";
const USER_AGENT: &str = concat!("tiger-review/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 180;

const BASE_QUERY: &str = r#"
(
  way(area.hood)[highway]["tiger:reviewed"=no][!surface][!"fixme:tigerking"];
  way(area.hood)[highway]["tiger:reviewed"=no][!lanes][!"fixme:tigerking"];
)->.tigers;

(
  way(area.hood)[highway=service];
  way(area.hood)[highway=cycleway];
  way(area.hood)[highway=footway];
  way(area.hood)[highway=proposed];
  way(area.hood)[highway=track];
  way(area.hood)[highway=path];
)->.ignore;

((.tigers; - .ignore;); >; )->.all;
way.all->._;

out meta geom;
"#;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<serde_json::Value>,
}

/// Client for the Overpass interpreter endpoint
pub struct OverpassClient {
    http: reqwest::Client,
    interpreter_url: String,
}

impl OverpassClient {
    pub fn new(interpreter_url: &str) -> Result<Self> {
        let url = if interpreter_url.is_empty() {
            DEFAULT_INTERPRETER_URL
        } else {
            interpreter_url
        };
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(OverpassClient {
            http,
            interpreter_url: url.to_string(),
        })
    }

    /// Fetch candidate ways inside an OSM relation (mapped to its area)
    pub async fn ways_in_relation(&self, relation_id: u64) -> Result<Vec<OsmWay>> {
        let query = format!(
            "[out:json];\nrel({});\nmap_to_area->.hood;\n{}",
            relation_id, BASE_QUERY
        );
        self.run_query(&query).await
    }

    /// Fetch candidate ways inside a bounding box (south, west, north, east)
    pub async fn ways_in_bbox(
        &self,
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    ) -> Result<Vec<OsmWay>> {
        let query = format!(
            "[out:json][bbox:{},{},{},{}];\n{}",
            south,
            west,
            north,
            east,
            // the bbox applies globally, so the area filter is dropped
            BASE_QUERY.replace("(area.hood)", "")
        );
        self.run_query(&query).await
    }

    async fn run_query(&self, query: &str) -> Result<Vec<OsmWay>> {
        debug!(url = %self.interpreter_url, "Running Overpass query");

        let response = self
            .http
            .post(&self.interpreter_url)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| Error::Overpass(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Overpass(format!(
                "interpreter returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let data: OverpassResponse = response
            .json()
            .await
            .map_err(|e| Error::Overpass(format!("malformed response: {}", e)))?;

        let ways: Vec<OsmWay> = data
            .elements
            .into_iter()
            .filter(|element| element.get("type").and_then(|t| t.as_str()) == Some("way"))
            .filter_map(|element| serde_json::from_value(element).ok())
            .collect();

        info!(count = ways.len(), "Fetched candidate ways from Overpass");
        Ok(ways)
    }
}
