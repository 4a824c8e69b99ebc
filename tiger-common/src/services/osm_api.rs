//! OSM API client
//!
//! Implements the authenticated endpoints the tool needs: element lookup
//! and the three changeset calls (create, upload diff, close). Requests
//! carry an OAuth bearer token; acquiring the token is configuration, not
//! this module's concern.
//!
//! The upload protocol sits behind the `ChangesetUpload` trait so the
//! orchestrator can be exercised against a hand-rolled mock in tests.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::way::Tags;

const DEFAULT_API_URL: &str = "https://api.openstreetmap.org";
const USER_AGENT: &str = concat!("tiger-review/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// The three-step changeset upload protocol, in call order.
///
/// All three require authentication. `create_changeset` returns the new
/// changeset id from the plain-text response body; `upload_diff` returns
/// the server's diff result XML.
pub trait ChangesetUpload: Send + Sync {
    fn create_changeset(&self, body: String) -> impl Future<Output = Result<u64>> + Send;
    fn upload_diff(
        &self,
        changeset: u64,
        body: String,
    ) -> impl Future<Output = Result<String>> + Send;
    fn close_changeset(&self, changeset: u64) -> impl Future<Output = Result<()>> + Send;
}

/// An OSM element as returned by the `/api/0.6/{type}/{id}.json` lookup
#[derive(Debug, Clone, Deserialize)]
pub struct OsmElement {
    pub id: u64,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Deserialize)]
struct ElementsResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

/// Authenticated client for the OSM API
pub struct OsmApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl OsmApiClient {
    pub fn new(base_url: &str, access_token: Option<String>) -> Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_API_URL
        } else {
            base_url
        };
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(OsmApiClient {
            http,
            base_url: base.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Look up a single element's current tags and version. Used to show
    /// relation names and to refresh a way's version before upload when the
    /// fetched copy lacks one.
    pub async fn fetch_element(&self, element_type: &str, id: u64) -> Result<OsmElement> {
        let url = format!("{}/api/0.6/{}/{}.json", self.base_url, element_type, id);
        debug!(url = %url, "Fetching OSM element");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(Error::NotFound(format!("{} {}", element_type, id)));
        }
        if !status.is_success() {
            return Err(Error::OsmApi {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let data: ElementsResponse = response.json().await?;
        data.elements
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("{} {}", element_type, id)))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(Error::OsmApi {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

impl ChangesetUpload for OsmApiClient {
    async fn create_changeset(&self, body: String) -> Result<u64> {
        let url = format!("{}/api/0.6/changeset/create", self.base_url);
        debug!(url = %url, "Creating changeset");

        let response = self
            .authorized(self.http.put(&url))
            .header(reqwest::header::CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        text.trim()
            .parse::<u64>()
            .map_err(|_| Error::Parse(format!("unexpected changeset id response: {:?}", text)))
    }

    async fn upload_diff(&self, changeset: u64, body: String) -> Result<String> {
        let url = format!("{}/api/0.6/changeset/{}/upload", self.base_url, changeset);
        debug!(url = %url, "Uploading changeset diff");

        let response = self
            .authorized(self.http.post(&url))
            .header(reqwest::header::CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.text().await?)
    }

    async fn close_changeset(&self, changeset: u64) -> Result<()> {
        let url = format!("{}/api/0.6/changeset/{}/close", self.base_url, changeset);
        debug!(url = %url, "Closing changeset");

        let response = self.authorized(self.http.put(&url)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
