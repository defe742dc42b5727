use super::{async_trait, CardSource, Endpoint};
use crate::structs::{into_collection, record_id, Collection, Record};
use crate::{Error, Result};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

/// [`CardSource`] backed by the TCGdex REST API.
#[derive(Debug, Clone)]
pub struct TcgdexClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TcgdexClient {
    ///
    /// `base_url` already includes the language, for example
    /// `https://api.tcgdex.net/v2/pt`. `timeout` bounds each request.
    ///
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<TcgdexClient> {
        let trimmed = base_url.trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|why| Error::InvalidUrl {
            url: base_url.to_string(),
            reason: why.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical http(s) url".to_string(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(TcgdexClient {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn list_url(&self, endpoint: Endpoint) -> String {
        self.join(&[endpoint.path()])
    }

    /// Ids are percent-encoded as a single path segment.
    pub fn record_url(&self, endpoint: Endpoint, id: &str) -> String {
        self.join(&[endpoint.path(), id])
    }

    fn join(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base can always take path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        trace!("GET {} {:?}", url, query);
        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    async fn get_collection(&self, url: String, query: &[(&str, String)]) -> Result<Collection> {
        let value = self.get_json(&url, query).await?;
        into_collection(value).map_err(|reason| Error::UnexpectedResponse { url, reason })
    }
}

#[async_trait]
impl CardSource for TcgdexClient {
    async fn fetch_record(&self, endpoint: Endpoint, id: &str) -> Result<Record> {
        let url = self.record_url(endpoint, id);
        let value = self.get_json(&url, &[]).await?;
        expect_record(url, id, value)
    }

    async fn fetch_page(
        &self,
        endpoint: Endpoint,
        limit: usize,
        offset: usize,
    ) -> Result<Collection> {
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        self.get_collection(self.list_url(endpoint), &query).await
    }

    async fn fetch_list(&self, endpoint: Endpoint) -> Result<Collection> {
        self.get_collection(self.list_url(endpoint), &[]).await
    }
}

/// Accept `value` only as the record of `id`.
fn expect_record(url: String, id: &str, value: Value) -> Result<Record> {
    let record = match value {
        Value::Object(record) => record,
        _ => {
            return Err(Error::UnexpectedResponse {
                url,
                reason: "expected a JSON object".to_string(),
            })
        }
    };
    match record_id(&record) {
        Some(found) if found == id => Ok(record),
        Some(found) => Err(Error::UnexpectedResponse {
            url,
            reason: format!("asked for `{}`, got `{}`", id, found),
        }),
        None => Err(Error::UnexpectedResponse {
            url,
            reason: "record has no string `id`".to_string(),
        }),
    }
}
