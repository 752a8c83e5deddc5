//! Backend API consumed by the search layer.

use std::future::Future;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{
    HistoryEntry, HistoryPayload, PostRequest, SearchPayload, SearchRequest, SearchResultItem,
    SuggestionsPayload, WidgetPayload,
};

/// The JSON endpoints the page talks to.
///
/// Every call suspends only its own caller; implementations must not block.
pub trait SearchBackend: Send + Sync + 'static {
    /// `GET /api/suggestions?query=<text>`
    fn suggestions(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;

    /// `POST /api/search` with `{ "query": ... }`
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResultItem>, ClientError>> + Send;

    /// `GET /api/search_history`
    fn history(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, ClientError>> + Send;

    /// `GET <endpoint>` returning `{ "content": ... }`
    fn widget(&self, endpoint: &str) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// `POST /api/posts` with `{ "text": ... }`
    fn submit_post(&self, text: &str) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// [`SearchBackend`] over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl { url: base_url });
        }
        let http = Client::builder()
            .user_agent(format!("alumni-search/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let response = response.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Percent-encodes a query string value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

pub fn suggestions_path(query: &str) -> String {
    format!("/api/suggestions?query={}", encode_component(query))
}

impl SearchBackend for HttpBackend {
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, ClientError> {
        let payload: SuggestionsPayload = self.get_json(&self.url(&suggestions_path(query))).await?;
        Ok(payload.suggestions)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, ClientError> {
        let payload: SearchPayload = self
            .post_json(&self.url("/api/search"), &SearchRequest { query })
            .await?;
        Ok(payload.results)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let payload: HistoryPayload = self.get_json(&self.url("/api/search_history")).await?;
        Ok(payload.history)
    }

    async fn widget(&self, endpoint: &str) -> Result<String, ClientError> {
        let payload: WidgetPayload = self.get_json(&self.url(endpoint)).await?;
        Ok(payload.content)
    }

    async fn submit_post(&self, text: &str) -> Result<(), ClientError> {
        let url = self.url("/api/posts");
        debug!(%url, "POST");
        self.http
            .post(&url)
            .json(&PostRequest { text })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
