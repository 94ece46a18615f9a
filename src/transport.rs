use crate::config::ClientConfig;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;

/// A fetched page: where we ended up after redirects, and what it contained.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into a `Network` error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ScraperError::Network(format!(
                "{} returned HTTP {}",
                self.url, self.status
            )))
        }
    }
}

/// The stateful browser the scraper drives: it keeps cookies between calls and
/// reports the final URL of every request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `query` appended to its query string.
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Page>;
    /// POST `fields` to `url` as `application/x-www-form-urlencoded`.
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Page>;
    /// A new transport of the same kind with an empty cookie store.
    fn fresh(&self) -> Result<Box<dyn Transport>>;
}

/// `Transport` backed by `reqwest` with an in-memory cookie jar.
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::build(&config.user_agent, Duration::from_secs(config.timeout_secs))
    }

    fn build(user_agent: &str, timeout: Duration) -> Result<Self> {
        let cookie_jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|_| {
                ScraperError::ParsingError(format!("invalid user agent: {:?}", user_agent))
            })?,
        );

        let client = reqwest::Client::builder()
            .cookie_provider(cookie_jar)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            timeout,
        })
    }

    async fn into_page(response: reqwest::Response) -> Result<Page> {
        let url = response.url().clone();
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Page { url, status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Page> {
        let mut target = Url::parse(url)
            .map_err(|e| ScraperError::ParsingError(format!("invalid URL {:?}: {}", url, e)))?;
        if !query.is_empty() {
            target.query_pairs_mut().extend_pairs(query.iter());
        }
        let response = self.client.get(target).send().await?;
        Self::into_page(response).await
    }

    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Page> {
        let response = self.client.post(url).form(fields).send().await?;
        Self::into_page(response).await
    }

    fn fresh(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(Self::build(&self.user_agent, self.timeout)?))
    }
}
