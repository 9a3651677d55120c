//! Network transport seam.
//!
//! The resolver only needs "fetch this key, give me a status and a body";
//! [`HttpTransport`] provides that over `reqwest`, tests provide their own.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use thiserror::Error;

use crate::config::HttpSettings;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("invalid resource key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_builder() {
            Self::Client(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Raw response: status code and undecoded body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one request for a resource key.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<TransportResponse, TransportError>;
}

/// HTTP transport backed by a shared `reqwest::Client`.
///
/// Absolute keys are requested as-is. Relative keys such as `/api/people`
/// are joined onto the configured base URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base: Option<Url>,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self, TransportError> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(|| Self::user_agent().to_string());
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            base: settings.base_url.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("caching-fetch/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    fn url(&self, key: &str) -> Result<Url, TransportError> {
        match Url::parse(key) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let Some(base) = &self.base else {
                    return Err(TransportError::invalid_key(
                        key,
                        "relative key requires a base URL",
                    ));
                };
                base.join(key)
                    .map_err(|err| TransportError::invalid_key(key, err.to_string()))
            }
            Err(err) => Err(TransportError::invalid_key(key, err.to_string())),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, key: &str) -> Result<TransportResponse, TransportError> {
        let url = self.url(key)?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(TransportResponse { status, body })
    }
}
