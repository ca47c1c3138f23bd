pub mod http;
pub mod webdriver;

use crate::config::{ReadinessLocator, TransportConfig, TransportKind};
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use std::sync::Arc;

pub use http::HttpFetcher;
pub use webdriver::WebDriverFetcher;

/// Status code and document text of one fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The listing pagination sentinel
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Performs one page request, optionally waiting for an element to render
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn request(
        &self,
        url: &str,
        readiness: Option<&ReadinessLocator>,
    ) -> Result<Response, FetchError>;

    /// Release any session held by the transport
    async fn close(&self) {}
}

/// Build the fetcher selected by the transport configuration
pub fn from_config(config: &TransportConfig) -> Result<Arc<dyn Fetcher>, ConfigError> {
    match config.kind {
        TransportKind::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        TransportKind::WebDriver => Ok(Arc::new(WebDriverFetcher::new(config)?)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status_classes() {
        assert!(Response::new(200, "").is_success());
        assert!(Response::new(204, "").is_success());
        assert!(!Response::new(301, "").is_success());
        assert!(Response::new(404, "").is_not_found());
        assert!(!Response::new(500, "").is_not_found());
    }

    #[test]
    fn test_from_config_builds_http() {
        let config = TransportConfig::default();
        assert!(from_config(&config).is_ok());
    }
}
