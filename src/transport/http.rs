use super::{Fetcher, Response};
use crate::config::{ReadinessLocator, TransportConfig};
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Plain GET transport; sees only server-rendered markup
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &TransportConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }

    pub(crate) async fn get(client: &reqwest::Client, url: &str) -> Result<Response, FetchError> {
        let response = client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        ::log::trace!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(Response { status, body })
    }
}

pub(crate) fn build_client(config: &TransportConfig) -> Result<reqwest::Client, ConfigError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout_duration())
        .build()?;
    Ok(client)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn request(
        &self,
        url: &str,
        readiness: Option<&ReadinessLocator>,
    ) -> Result<Response, FetchError> {
        if let Some(locator) = readiness {
            ::log::debug!(
                "HTTP transport cannot wait for {:?} {:?}; reading {} as served",
                locator.kind,
                locator.value,
                url
            );
        }
        Self::get(&self.client, url).await
    }
}
