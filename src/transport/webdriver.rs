use super::http::{HttpFetcher, build_client};
use super::{Fetcher, Response};
use crate::config::{LocatorKind, ReadinessLocator, TransportConfig};
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::sync::Mutex;

/// Common WebDriver ports tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// Browser-automation transport for client-side rendered pages.
///
/// WebDriver does not report HTTP status codes, so every request is first probed
/// with a plain GET. Only successful pages are rendered in the browser; the probe
/// response is returned as-is otherwise, which keeps the 404 sentinel intact.
///
/// The browser session is opened on first use and reused until [`Fetcher::close`].
pub struct WebDriverFetcher {
    webdriver_url: String,
    wait_time: Duration,
    headless: bool,
    http: reqwest::Client,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(config: &TransportConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            webdriver_url: config.webdriver_url.clone(),
            wait_time: config.wait_duration(),
            headless: config.headless,
            http: build_client(config)?,
            client: Mutex::new(None),
        })
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
        if self.headless {
            args.insert(0, "--headless");
        }
        let mut caps = Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }

    async fn connect_to(&self, webdriver_url: &str) -> Result<Client, String> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        builder
            .connect(webdriver_url)
            .await
            .map_err(|e| e.to_string())
    }

    /// Connects to the configured WebDriver, then to the fallback ports
    async fn connect(&self) -> Result<Client, FetchError> {
        match self.connect_to(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        let mut tried = vec![self.webdriver_url.clone()];
        for url in FALLBACK_WEBDRIVER_URLS {
            if url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = self.connect_to(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
            tried.push(url.to_string());
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(FetchError::NoWebDriver {
            tried: tried.join(", "),
        })
    }

    /// Navigates, waits for the readiness locator, and returns the rendered source
    async fn render(
        &self,
        client: &Client,
        url: &str,
        readiness: Option<&ReadinessLocator>,
    ) -> Result<String, CmdError> {
        client.goto(url).await?;

        if let Some(locator) = readiness {
            let wait = client.wait().at_most(self.wait_time);
            if let Err(e) = wait.for_element(to_locator(locator)).await {
                ::log::warn!(
                    "{:?} {:?} did not appear on {} within {:?}: {}",
                    locator.kind,
                    locator.value,
                    url,
                    self.wait_time,
                    e
                );
            }
        }

        client.source().await
    }
}

fn to_locator(locator: &ReadinessLocator) -> Locator<'_> {
    match locator.kind {
        LocatorKind::Css => Locator::Css(&locator.value),
        LocatorKind::Id => Locator::Id(&locator.value),
        LocatorKind::XPath => Locator::XPath(&locator.value),
        LocatorKind::LinkText => Locator::LinkText(&locator.value),
    }
}

fn is_session_lost(error: &CmdError) -> bool {
    let message = error.to_string();
    message.contains("Unable to find session") || message.contains("invalid session id")
}

fn navigation_error(error: CmdError, url: &str) -> FetchError {
    FetchError::WebDriver {
        url: url.to_string(),
        context: "rendering".to_string(),
        message: error.to_string(),
    }
}

#[async_trait]
impl Fetcher for WebDriverFetcher {
    async fn request(
        &self,
        url: &str,
        readiness: Option<&ReadinessLocator>,
    ) -> Result<Response, FetchError> {
        let probe = HttpFetcher::get(&self.http, url).await?;
        if !probe.is_success() {
            return Ok(probe);
        }

        let mut slot = self.client.lock().await;
        let client = match slot.take() {
            Some(client) => client,
            None => self.connect().await?,
        };

        match self.render(&client, url, readiness).await {
            Ok(body) => {
                *slot = Some(client);
                return Ok(Response::new(probe.status, body));
            }
            Err(e) if is_session_lost(&e) => {
                ::log::warn!("Lost WebDriver session while rendering {}, reconnecting", url);
            }
            Err(e) => {
                *slot = Some(client);
                return Err(navigation_error(e, url));
            }
        }

        // one reconnect attempt per request
        let client = self.connect().await?;
        let result = self
            .render(&client, url, readiness)
            .await
            .map(|body| Response::new(probe.status, body))
            .map_err(|e| navigation_error(e, url));
        *slot = Some(client);
        result
    }

    async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver client: {}", e);
            }
        }
    }
}
