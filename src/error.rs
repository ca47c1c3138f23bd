use thiserror::Error;

/// Failures of the fetch transport, including non-success HTTP statuses
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("WebDriver error while {context} {url}: {message}")]
    WebDriver {
        url: String,
        context: String,
        message: String,
    },

    #[error("no WebDriver server reachable (tried {tried})")]
    NoWebDriver { tried: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

/// Expected DOM structure was absent or malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("{what} not found")]
    MissingContainer { what: &'static str },

    #[error("{what} element not found")]
    MissingElement { what: &'static str },

    #[error("item has no title")]
    MissingTitle,

    #[error("item has no anchor")]
    MissingAnchor,

    #[error("anchor has no href")]
    MissingHref,

    #[error("cannot resolve href {href:?}: {message}")]
    InvalidUrl { href: String, message: String },

    #[error("<{element}> has no {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: String,
    },

    #[error("invalid ISO-8601 timestamp {value:?}")]
    InvalidTimestamp { value: String },
}

impl ExtractionError {
    /// True when a whole container was absent rather than malformed
    pub fn is_missing_container(&self) -> bool {
        matches!(self, ExtractionError::MissingContainer { .. })
    }
}

/// Anything that can go wrong while fetching and extracting a single page
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Invalid or unreadable configuration; the only error that escapes construction
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid link pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
