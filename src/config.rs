use crate::error::ConfigError;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A declarative DOM locator: an element name plus attribute filters.
///
/// `class` filters match when the value is one of the element's classes; every
/// other attribute must match exactly. An empty `name` matches any element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSelector {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl ElementSelector {
    /// Selector for every `name` element
    pub fn tag(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: BTreeMap::new(),
        }
    }

    /// Add an attribute filter
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    /// Render as a CSS selector string
    pub fn to_css(&self) -> String {
        let mut css = if self.name.is_empty() {
            "*".to_string()
        } else {
            self.name.clone()
        };
        for (key, value) in &self.attrs {
            let op = if key == "class" || key == "rel" { "~=" } else { "=" };
            css.push_str(&format!("[{}{}\"{}\"]", key, op, escape_css_string(value)));
        }
        css
    }

    /// Compile into a `scraper` selector
    pub fn compile(&self) -> Result<Selector, ConfigError> {
        let css = self.to_css();
        Selector::parse(&css).map_err(|e| ConfigError::InvalidSelector {
            message: e.to_string(),
            selector: css.clone(),
        })
    }
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Locator strategies a rendering transport can wait on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    Css,
    Id,
    XPath,
    LinkText,
}

/// "Wait until this element exists" condition for client-side rendered pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessLocator {
    pub kind: LocatorKind,
    pub value: String,
}

impl ReadinessLocator {
    pub fn css(value: &str) -> Self {
        Self {
            kind: LocatorKind::Css,
            value: value.to_string(),
        }
    }
}

/// Locators for the paginated listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// The node holding all items, e.g. the document table
    pub container: ElementSelector,

    /// One node per listed document
    pub item: ElementSelector,

    /// Title node inside an item; items without one are skipped
    pub title: ElementSelector,

    /// Optional element to wait for before reading a rendered listing
    #[serde(default)]
    pub readiness: Option<ReadinessLocator>,
}

/// Markers used to pull text and metadata out of a document page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSelectors {
    #[serde(default = "default_content")]
    pub content: ElementSelector,

    #[serde(default = "default_metadata")]
    pub metadata: ElementSelector,

    #[serde(default = "default_paragraph")]
    pub paragraph: ElementSelector,

    #[serde(default = "default_tag")]
    pub tag: ElementSelector,

    #[serde(default = "default_time")]
    pub time: ElementSelector,

    #[serde(default = "default_time_attribute")]
    pub time_attribute: String,

    /// Collapse whitespace runs inside each paragraph
    #[serde(default)]
    pub normalize_whitespace: bool,
}

impl Default for DocumentSelectors {
    fn default() -> Self {
        Self {
            content: default_content(),
            metadata: default_metadata(),
            paragraph: default_paragraph(),
            tag: default_tag(),
            time: default_time(),
            time_attribute: default_time_attribute(),
            normalize_whitespace: false,
        }
    }
}

fn default_content() -> ElementSelector {
    ElementSelector::tag("div").with_attr("class", "entry-content")
}

fn default_metadata() -> ElementSelector {
    ElementSelector::tag("div").with_attr("class", "entry-meta")
}

fn default_paragraph() -> ElementSelector {
    ElementSelector::tag("p")
}

fn default_tag() -> ElementSelector {
    ElementSelector::tag("a").with_attr("rel", "tag")
}

fn default_time() -> ElementSelector {
    ElementSelector::tag("time").with_attr("class", "entry-time")
}

fn default_time_attribute() -> String {
    "datetime".to_string()
}

/// Regex filters applied to discovered link URLs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// If non-empty, a link must match at least one of these
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Links matching any of these are dropped; takes precedence over includes
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Http,
    WebDriver,
}

/// How pages are fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_transport_kind")]
    pub kind: TransportKind,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Seconds to wait for a readiness locator
    #[serde(default = "default_wait_time")]
    pub wait_time: u64,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: default_transport_kind(),
            webdriver_url: default_webdriver_url(),
            wait_time: default_wait_time(),
            headless: default_headless(),
            timeout: default_timeout(),
        }
    }
}

impl TransportConfig {
    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs(self.wait_time)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_transport_kind() -> TransportKind {
    TransportKind::Http
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_wait_time() -> u64 {
    10
}

fn default_headless() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

/// Full configuration of a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Origin relative hrefs are resolved against
    pub base_url: String,

    /// Listing URL template, e.g. `https://host/index.htm?page={page}`
    pub search_url: String,

    #[serde(default = "default_page_placeholder")]
    pub page_placeholder: String,

    #[serde(default = "default_keyword_placeholder")]
    pub keyword_placeholder: String,

    /// Each keyword yields its own walk when `search_url` has a keyword placeholder
    #[serde(default)]
    pub search_keywords: Vec<String>,

    /// Explicit listing templates; override keyword expansion when non-empty
    #[serde(default)]
    pub start_urls: Vec<String>,

    #[serde(default)]
    pub start_page: u32,

    #[serde(default)]
    pub max_num_pages: Option<u32>,

    /// Consecutive failed listing pages after which a walk is abandoned; 0 never gives up
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    #[serde(default)]
    pub max_num_articles: Option<usize>,

    /// Seconds to sleep between consecutive requests
    #[serde(default)]
    pub delay_between_requests: f64,

    #[serde(default = "default_print_every")]
    pub print_every: usize,

    /// Re-extract documents that already have an article on disk
    #[serde(default)]
    pub overwrite_existing: bool,

    pub listing: ListingSelectors,

    #[serde(default)]
    pub document: DocumentSelectors,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_link_filename")]
    pub link_filename: String,

    #[serde(default = "default_article_filename")]
    pub article_filename: String,
}

fn default_page_placeholder() -> String {
    "{page}".to_string()
}

fn default_keyword_placeholder() -> String {
    "{keyword}".to_string()
}

fn default_max_consecutive_failures() -> u32 {
    3
}

fn default_print_every() -> usize {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("workspace/datasets")
}

fn default_link_filename() -> String {
    "links.jsonl".to_string()
}

fn default_article_filename() -> String {
    "articles.jsonl".to_string()
}

impl HarvestConfig {
    /// Create a configuration with default values for everything but the site
    pub fn new(base_url: &str, search_url: &str, listing: ListingSelectors) -> Self {
        Self {
            base_url: base_url.to_string(),
            search_url: search_url.to_string(),
            page_placeholder: default_page_placeholder(),
            keyword_placeholder: default_keyword_placeholder(),
            search_keywords: Vec::new(),
            start_urls: Vec::new(),
            start_page: 0,
            max_num_pages: None,
            max_consecutive_failures: default_max_consecutive_failures(),
            max_num_articles: None,
            delay_between_requests: 0.0,
            print_every: default_print_every(),
            overwrite_existing: false,
            listing,
            document: DocumentSelectors::default(),
            filter: FilterConfig::default(),
            transport: TransportConfig::default(),
            output_dir: default_output_dir(),
            link_filename: default_link_filename(),
            article_filename: default_article_filename(),
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Pause between requests; negative, non-finite or overflowing values mean none
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_between_requests).unwrap_or(Duration::ZERO)
    }

    /// Listing templates still carrying the page placeholder, one per walk
    pub fn listing_templates(&self) -> Vec<String> {
        if !self.start_urls.is_empty() {
            return self.start_urls.clone();
        }
        if !self.keyword_placeholder.is_empty()
            && self.search_url.contains(&self.keyword_placeholder)
        {
            return self
                .search_keywords
                .iter()
                .map(|keyword| {
                    self.search_url
                        .replace(&self.keyword_placeholder, &crate::utils::encode_keyword(keyword))
                })
                .collect();
        }
        vec![self.search_url.clone()]
    }

    pub fn link_path(&self) -> PathBuf {
        self.output_dir.join(&self.link_filename)
    }

    pub fn article_path(&self) -> PathBuf {
        self.output_dir.join(&self.article_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ListingSelectors {
        ListingSelectors {
            container: ElementSelector::tag("table").with_attr("class", "documentList"),
            item: ElementSelector::tag("tr"),
            title: ElementSelector::tag("div").with_attr("class", "title"),
            readiness: None,
        }
    }

    #[test]
    fn test_selector_to_css() {
        assert_eq!(ElementSelector::tag("tr").to_css(), "tr");
        assert_eq!(
            ElementSelector::tag("table")
                .with_attr("class", "documentList")
                .to_css(),
            "table[class~=\"documentList\"]"
        );
        assert_eq!(
            ElementSelector::default().with_attr("id", "main").to_css(),
            "*[id=\"main\"]"
        );
        assert_eq!(
            ElementSelector::tag("a").with_attr("title", "say \"hi\"").to_css(),
            "a[title=\"say \\\"hi\\\"\"]"
        );
    }

    #[test]
    fn test_selector_compile_rejects_garbage() {
        let bad = ElementSelector::tag("div>>");
        assert!(matches!(
            bad.compile(),
            Err(ConfigError::InvalidSelector { .. })
        ));
        assert!(ElementSelector::tag("div").compile().is_ok());
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "base_url": "https://www.example.org",
            "search_url": "https://www.example.org/index.htm?page={page}",
            "listing": {
                "container": {"name": "table", "attrs": {"class": "documentList"}},
                "item": {"name": "tr"},
                "title": {"name": "div", "attrs": {"class": "title"}},
                "readiness": {"kind": "css", "value": "div.title"}
            },
            "transport": {"kind": "webdriver"}
        }"#;
        let config = HarvestConfig::from_json(json).unwrap();
        assert_eq!(config.start_page, 0);
        assert_eq!(config.page_placeholder, "{page}");
        assert_eq!(config.max_num_pages, None);
        assert_eq!(config.max_consecutive_failures, 3);
        assert_eq!(config.document.time_attribute, "datetime");
        assert_eq!(config.document.content.to_css(), "div[class~=\"entry-content\"]");
        assert_eq!(config.transport.kind, TransportKind::WebDriver);
        assert_eq!(config.transport.webdriver_url, "http://localhost:4444");
        assert_eq!(
            config.listing.readiness,
            Some(ReadinessLocator::css("div.title"))
        );
        assert_eq!(config.link_path(), PathBuf::from("workspace/datasets/links.jsonl"));
    }

    #[test]
    fn test_listing_templates() {
        let mut config = HarvestConfig::new(
            "https://example.org",
            "https://example.org/search?q={keyword}&p={page}",
            listing(),
        );
        config.search_keywords = vec!["monetary policy".to_string(), "inflation".to_string()];
        assert_eq!(
            config.listing_templates(),
            vec![
                "https://example.org/search?q=monetary+policy&p={page}",
                "https://example.org/search?q=inflation&p={page}",
            ]
        );

        config.start_urls = vec!["https://example.org/list/{page}".to_string()];
        assert_eq!(
            config.listing_templates(),
            vec!["https://example.org/list/{page}"]
        );

        let plain = HarvestConfig::new("https://example.org", "https://example.org/p/{page}", listing());
        assert_eq!(plain.listing_templates(), vec!["https://example.org/p/{page}"]);
    }

    #[test]
    fn test_delay() {
        let mut config = HarvestConfig::new("https://example.org", "x", listing());
        assert_eq!(config.delay(), Duration::ZERO);
        config.delay_between_requests = 1.5;
        assert_eq!(config.delay(), Duration::from_millis(1500));
        config.delay_between_requests = -3.0;
        assert_eq!(config.delay(), Duration::ZERO);
        config.delay_between_requests = 1e20;
        assert_eq!(config.delay(), Duration::ZERO);
        config.delay_between_requests = f64::NAN;
        assert_eq!(config.delay(), Duration::ZERO);
    }
}
