use serde::{Deserialize, Serialize};

/// A document link discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Title text of the listing item
    pub title: String,

    /// Absolute URL of the document
    pub url: String,
}

impl LinkRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Body text and metadata extracted from one document page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Tag anchors of the metadata block, in document order
    pub categories: Vec<String>,

    /// Canonical ISO-8601 publication time
    #[serde(rename = "time")]
    pub published_at: String,

    /// Paragraph texts joined with newlines
    pub text: String,
}

/// A link together with where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredLink {
    #[serde(flatten)]
    pub link: LinkRecord,

    /// Listing page index
    pub page: u32,

    pub page_url: String,
}

impl DiscoveredLink {
    pub fn url(&self) -> &str {
        &self.link.url
    }
}

/// A discovered link merged with its extracted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(flatten)]
    pub link: DiscoveredLink,

    #[serde(flatten)]
    pub document: DocumentRecord,
}

impl Article {
    pub fn new(link: DiscoveredLink, document: DocumentRecord) -> Self {
        Self { link, document }
    }

    pub fn url(&self) -> &str {
        self.link.url()
    }
}

/// Records that can be deduplicated by URL
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for LinkRecord {
    fn key(&self) -> &str {
        &self.url
    }
}

impl Keyed for DiscoveredLink {
    fn key(&self) -> &str {
        self.url()
    }
}

impl Keyed for Article {
    fn key(&self) -> &str {
        self.url()
    }
}
