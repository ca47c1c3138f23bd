use crate::config::DocumentSelectors;
use crate::error::{ConfigError, ExtractionError};
use crate::parsers::text::{self, TextOptions};
use crate::results::DocumentRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use scraper::{ElementRef, Html, Selector};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Output pattern: fractions are written as six digits, and only when non-zero
fn canonical_format(nanosecond: u32, with_offset: bool) -> &'static str {
    match (nanosecond / 1_000 == 0, with_offset) {
        (true, false) => "%Y-%m-%dT%H:%M:%S",
        (false, false) => "%Y-%m-%dT%H:%M:%S%.6f",
        (true, true) => "%Y-%m-%dT%H:%M:%S%:z",
        (false, true) => "%Y-%m-%dT%H:%M:%S%.6f%:z",
    }
}

/// Extracts body text, categories and publication time from a document page
#[derive(Debug)]
pub struct DocumentParser {
    content: Selector,
    metadata: Selector,
    paragraph: Selector,
    tag: Selector,
    time: Selector,
    time_attribute: String,
    text_options: TextOptions,
}

impl DocumentParser {
    pub fn new(selectors: &DocumentSelectors) -> Result<Self, ConfigError> {
        Ok(Self {
            content: selectors.content.compile()?,
            metadata: selectors.metadata.compile()?,
            paragraph: selectors.paragraph.compile()?,
            tag: selectors.tag.compile()?,
            time: selectors.time.compile()?,
            time_attribute: selectors.time_attribute.clone(),
            text_options: TextOptions {
                normalize_whitespace: selectors.normalize_whitespace,
            },
        })
    }

    /// Parses a document page.
    ///
    /// Both containers must be present, otherwise the result is
    /// [`ExtractionError::MissingContainer`]; no partial record is ever built.
    pub fn parse(&self, html: &str) -> Result<DocumentRecord, ExtractionError> {
        let doc = Html::parse_document(html);

        let content = doc
            .select(&self.content)
            .next()
            .ok_or(ExtractionError::MissingContainer {
                what: "content container",
            })?;
        let metadata = doc
            .select(&self.metadata)
            .next()
            .ok_or(ExtractionError::MissingContainer {
                what: "metadata container",
            })?;

        let published_at = self.extract_time(metadata)?;

        Ok(DocumentRecord {
            categories: self.extract_categories(metadata),
            published_at,
            text: self.extract_text(content),
        })
    }

    pub fn extract_text(&self, content: ElementRef<'_>) -> String {
        let paragraphs = content
            .select(&self.paragraph)
            .map(|p| text::paragraph_text(p, &self.text_options))
            .collect::<Vec<_>>();
        text::join_paragraphs(&paragraphs)
    }

    pub fn extract_categories(&self, metadata: ElementRef<'_>) -> Vec<String> {
        metadata
            .select(&self.tag)
            .map(text::element_text)
            .collect()
    }

    pub fn extract_time(&self, metadata: ElementRef<'_>) -> Result<String, ExtractionError> {
        let time = metadata
            .select(&self.time)
            .next()
            .ok_or(ExtractionError::MissingElement {
                what: "publication time",
            })?;
        let value = time.value().attr(&self.time_attribute).ok_or_else(|| {
            ExtractionError::MissingAttribute {
                element: "time",
                attribute: self.time_attribute.clone(),
            }
        })?;
        parse_timestamp(value)
    }
}

/// Parses an ISO-8601 timestamp and renders it in canonical form.
///
/// Offset-aware values come back as RFC 3339 with a `+HH:MM` offset, naive ones
/// as `YYYY-MM-DDTHH:MM:SS[.ffffff]`, and bare dates as midnight.
pub fn parse_timestamp(value: &str) -> Result<String, ExtractionError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.format(canonical_format(dt.nanosecond(), true)).to_string());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.format(canonical_format(dt.nanosecond(), true)).to_string());
        }
    }
    for format in [NAIVE_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.format(canonical_format(dt.nanosecond(), false)).to_string());
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(dt.format(canonical_format(0, false)).to_string());
    }

    Err(ExtractionError::InvalidTimestamp {
        value: value.to_string(),
    })
}
