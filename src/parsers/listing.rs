use crate::config::{ElementSelector, ListingSelectors};
use crate::error::{ConfigError, ExtractionError};
use crate::parsers::text;
use crate::results::LinkRecord;
use crate::utils::resolve_href;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Outcome for one listing item; errors only drop that item
pub type ItemResult = Result<LinkRecord, ExtractionError>;

/// Extracts link records from a listing page
#[derive(Debug)]
pub struct ListingParser {
    container: Selector,
    item: Selector,
    title: Selector,
    anchor: Selector,
}

impl ListingParser {
    pub fn new(selectors: &ListingSelectors) -> Result<Self, ConfigError> {
        Ok(Self {
            container: selectors.container.compile()?,
            item: selectors.item.compile()?,
            title: selectors.title.compile()?,
            anchor: ElementSelector::tag("a").compile()?,
        })
    }

    /// Parses a listing page into one result per item, in document order.
    ///
    /// Fails as a whole only when the container is missing.
    pub fn parse(&self, html: &str, base: &Url) -> Result<Vec<ItemResult>, ExtractionError> {
        let doc = Html::parse_document(html);

        let container = doc
            .select(&self.container)
            .next()
            .ok_or(ExtractionError::MissingContainer {
                what: "listing container",
            })?;

        let items = container
            .select(&self.item)
            .map(|item| self.parse_item(item, base))
            .collect::<Vec<_>>();

        ::log::debug!("Listing parser found {} items", items.len());
        Ok(items)
    }

    fn parse_item(&self, item: ElementRef<'_>, base: &Url) -> ItemResult {
        let title_node = item
            .select(&self.title)
            .next()
            .ok_or(ExtractionError::MissingTitle)?;
        let title = text::element_text(title_node).trim().to_string();
        if title.is_empty() {
            return Err(ExtractionError::MissingTitle);
        }

        let anchor = item
            .select(&self.anchor)
            .next()
            .ok_or(ExtractionError::MissingAnchor)?;
        let href = anchor
            .value()
            .attr("href")
            .ok_or(ExtractionError::MissingHref)?;

        let url = resolve_href(base, href)?;
        Ok(LinkRecord { title, url })
    }
}
