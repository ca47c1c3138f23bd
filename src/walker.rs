use crate::config::{ListingSelectors, ReadinessLocator};
use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::error::{ConfigError, FetchError, HarvestError};
use crate::parsers::ListingParser;
use crate::results::LinkRecord;
use crate::transport::Fetcher;
use crate::utils;
use std::sync::Arc;
use url::Url;

/// What a single listing page produced
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was read; items without a usable title or anchor were dropped
    Links(Vec<LinkRecord>),

    /// The listing returned not-found: there are no more pages
    EndOfPagination,

    /// The page could not be fetched or its container was missing
    Failed(HarvestError),
}

impl PageOutcome {
    pub fn is_end(&self) -> bool {
        matches!(self, PageOutcome::EndOfPagination)
    }

    /// Records to accumulate; a failed page contributes none
    pub fn into_links(self) -> Vec<LinkRecord> {
        match self {
            PageOutcome::Links(links) => links,
            PageOutcome::EndOfPagination | PageOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Turns listing page indices into link records
pub struct PageWalker {
    fetcher: Arc<dyn Fetcher>,
    diagnostics: Arc<dyn Diagnostics>,
    parser: ListingParser,
    base: Url,
    template: String,
    page_placeholder: String,
    readiness: Option<ReadinessLocator>,
}

impl PageWalker {
    /// Create a walker over one listing template.
    ///
    /// * `base_url` - origin relative hrefs are resolved against
    /// * `template` - listing URL containing `page_placeholder`
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        diagnostics: Arc<dyn Diagnostics>,
        selectors: &ListingSelectors,
        base_url: &str,
        template: &str,
        page_placeholder: &str,
    ) -> Result<Self, ConfigError> {
        let base = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            fetcher,
            diagnostics,
            parser: ListingParser::new(selectors)?,
            base,
            template: template.to_string(),
            page_placeholder: page_placeholder.to_string(),
            readiness: selectors.readiness.clone(),
        })
    }

    pub fn page_url(&self, page_index: u32) -> String {
        utils::page_url(&self.template, &self.page_placeholder, page_index)
    }

    /// Fetches one listing page and extracts its link records.
    ///
    /// Never propagates an error: failures are recorded and returned as
    /// [`PageOutcome::Failed`], and a 404 ends pagination.
    pub async fn fetch_page(&self, page_index: u32) -> PageOutcome {
        let url = self.page_url(page_index);
        ::log::debug!("Fetching listing page {}: {}", page_index, url);

        match self.try_fetch_page(&url).await {
            Ok(Some(links)) => PageOutcome::Links(links),
            Ok(None) => {
                self.diagnostics
                    .record(DiagnosticEvent::PaginationEnded { url });
                PageOutcome::EndOfPagination
            }
            Err(error) => {
                self.diagnostics.record(DiagnosticEvent::PageFailed {
                    url,
                    error: error.to_string(),
                });
                PageOutcome::Failed(error)
            }
        }
    }

    async fn try_fetch_page(&self, url: &str) -> Result<Option<Vec<LinkRecord>>, HarvestError> {
        let response = self.fetcher.request(url, self.readiness.as_ref()).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            }
            .into());
        }

        let items = self.parser.parse(&response.body, &self.base)?;

        let mut links = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Ok(link) => {
                    self.diagnostics.record(DiagnosticEvent::LinkFound {
                        title: link.title.clone(),
                        url: link.url.clone(),
                    });
                    links.push(link);
                }
                Err(reason) => self.diagnostics.record(DiagnosticEvent::ItemSkipped {
                    page_url: url.to_string(),
                    index,
                    reason: reason.to_string(),
                }),
            }
        }

        ::log::info!("Found {} links in {}", links.len(), url);
        Ok(Some(links))
    }
}
