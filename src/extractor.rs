use crate::config::DocumentSelectors;
use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::error::{ConfigError, ExtractionError, FetchError, HarvestError};
use crate::parsers::DocumentParser;
use crate::results::DocumentRecord;
use crate::transport::Fetcher;
use std::sync::Arc;

/// What a single document fetch produced
#[derive(Debug)]
pub enum DocumentOutcome {
    Extracted(DocumentRecord),

    /// The content or metadata container was absent
    Missing(ExtractionError),

    /// Fetching failed, or a field could not be extracted
    Failed(HarvestError),
}

impl DocumentOutcome {
    pub fn into_record(self) -> Option<DocumentRecord> {
        match self {
            DocumentOutcome::Extracted(record) => Some(record),
            DocumentOutcome::Missing(_) | DocumentOutcome::Failed(_) => None,
        }
    }
}

/// Turns document URLs into optional records.
///
/// Holds no per-call state, so calls may run concurrently.
pub struct DocumentExtractor {
    fetcher: Arc<dyn Fetcher>,
    diagnostics: Arc<dyn Diagnostics>,
    parser: DocumentParser,
}

impl DocumentExtractor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        diagnostics: Arc<dyn Diagnostics>,
        selectors: &DocumentSelectors,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            fetcher,
            diagnostics,
            parser: DocumentParser::new(selectors)?,
        })
    }

    /// Fetches and extracts one document, recording any failure
    pub async fn extract(&self, url: &str) -> DocumentOutcome {
        let outcome = match self.try_extract(url).await {
            Ok(record) => DocumentOutcome::Extracted(record),
            Err(HarvestError::Extraction(e)) if e.is_missing_container() => {
                DocumentOutcome::Missing(e)
            }
            Err(e) => DocumentOutcome::Failed(e),
        };

        let event = match &outcome {
            DocumentOutcome::Extracted(_) => DiagnosticEvent::DocumentExtracted {
                url: url.to_string(),
            },
            DocumentOutcome::Missing(reason) => DiagnosticEvent::DocumentSkipped {
                url: url.to_string(),
                reason: reason.to_string(),
            },
            DocumentOutcome::Failed(error) => DiagnosticEvent::DocumentFailed {
                url: url.to_string(),
                error: error.to_string(),
            },
        };
        self.diagnostics.record(event);

        outcome
    }

    /// Like [`extract`](Self::extract), collapsed to the record alone
    pub async fn fetch_document(&self, url: &str) -> Option<DocumentRecord> {
        self.extract(url).await.into_record()
    }

    async fn try_extract(&self, url: &str) -> Result<DocumentRecord, HarvestError> {
        let response = self.fetcher.request(url, None).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            }
            .into());
        }
        Ok(self.parser.parse(&response.body)?)
    }
}
