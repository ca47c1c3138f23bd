use std::fmt;
use std::sync::Mutex;

/// Something worth reporting while walking listings or extracting documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// The listing returned not-found; pagination is over
    PaginationEnded { url: String },

    /// A listing item was dropped; the rest of the page is unaffected
    ItemSkipped {
        page_url: String,
        index: usize,
        reason: String,
    },

    /// A listing page yielded a link
    LinkFound { title: String, url: String },

    /// A listing page could not be fetched or parsed
    PageFailed { url: String, error: String },

    /// Too many listing pages failed in a row; the walk stopped at `url`
    WalkAbandoned { url: String, failures: u32 },

    /// A document lacked its content or metadata container
    DocumentSkipped { url: String, reason: String },

    /// A document could not be fetched or its fields could not be extracted
    DocumentFailed { url: String, error: String },

    DocumentExtracted { url: String },
}

impl DiagnosticEvent {
    pub fn level(&self) -> log::Level {
        match self {
            DiagnosticEvent::PageFailed { .. }
            | DiagnosticEvent::WalkAbandoned { .. }
            | DiagnosticEvent::DocumentFailed { .. } => log::Level::Error,
            DiagnosticEvent::PaginationEnded { .. }
            | DiagnosticEvent::ItemSkipped { .. }
            | DiagnosticEvent::DocumentSkipped { .. } => log::Level::Info,
            DiagnosticEvent::LinkFound { .. } | DiagnosticEvent::DocumentExtracted { .. } => {
                log::Level::Debug
            }
        }
    }

    /// URL of the page or document the event concerns
    pub fn url(&self) -> &str {
        match self {
            DiagnosticEvent::PaginationEnded { url }
            | DiagnosticEvent::LinkFound { url, .. }
            | DiagnosticEvent::PageFailed { url, .. }
            | DiagnosticEvent::WalkAbandoned { url, .. }
            | DiagnosticEvent::DocumentSkipped { url, .. }
            | DiagnosticEvent::DocumentFailed { url, .. }
            | DiagnosticEvent::DocumentExtracted { url } => url,
            DiagnosticEvent::ItemSkipped { page_url, .. } => page_url,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.level() == log::Level::Error
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticEvent::PaginationEnded { url } => {
                write!(f, "Page [{}] does not exist, stopping", url)
            }
            DiagnosticEvent::ItemSkipped {
                page_url,
                index,
                reason,
            } => write!(f, "Skipping item {} on {}: {}", index, page_url, reason),
            DiagnosticEvent::LinkFound { title, url } => write!(f, "Found [{}]({})", title, url),
            DiagnosticEvent::PageFailed { url, error } => {
                write!(f, "Error while fetching the page url {}: {}", url, error)
            }
            DiagnosticEvent::WalkAbandoned { url, failures } => write!(
                f,
                "Giving up after {} consecutive failed pages, last was {}",
                failures, url
            ),
            DiagnosticEvent::DocumentSkipped { url, reason } => {
                write!(f, "No record for {}: {}", url, reason)
            }
            DiagnosticEvent::DocumentFailed { url, error } => {
                write!(f, "Error while scraping the document url {}: {}", url, error)
            }
            DiagnosticEvent::DocumentExtracted { url } => write!(f, "Extracted {}", url),
        }
    }
}

/// Sink for component diagnostics
pub trait Diagnostics: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Forwards every event to the `log` facade at the event's level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        ::log::log!(event.level(), "{}", event);
    }
}

/// Keeps events in memory, in the order they were recorded
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn failures(&self) -> Vec<DiagnosticEvent> {
        self.events().into_iter().filter(|e| e.is_failure()).collect()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let failed = DiagnosticEvent::DocumentFailed {
            url: "https://example.org/d".to_string(),
            error: "boom".to_string(),
        };
        assert_eq!(failed.level(), log::Level::Error);
        assert!(failed.is_failure());
        assert_eq!(failed.url(), "https://example.org/d");

        let skipped = DiagnosticEvent::ItemSkipped {
            page_url: "https://example.org/p/0".to_string(),
            index: 0,
            reason: "item has no title".to_string(),
        };
        assert_eq!(skipped.level(), log::Level::Info);
        assert_eq!(skipped.url(), "https://example.org/p/0");
        assert_eq!(
            skipped.to_string(),
            "Skipping item 0 on https://example.org/p/0: item has no title"
        );
    }

    #[test]
    fn test_memory_keeps_order() {
        let sink = MemoryDiagnostics::new();
        sink.record(DiagnosticEvent::DocumentExtracted {
            url: "a".to_string(),
        });
        sink.record(DiagnosticEvent::PageFailed {
            url: "b".to_string(),
            error: "HTTP 500".to_string(),
        });
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].url(), "a");
        assert_eq!(sink.failures().len(), 1);
        assert_eq!(sink.failures()[0].url(), "b");
    }
}
