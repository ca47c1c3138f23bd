pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod harvest;
pub mod parsers;
pub mod results;
pub mod store;
pub mod transport;
pub mod utils;
pub mod walker;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, MemoryDiagnostics};
pub use error::{ConfigError, ExtractionError, FetchError, HarvestError};
pub use extractor::{DocumentExtractor, DocumentOutcome};
pub use harvest::{HarvestSummary, Harvester};
pub use results::{Article, DiscoveredLink, DocumentRecord, LinkRecord};
pub use transport::{Fetcher, Response};
pub use walker::{PageOutcome, PageWalker};
