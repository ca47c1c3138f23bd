pub mod document;
pub mod listing;
pub mod text;

#[cfg(test)]
mod tests;

pub use document::{DocumentParser, parse_timestamp};
pub use listing::{ItemResult, ListingParser};
