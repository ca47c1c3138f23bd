use crate::config::FilterConfig;
use regex::Regex;
use std::collections::HashSet;

/// Why a discovered link was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Excluded,
    NotIncluded,
    AlreadyKnown,
}

/// Decides which discovered links enter the link dataset.
///
/// Applies regex include/exclude patterns, then drops URLs that are already known
/// from earlier runs or earlier pages of this run.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
    known: HashSet<String>,
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: &FilterConfig) -> Result<Self, regex::Error> {
        // Compile regex patterns
        let mut include_regexes = Vec::with_capacity(config.include_patterns.len());
        for pattern in &config.include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            include_regexes,
            exclude_regexes,
            known: HashSet::new(),
        })
    }

    /// Seed with URLs that are already in the dataset
    pub fn with_known<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Check the patterns only; exclusions take precedence
    pub fn matches(&self, url: &str) -> Result<(), Rejection> {
        if self.exclude_regexes.iter().any(|regex| regex.is_match(url)) {
            return Err(Rejection::Excluded);
        }

        // If include patterns are specified, at least one must match
        if !self.include_regexes.is_empty()
            && !self.include_regexes.iter().any(|regex| regex.is_match(url))
        {
            return Err(Rejection::NotIncluded);
        }

        Ok(())
    }

    /// Admit a URL, remembering it so later duplicates are rejected
    pub fn admit(&mut self, url: &str) -> Result<(), Rejection> {
        self.matches(url)?;
        if !self.known.insert(url.to_string()) {
            return Err(Rejection::AlreadyKnown);
        }
        Ok(())
    }

    pub fn is_known(&self, url: &str) -> bool {
        self.known.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_admits_each_url_once() {
        let mut filter = LinkFilter::default();
        assert_eq!(filter.admit("https://example.org/a"), Ok(()));
        assert_eq!(filter.admit("https://example.org/b"), Ok(()));
        assert_eq!(
            filter.admit("https://example.org/a"),
            Err(Rejection::AlreadyKnown)
        );
        assert!(filter.is_known("https://example.org/b"));
    }

    #[test]
    fn test_known_urls_are_rejected() {
        let mut filter = LinkFilter::default().with_known(vec!["https://example.org/old"]);
        assert_eq!(
            filter.admit("https://example.org/old"),
            Err(Rejection::AlreadyKnown)
        );
        assert_eq!(filter.admit("https://example.org/new"), Ok(()));
    }

    #[test]
    fn test_patterns() {
        let config = FilterConfig {
            include_patterns: vec![r"/review/".to_string()],
            exclude_patterns: vec![r"\.pdf$".to_string()],
        };
        let mut filter = LinkFilter::new(&config).unwrap();

        assert_eq!(filter.admit("https://example.org/review/r1.htm"), Ok(()));
        assert_eq!(
            filter.admit("https://example.org/review/r1.pdf"),
            Err(Rejection::Excluded)
        );
        assert_eq!(
            filter.admit("https://example.org/about.htm"),
            Err(Rejection::NotIncluded)
        );
        // rejected links are not remembered
        assert!(!filter.is_known("https://example.org/about.htm"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = FilterConfig {
            include_patterns: vec!["(".to_string()],
            exclude_patterns: Vec::new(),
        };
        assert!(LinkFilter::new(&config).is_err());
    }
}
