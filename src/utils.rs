use crate::error::ExtractionError;
use url::Url;

/// Encode a search keyword for a query string template
pub fn encode_keyword(keyword: &str) -> String {
    keyword.trim().replace(' ', "+")
}

/// Fill the page placeholder of a listing template
pub fn page_url(template: &str, placeholder: &str, page: u32) -> String {
    if placeholder.is_empty() {
        return template.to_string();
    }
    template.replace(placeholder, &page.to_string())
}

/// Resolve an anchor href against the base origin; absolute hrefs pass through
pub fn resolve_href(base: &Url, href: &str) -> Result<String, ExtractionError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(ExtractionError::MissingHref);
    }
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }
    base.join(href)
        .map(|u| u.to_string())
        .map_err(|e| ExtractionError::InvalidUrl {
            href: href.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keyword() {
        assert_eq!(encode_keyword("central bank"), "central+bank");
        assert_eq!(encode_keyword(" rates "), "rates");
    }

    #[test]
    fn test_page_url() {
        assert_eq!(
            page_url("https://example.org/index.htm?page={page}", "{page}", 3),
            "https://example.org/index.htm?page=3"
        );
        assert_eq!(page_url("https://example.org/", "", 3), "https://example.org/");
    }

    #[test]
    fn test_resolve_relative_href() {
        let base = Url::parse("https://www.example.org").unwrap();
        assert_eq!(
            resolve_href(&base, "/path/to/doc").unwrap(),
            "https://www.example.org/path/to/doc"
        );
        assert_eq!(
            resolve_href(&base, "/review/r230101a.htm").unwrap(),
            format!("{}{}", "https://www.example.org", "/review/r230101a.htm")
        );
    }

    #[test]
    fn test_resolve_absolute_href_passes_through() {
        let base = Url::parse("https://www.example.org").unwrap();
        assert_eq!(
            resolve_href(&base, "https://other.example.com/a/b.htm?x=1").unwrap(),
            "https://other.example.com/a/b.htm?x=1"
        );
        assert_eq!(
            resolve_href(&base, "https://other.example.com").unwrap(),
            "https://other.example.com"
        );
        assert_eq!(
            resolve_href(&base, "HTTPS://Other.Example.COM/Doc.htm").unwrap(),
            "HTTPS://Other.Example.COM/Doc.htm"
        );
        assert_eq!(
            resolve_href(&base, " https://x.org/a/../b.htm ").unwrap(),
            "https://x.org/a/../b.htm"
        );
    }

    #[test]
    fn test_resolve_empty_href() {
        let base = Url::parse("https://www.example.org").unwrap();
        assert_eq!(resolve_href(&base, "  "), Err(ExtractionError::MissingHref));
    }
}
