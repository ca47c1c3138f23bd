use crate::config::{ElementSelector, ListingSelectors};
use crate::error::ExtractionError;
use crate::parsers::ListingParser;
use url::Url;

fn selectors() -> ListingSelectors {
    ListingSelectors {
        container: ElementSelector::tag("table").with_attr("class", "documentList"),
        item: ElementSelector::tag("tr"),
        title: ElementSelector::tag("div").with_attr("class", "title"),
        readiness: None,
    }
}

fn base() -> Url {
    Url::parse("https://www.example.org").unwrap()
}

fn row(title: &str, href: &str) -> String {
    format!(
        "<tr><td>01 May 2023</td><td><div class=\"item\"><div class=\"title\"><a href=\"{}\">{}</a></div></div></td></tr>",
        href, title
    )
}

fn listing(rows: &[String]) -> String {
    format!(
        "<html><body><div id=\"list\"><table class=\"documentList odd\"><thead><tr><th>Date</th><th>Title</th></tr></thead><tbody>{}</tbody></table></div></body></html>",
        rows.concat()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_in_document_order() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let html = listing(&[
            row("First speech", "/review/r1.htm"),
            row("Second speech", "/review/r2.htm"),
        ]);

        let items = parser.parse(&html, &base()).unwrap();
        let links = items.into_iter().filter_map(Result::ok).collect::<Vec<_>>();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title, "First speech");
        assert_eq!(links[0].url, "https://www.example.org/review/r1.htm");
        assert_eq!(links[1].title, "Second speech");
        assert_eq!(links[1].url, "https://www.example.org/review/r2.htm");
    }

    #[test]
    fn test_header_row_without_title_is_an_item_error() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let html = listing(&[row("Only speech", "/review/r1.htm")]);

        let items = parser.parse(&html, &base()).unwrap();

        // thead row + one data row
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Err(ExtractionError::MissingTitle));
        assert!(items[1].is_ok());
    }

    #[test]
    fn test_n_items_minus_k_untitled() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let untitled = "<tr><td><a href=\"/x.htm\">no title div</a></td></tr>".to_string();
        let blank = row("   ", "/blank.htm");
        let html = listing(&[
            row("A", "/a.htm"),
            untitled.clone(),
            row("B", "/b.htm"),
            blank,
            row("C", "/c.htm"),
            untitled,
        ]);

        let items = parser.parse(&html, &base()).unwrap();
        let titles = items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .map(|link| link.title.as_str())
            .collect::<Vec<_>>();

        assert_eq!(titles, vec!["A", "B", "C"]);
        let missing = items
            .iter()
            .filter(|item| matches!(item, Err(ExtractionError::MissingTitle)))
            .count();
        // thead row, two untitled rows, one blank title
        assert_eq!(missing, 4);
    }

    #[test]
    fn test_absolute_href_passes_through() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let html = listing(&[row("Elsewhere", "https://other.example.com/doc.pdf")]);

        let items = parser.parse(&html, &base()).unwrap();
        let link = items.into_iter().find_map(Result::ok).unwrap();

        assert_eq!(link.url, "https://other.example.com/doc.pdf");
    }

    #[test]
    fn test_missing_anchor_skips_only_that_item() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let no_anchor = "<tr><td><div class=\"title\">Orphan</div></td></tr>".to_string();
        let no_href = "<tr><td><div class=\"title\"><a name=\"x\">Nameless</a></div></td></tr>".to_string();
        let html = listing(&[no_anchor, row("Kept", "/kept.htm"), no_href]);

        let items = parser.parse(&html, &base()).unwrap();

        assert_eq!(items[1], Err(ExtractionError::MissingAnchor));
        assert_eq!(items[2].as_ref().unwrap().title, "Kept");
        assert_eq!(items[3], Err(ExtractionError::MissingHref));
    }

    #[test]
    fn test_title_text_is_trimmed_and_nested_text_joined() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let html = listing(&["<tr><td><div class=\"title\">\n  <a href=\"/n.htm\">Nested <em>title</em></a>\n</div></td></tr>".to_string()]);

        let items = parser.parse(&html, &base()).unwrap();
        let link = items.into_iter().find_map(Result::ok).unwrap();

        assert_eq!(link.title, "Nested title");
    }

    #[test]
    fn test_missing_container_fails_whole_page() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let html = "<html><body><table class=\"other\"><tr><td>x</td></tr></table></body></html>";

        assert_eq!(
            parser.parse(html, &base()),
            Err(ExtractionError::MissingContainer {
                what: "listing container"
            })
        );
    }

    #[test]
    fn test_empty_container_yields_no_items() {
        let parser = ListingParser::new(&selectors()).unwrap();
        let html = "<html><body><table class=\"documentList\"></table></body></html>";

        assert_eq!(parser.parse(html, &base()), Ok(Vec::new()));
    }
}
