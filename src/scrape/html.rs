//! Turning rendered HTML into plain text.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text is never part of the page body.
const NOISE_TAGS: [&str; 6] = ["script", "style", "nav", "footer", "header", "noscript"];

/// Title, meta information and visible text of an HTML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDigest {
    pub title: String,
    pub description: Option<String>,
    /// First `<h1>` of the page
    pub headline: Option<String>,
    pub keywords: Option<String>,
    pub text: String,
}

/// Extract the title, meta information and visible text of `html`.
///
/// Navigation, headers, footers, scripts and styles are dropped and
/// whitespace is collapsed. Entities are decoded by the parser.
pub fn clean_html(html: &str) -> PageDigest {
    let document = Html::parse_document(html);

    let title = first_text(&document, "title")
        .or_else(|| meta_content(&document, r#"meta[property="og:title"]"#))
        .unwrap_or_default();
    let description = meta_content(&document, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&document, r#"meta[property="og:description"]"#));
    let headline = first_text(&document, "h1");
    let keywords = meta_content(&document, r#"meta[name="keywords"]"#);

    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    PageDigest {
        title,
        description,
        headline,
        keywords,
        text: visible_text(root),
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .map(|elem| compact_ws(&elem.text().collect::<Vec<_>>().join(" ")))
        .find(|text| !text.is_empty())
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .filter_map(|elem| elem.value().attr("content"))
        .map(compact_ws)
        .find(|text| !text.is_empty())
}

fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|elem| NOISE_TAGS.contains(&elem.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }
    compact_ws(&parts.join(" "))
}

fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
