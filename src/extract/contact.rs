//! Phone number and URL extraction.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Optional country code, area code, then a 3-5 digit block and a 4 digit block.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{2,3}\)|\d{2,3})[\s.-]?\d{3,5}[\s.-]\d{4}\b")
        .expect("valid phone pattern")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]{}]+"#).expect("valid url pattern"));

/// Contact details found in a text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phones: Vec<String>,
    pub urls: Vec<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty() && self.urls.is_empty()
    }

    /// Phones then URLs, joined with `"; "`. `None` when nothing was found.
    pub fn joined(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let all: Vec<&str> = self
            .phones
            .iter()
            .chain(self.urls.iter())
            .map(String::as_str)
            .collect();
        Some(all.join("; "))
    }
}

/// Extract telephone numbers and absolute URLs, in order of first occurrence.
/// Repeated matches are reported once.
pub fn extract_contacts(text: &str) -> ContactInfo {
    let phones = dedup(PHONE_RE.find_iter(text).map(|m| m.as_str().trim().to_string()));
    let urls = dedup(
        URL_RE
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']).to_string()),
    );

    ContactInfo { phones, urls }
}

fn dedup(matches: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for m in matches {
        if !m.is_empty() && !seen.contains(&m) {
            seen.push(m);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_formats() {
        let text = "Call (11) 98765-4321 or +1 555-123-4567, fax 555.987.6543.";
        let info = extract_contacts(text);
        assert_eq!(
            info.phones,
            vec!["(11) 98765-4321", "+1 555-123-4567", "555.987.6543"]
        );
    }

    #[test]
    fn test_years_are_not_phones() {
        let info = extract_contacts("Founded 2019, results for 2023-2024.");
        assert!(info.phones.is_empty());
    }

    #[test]
    fn test_urls_in_order_without_trailing_punctuation() {
        let text = "Docs at https://acme.io/docs. Blog: http://blog.acme.io, again https://acme.io/docs";
        let info = extract_contacts(text);
        assert_eq!(info.urls, vec!["https://acme.io/docs", "http://blog.acme.io"]);
    }

    #[test]
    fn test_deterministic() {
        let text = "Reach us at (21) 3333-4444 or https://example.com/contact!";
        assert_eq!(extract_contacts(text), extract_contacts(text));
    }

    #[test]
    fn test_joined() {
        assert_eq!(ContactInfo::default().joined(), None);

        let info = extract_contacts("(11) 4002-8922 https://acme.io");
        assert_eq!(info.joined().as_deref(), Some("(11) 4002-8922; https://acme.io"));
    }
}
