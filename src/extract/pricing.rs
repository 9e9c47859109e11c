//! Price mention extraction.

use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on the number of price mentions returned.
pub const MAX_PRICE_MATCHES: usize = 25;

// Symbol-prefixed amounts with an optional billing period, or amounts
// followed by a currency code/name.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        (?:
            (?:R\$|US\$|\$|€|£|¥)\s?\d{1,3}(?:[.,]\d{3})*(?:[.,]\d{1,2})?
            (?:\s?(?:/|per\s)\s?(?:month|mo|year|yr|user|seat|mês|mes|ano|usuário))?
        |
            \d{1,3}(?:[.,]\d{3})*(?:[.,]\d{1,2})?\s?(?:USD|EUR|BRL|GBP|reais|dollars|euros)\b
        )",
    )
    .expect("valid price pattern")
});

/// Extract the first [`MAX_PRICE_MATCHES`] price mentions in text order.
/// Scanning stops as soon as the cap is reached.
pub fn extract_pricing(text: &str) -> Vec<String> {
    PRICE_RE
        .find_iter(text)
        .take(MAX_PRICE_MATCHES)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
