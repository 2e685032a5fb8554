//! Text normalization helpers shared by extractors and query helpers.

use crate::constants::pages::PRODUCT_PAGE_URL_BASE;
use crate::types::LocationId;

/// Normalize text for matching: strip diacritics, trim, and lowercase.
///
/// Product and location names on the catalog pages carry Czech diacritics;
/// normalizing both sides lets `"borsc"` match `"Boršč"`.
pub fn normalize_text(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        for lower in ch.to_lowercase() {
            normalized.push(strip_diacritic(lower));
        }
    }
    normalized
}

/// Check whether `needle` matches `haystack` after normalization.
///
/// `partial` switches between substring containment and exact equality; both
/// forms ignore case and diacritics.
pub fn match_strings(needle: &str, haystack: &str, partial: bool) -> bool {
    let needle = normalize_text(needle);
    let haystack = normalize_text(haystack);
    if partial {
        haystack.contains(&needle)
    } else {
        haystack == needle
    }
}

/// Build the product-listing page URL for a location id.
pub fn product_page_url(location_id: LocationId) -> String {
    format!("{PRODUCT_PAGE_URL_BASE}/{location_id}")
}

/// Map one lowercase character to its ASCII base letter.
///
/// Covers the Latin-1 and Latin-2 letters seen in the catalog's Czech and
/// Slovak product names; anything else passes through unchanged.
fn strip_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ą' => 'a',
        'č' | 'ç' | 'ć' => 'c',
        'ď' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ę' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ľ' | 'ĺ' | 'ł' => 'l',
        'ň' | 'ñ' | 'ń' => 'n',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ř' | 'ŕ' => 'r',
        'š' | 'ś' => 's',
        'ť' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_diacritics_and_case() {
        assert_eq!(normalize_text("Boršč 300 g"), "borsc 300 g");
        assert_eq!(normalize_text("  Bageta s trhaným vepřovým  "), "bageta s trhanym veprovym");
    }

    #[test]
    fn normalize_text_passes_plain_ascii_through() {
        assert_eq!(normalize_text("plain text 42"), "plain text 42");
    }

    #[test]
    fn match_strings_partial_and_exact_forms() {
        assert!(match_strings("borsc", "Boršč 300 g", true));
        assert!(!match_strings("borsc", "Boršč 300 g", false));
        assert!(match_strings("Boršč 300 g", "borsc 300 g", false));
        assert!(!match_strings("sendvic", "Boršč", true));
    }

    #[test]
    fn product_page_url_appends_the_location_id() {
        assert_eq!(
            product_page_url(296),
            "https://my.freshpoint.cz/device/product-list/296"
        );
    }
}
