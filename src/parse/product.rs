//! Extraction of product listings from per-location product pages.
//!
//! Each product is one `div.product` element: identity and flags live in
//! `data-*` attributes, quantity and price in localized text spans, the
//! category in the section heading next to the products, the page identity
//! in an embedded `deviceId` script variable plus the document title.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::admission::{ProductDefaults, ProductDraft, RawField};
use crate::constants::markup;
use crate::errors::PageTypeError;
use crate::model::ProductCatalog;
use crate::parse::{Extraction, PageExtractor};
use crate::types::{ItemId, LocationId};
use crate::utils::normalize_text;

/// Mines product records out of a product listing page.
pub struct ProductPageExtractor {
    defaults: ProductDefaults,
    product_selector: Selector,
    span_selector: Selector,
    heading_selector: Selector,
    title_selector: Selector,
    script_selector: Selector,
    quantity_pattern: Regex,
    price_pattern: Regex,
    device_id_pattern: Regex,
}

impl Default for ProductPageExtractor {
    fn default() -> Self {
        Self::new(ProductDefaults::default())
    }
}

impl ProductPageExtractor {
    /// Extractor with explicit construction-time defaults.
    pub fn new(defaults: ProductDefaults) -> Self {
        Self {
            defaults,
            product_selector: parse_selector(markup::PRODUCT_SELECTOR),
            span_selector: parse_selector("span"),
            heading_selector: parse_selector("h2"),
            title_selector: parse_selector("title"),
            script_selector: parse_selector("script"),
            quantity_pattern: parse_pattern(markup::QUANTITY_PATTERN),
            price_pattern: parse_pattern(markup::PRICE_PATTERN),
            device_id_pattern: parse_pattern(markup::DEVICE_ID_PATTERN),
        }
    }

    /// Page id from the embedded `deviceId` script variable.
    fn find_location_id(&self, document: &Html) -> Option<LocationId> {
        for script in document.select(&self.script_selector) {
            let text = script.text().collect::<String>();
            if let Some(captures) = self.device_id_pattern.captures(&text) {
                if let Ok(id) = captures[1].trim().parse::<LocationId>() {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Location name from the document title (the part before `|`).
    fn find_location_name(&self, document: &Html) -> Option<String> {
        let title = document.select(&self.title_selector).next()?;
        let text = title.text().collect::<String>();
        let name = text.split('|').next().unwrap_or_default().trim().to_string();
        (!name.is_empty()).then_some(name)
    }

    /// Stock quantity from the localized quantity span.
    ///
    /// Sold-out products carry a marker class and usually no quantity span at
    /// all; a single remaining piece is announced with a word instead of a
    /// number.
    fn find_quantity(&self, element: ElementRef<'_>) -> RawField<u32> {
        if element.value().classes().any(|class| class == markup::SOLD_OUT_CLASS) {
            return RawField::Value(0);
        }
        let mut texts = element.select(&self.span_selector).filter_map(|span| {
            let text = normalize_text(&span_text(span));
            self.quantity_pattern.is_match(&text).then_some(text)
        });
        let Some(text) = texts.next() else {
            return RawField::Value(0);
        };
        if texts.next().is_some() {
            return RawField::Invalid("more than one quantity span was matched".to_string());
        }
        if text.contains(markup::LAST_PIECE_MARKER) {
            return RawField::Value(1);
        }
        match text.split_whitespace().next().map(str::parse::<u32>) {
            Some(Ok(quantity)) => RawField::Value(quantity),
            _ => RawField::Invalid(format!("quantity text '{text}' is not numeric")),
        }
    }

    /// Full and current price from the price spans.
    ///
    /// One span means no discount (both prices equal); two spans are full
    /// then current.
    fn find_prices(&self, element: ElementRef<'_>) -> (RawField<f64>, RawField<f64>) {
        let prices: Vec<f64> = element
            .select(&self.span_selector)
            .filter_map(|span| {
                let text = normalize_text(&span_text(span));
                if self.price_pattern.is_match(&text) {
                    text.parse::<f64>().ok()
                } else {
                    None
                }
            })
            .collect();
        match prices.as_slice() {
            [full] => (RawField::Value(*full), RawField::Value(*full)),
            [full, curr] if curr > full => (
                RawField::Value(*full),
                RawField::Invalid(format!(
                    "current price '{curr}' is greater than the full price '{full}'"
                )),
            ),
            [full, curr] => (RawField::Value(*full), RawField::Value(*curr)),
            other => {
                let reason = format!("expected one or two price spans, found {}", other.len());
                (RawField::Invalid(reason.clone()), RawField::Invalid(reason))
            }
        }
    }

    /// Category from the heading of the section the product sits in.
    fn find_category(&self, element: ElementRef<'_>) -> RawField<String> {
        let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
            return RawField::Invalid("product has no parent element".to_string());
        };
        let mut headings = parent.select(&self.heading_selector).filter_map(|heading| {
            let text = heading.text().collect::<String>().trim().to_string();
            (!text.is_empty()).then_some(text)
        });
        let Some(heading) = headings.next() else {
            return RawField::Invalid("category heading not found".to_string());
        };
        if headings.next().is_some() {
            return RawField::Invalid("more than one category heading was found".to_string());
        }
        RawField::Value(heading)
    }

    /// All raw field slots for one product element.
    fn draft_product(
        &self,
        element: ElementRef<'_>,
        id: ItemId,
        location_id: LocationId,
    ) -> ProductDraft {
        let (price_full, price_curr) = self.find_prices(element);
        ProductDraft {
            id: RawField::Value(id),
            name: attr_field(element, markup::ATTR_NAME),
            category: self.find_category(element),
            is_vegetarian: flag_field(element, markup::ATTR_VEGETARIAN),
            is_gluten_free: flag_field(element, markup::ATTR_GLUTEN_FREE),
            is_promo: flag_field(element, markup::ATTR_PROMO),
            quantity: self.find_quantity(element),
            price_full,
            price_curr,
            info: info_field(element),
            pic_url: attr_field(element, markup::ATTR_PIC_URL),
            location_id: RawField::Value(location_id),
        }
    }
}

impl PageExtractor for ProductPageExtractor {
    type Snapshot = ProductCatalog;

    fn extract(
        &self,
        raw: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<Extraction<ProductCatalog>, PageTypeError> {
        let document = Html::parse_document(raw);
        let mut errors = Vec::new();

        let products: Vec<ElementRef<'_>> = document.select(&self.product_selector).collect();
        let location_id = self.find_location_id(&document);
        if products.is_empty() && location_id.is_none() {
            return Err(PageTypeError::NotAProductPage);
        }

        let mut catalog = ProductCatalog::new(recorded_at);
        match location_id {
            Some(id) => catalog.location_id = id,
            None => errors.push(
                "page id not found (no script with a deviceId assignment)".to_string(),
            ),
        }
        match self.find_location_name(&document) {
            Some(name) => catalog.location_name = name,
            None => errors.push("location name not found (missing document title)".to_string()),
        }

        for element in products {
            let id = element
                .value()
                .attr(markup::ATTR_ID)
                .and_then(|value| value.trim().parse::<ItemId>().ok());
            let Some(id) = id else {
                warn!("skipping product record without a parsable id");
                errors.push(format!(
                    "skipping product without a parsable '{}' attribute",
                    markup::ATTR_ID
                ));
                continue;
            };
            let product = self
                .draft_product(element, id, catalog.location_id)
                .admit(recorded_at, &self.defaults);
            for (field, error) in product.meta.parsing_errors() {
                errors.push(format!("product id={id}: {field}: {error}"));
            }
            if catalog.items.insert(id, product).is_some() {
                errors.push(format!("duplicate product id={id}; keeping the later entry"));
            }
        }

        Ok(Extraction {
            snapshot: catalog,
            errors,
        })
    }

    fn empty(&self, recorded_at: DateTime<Utc>) -> ProductCatalog {
        ProductCatalog::new(recorded_at)
    }
}

/// Concatenated text of one element.
fn span_text(span: ElementRef<'_>) -> String {
    span.text().collect()
}

/// Attribute value as a raw field slot; a missing attribute is a recorded
/// failure, not a silent default.
fn attr_field(element: ElementRef<'_>, attr: &str) -> RawField<String> {
    match element.value().attr(attr) {
        Some(value) => RawField::Value(value.trim().to_string()),
        None => RawField::Invalid(format!("attribute '{attr}' is missing")),
    }
}

/// Flag attribute (`"1"` means set) as a raw field slot.
fn flag_field(element: ElementRef<'_>, attr: &str) -> RawField<bool> {
    match element.value().attr(attr) {
        Some(value) => RawField::Value(value.trim() == "1"),
        None => RawField::Invalid(format!("attribute '{attr}' is missing")),
    }
}

/// Details block as a raw field slot, with line-break markers cleaned out.
fn info_field(element: ElementRef<'_>) -> RawField<String> {
    match element.value().attr(markup::ATTR_INFO) {
        Some(text) => RawField::Value(clean_info_text(text)),
        None => RawField::Invalid(format!("attribute '{}' is missing", markup::ATTR_INFO)),
    }
}

/// Drop trailing `<br />` markers and blank lines from the details block.
fn clean_info_text(text: &str) -> String {
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let line = line.trim_end();
        let line = line.strip_suffix("<br />").unwrap_or(line);
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// Compile a selector that is a crate constant.
fn parse_selector(selector: &str) -> Selector {
    Selector::parse(selector).expect("markup selector constant is valid")
}

/// Compile a pattern that is a crate constant.
fn parse_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("markup pattern constant is valid")
}
