use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::compare::DISCOUNT_RATE_SCALE;
use crate::diff::{field_diff, item_diff, DiffOptions, FieldDiffMap, ItemDiffMap};
use crate::errors::DiffError;
use crate::model::meta::{RecordMeta, TimePrecision};
use crate::types::{ItemId, LocationId};
use crate::utils::{match_strings, normalize_text, product_page_url};

/// One observed product listing on a location page.
///
/// Treated as immutable once admitted; diff and transition results stay valid
/// only as long as neither input is mutated afterward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Shared versioning metadata (observation time + admission ledger).
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Unique numeric identifier of the product.
    pub id: ItemId,
    /// Name of the product.
    pub name: String,
    /// Category of the product.
    pub category: String,
    /// Whether the product is vegetarian.
    pub is_vegetarian: bool,
    /// Whether the product is gluten-free.
    pub is_gluten_free: bool,
    /// Whether the product is being promoted.
    ///
    /// A promoted product is not guaranteed to carry a discount and vice
    /// versa; use [`Product::is_on_sale`] for the price-derived check.
    pub is_promo: bool,
    /// Quantity of product pieces in stock.
    pub quantity: u32,
    /// Full (undiscounted) price.
    pub price_full: f64,
    /// Current selling price.
    pub price_curr: f64,
    /// Free-form details such as ingredients or nutritional values.
    pub info: String,
    /// URL of the illustrative product picture.
    pub pic_url: String,
    /// Identifier of the location page the product was listed on.
    pub location_id: LocationId,
}

impl Product {
    /// Lowercase ASCII rendering of the product name.
    pub fn name_normalized(&self) -> String {
        normalize_text(&self.name)
    }

    /// Lowercase ASCII rendering of the product category.
    pub fn category_normalized(&self) -> String {
        normalize_text(&self.category)
    }

    /// Discount rate in `<0; 1>` derived from the two prices.
    ///
    /// Reports 0 for a zero full price and for an inconsistent record whose
    /// current price exceeds the full price, so the ratio is always well
    /// defined.
    pub fn discount_rate(&self) -> f64 {
        if self.price_full == 0.0 || self.price_full < self.price_curr {
            return 0.0;
        }
        let rate = (self.price_full - self.price_curr) / self.price_full;
        (rate * DISCOUNT_RATE_SCALE).round() / DISCOUNT_RATE_SCALE
    }

    /// Whether the current selling price undercuts the full price.
    pub fn is_on_sale(&self) -> bool {
        self.price_curr < self.price_full
    }

    /// Whether at least one piece is in stock.
    pub fn is_available(&self) -> bool {
        self.quantity != 0
    }

    /// Whether the stock is empty.
    pub fn is_sold_out(&self) -> bool {
        self.quantity == 0
    }

    /// Whether exactly one piece remains right now.
    ///
    /// This is the state form; the transition form (went from several pieces
    /// down to one) lives on [`crate::compare::QuantityTransition`].
    pub fn is_last_piece(&self) -> bool {
        self.quantity == 1
    }

    /// URL of the product page this product was listed on.
    pub fn page_url(&self) -> String {
        product_page_url(self.location_id)
    }

    /// Compare observation times with another product at the given precision.
    pub fn is_newer_than(&self, other: &Product, precision: TimePrecision) -> Option<bool> {
        self.meta.is_newer_than(&other.meta, precision)
    }

    /// Compare this product with another one field by field.
    ///
    /// Equal fields are omitted. `recorded_at` is excluded under the default
    /// [`DiffOptions`]; callers needing it pass an explicit override.
    pub fn diff(&self, other: &Product, options: &DiffOptions) -> Result<FieldDiffMap, DiffError> {
        field_diff(self, other, options)
    }
}

/// One parse's complete view of a location's product listing.
///
/// Items are keyed by product id in page order; an empty catalog is a valid,
/// meaningful state. Every query helper hands back independent clones, never
/// references into the stored map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalog {
    /// When the page behind this catalog was observed.
    pub recorded_at: DateTime<Utc>,
    /// Identifier of the location page (also known as the device id).
    pub location_id: LocationId,
    /// Display name of the location.
    pub location_name: String,
    /// Products on the page keyed by their unique id, in page order.
    pub items: IndexMap<ItemId, Product>,
}

impl ProductCatalog {
    /// Empty catalog observed at the given time.
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            location_id: 0,
            location_name: String::new(),
            items: IndexMap::new(),
        }
    }

    /// URL of the page this catalog was parsed from.
    pub fn page_url(&self) -> String {
        product_page_url(self.location_id)
    }

    /// Lowercase ASCII rendering of the location name.
    pub fn location_name_normalized(&self) -> String {
        normalize_text(&self.location_name)
    }

    /// Independent copies of the products in page order.
    pub fn item_list(&self) -> Vec<Product> {
        self.items.values().cloned().collect()
    }

    /// IDs of the listed products in page order.
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    /// Number of products on the page.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Product names in page order.
    pub fn item_names(&self) -> Vec<String> {
        self.items.values().map(|product| product.name.clone()).collect()
    }

    /// Unique product categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for product in self.items.values() {
            if !seen.contains(&product.category) {
                seen.push(product.category.clone());
            }
        }
        seen
    }

    /// Independent copy of the product with the given id.
    pub fn item_by_id(&self, id: ItemId) -> Option<Product> {
        self.items.get(&id).cloned()
    }

    /// First product matching a predicate, as an independent copy.
    pub fn find_item<F>(&self, predicate: F) -> Option<Product>
    where
        F: Fn(&Product) -> bool,
    {
        self.items.values().find(|product| predicate(product)).cloned()
    }

    /// Every product matching a predicate, as independent copies.
    pub fn find_items<F>(&self, predicate: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        self.items
            .values()
            .filter(|product| predicate(product))
            .cloned()
            .collect()
    }

    /// First product whose name matches, ignoring case and diacritics.
    pub fn find_item_by_name(&self, name: &str, partial: bool) -> Option<Product> {
        self.find_item(|product| match_strings(name, &product.name, partial))
    }

    /// Every product whose name matches, ignoring case and diacritics.
    pub fn find_items_by_name(&self, name: &str, partial: bool) -> Vec<Product> {
        self.find_items(|product| match_strings(name, &product.name, partial))
    }

    /// Reconcile this catalog's items with another observation's.
    ///
    /// Items are matched by id; the result maps each differing id to its
    /// created/updated/deleted classification with a field-level breakdown.
    pub fn item_diff(
        &self,
        other: &ProductCatalog,
        options: &DiffOptions,
    ) -> Result<ItemDiffMap, DiffError> {
        item_diff(&self.items, &other.items, options)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(id: ItemId, name: &str, quantity: u32, full: f64, curr: f64) -> Product {
        Product {
            meta: RecordMeta::new(Utc::now()),
            id,
            name: name.to_string(),
            category: "Sendviče".to_string(),
            is_vegetarian: false,
            is_gluten_free: false,
            is_promo: false,
            quantity,
            price_full: full,
            price_curr: curr,
            info: String::new(),
            pic_url: String::new(),
            location_id: 296,
        }
    }

    #[test]
    fn discount_rate_is_zero_for_zero_full_price() {
        let free = product(1, "Voda", 3, 0.0, 15.0);
        assert_eq!(free.discount_rate(), 0.0);
    }

    #[test]
    fn discount_rate_is_zero_for_inconsistent_prices() {
        let odd = product(1, "Voda", 3, 10.0, 12.0);
        assert_eq!(odd.discount_rate(), 0.0);
    }

    #[test]
    fn discount_rate_rounds_to_two_decimals() {
        let third_off = product(1, "Bageta", 3, 30.0, 20.0);
        assert_eq!(third_off.discount_rate(), 0.33);
        let half_off = product(2, "Bageta", 3, 10.0, 5.0);
        assert_eq!(half_off.discount_rate(), 0.5);
    }

    #[test]
    fn stock_state_predicates() {
        assert!(product(1, "a", 0, 1.0, 1.0).is_sold_out());
        assert!(!product(1, "a", 0, 1.0, 1.0).is_available());
        assert!(product(1, "a", 1, 1.0, 1.0).is_last_piece());
        assert!(product(1, "a", 2, 1.0, 1.0).is_available());
        assert!(!product(1, "a", 2, 1.0, 1.0).is_last_piece());
    }

    #[test]
    fn sale_predicate_follows_the_prices() {
        assert!(product(1, "a", 1, 10.0, 8.0).is_on_sale());
        assert!(!product(1, "a", 1, 10.0, 10.0).is_on_sale());
    }

    #[test]
    fn queries_return_independent_copies() {
        let mut catalog = ProductCatalog::new(Utc::now());
        catalog.items.insert(1, product(1, "Boršč 300 g", 2, 49.9, 49.9));

        let mut copy = catalog.item_by_id(1).unwrap();
        copy.quantity = 0;
        assert_eq!(catalog.items[&1].quantity, 2);
    }

    #[test]
    fn name_search_ignores_case_and_diacritics() {
        let mut catalog = ProductCatalog::new(Utc::now());
        catalog.items.insert(1, product(1, "Boršč 300 g", 2, 49.9, 49.9));
        catalog.items.insert(2, product(2, "Bageta šunka", 1, 59.9, 59.9));

        assert_eq!(catalog.find_item_by_name("borsc", true).map(|p| p.id), Some(1));
        assert_eq!(catalog.find_item_by_name("BORSC 300 G", false).map(|p| p.id), Some(1));
        assert!(catalog.find_item_by_name("borsc", false).is_none());
        assert_eq!(catalog.find_items_by_name("b", true).len(), 2);
    }

    #[test]
    fn categories_are_unique_in_first_seen_order() {
        let mut catalog = ProductCatalog::new(Utc::now());
        let mut dessert = product(3, "Dort", 1, 39.9, 39.9);
        dessert.category = "Dezerty".to_string();
        catalog.items.insert(1, product(1, "Bageta", 1, 59.9, 59.9));
        catalog.items.insert(2, product(2, "Sendvič", 1, 49.9, 49.9));
        catalog.items.insert(3, dessert);

        assert_eq!(catalog.categories(), vec!["Sendviče", "Dezerty"]);
        assert_eq!(catalog.item_count(), 3);
        assert_eq!(catalog.item_ids(), vec![1, 2, 3]);
    }
}
