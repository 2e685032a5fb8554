//! Partial-failure admission of raw field values into versioned records.
//!
//! Extraction hands over one value-or-error slot per field; admission
//! resolves every slot exactly once, defaulting failed fields and recording
//! each failure in the record's ledger instead of propagating it. One bad
//! field never blocks the rest of a record, and one bad record never blocks
//! the rest of a page.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::constants::admission::DEFAULT_PRODUCT_PIC_URL;
use crate::model::{Location, Product, RecordMeta};
use crate::types::{ErrorText, FieldName, ItemId, LocationId};

/// One raw field value as delivered by extraction.
///
/// Each slot resolves exactly once during admission: a valid value is set, an
/// invalid one is defaulted with a ledger entry, and a missing one takes the
/// declared default silently.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawField<T> {
    /// The field was not present in the input; the declared default applies
    /// without a ledger entry.
    #[default]
    Missing,
    /// A value was extracted and awaits validation.
    Value(T),
    /// Extraction failed for this field; the description lands in the ledger.
    Invalid(String),
}

impl<T> RawField<T> {
    /// Resolve this slot into its final value.
    ///
    /// An invalid slot, or a value rejected by `validate`, falls back to
    /// `default` and records `Error: {reason}` under the field name.
    fn resolve<V>(
        self,
        field: &'static str,
        default: T,
        validate: V,
        ledger: &mut IndexMap<FieldName, ErrorText>,
    ) -> T
    where
        V: FnOnce(&T) -> Result<(), String>,
    {
        match self {
            RawField::Missing => default,
            RawField::Value(value) => match validate(&value) {
                Ok(()) => value,
                Err(reason) => {
                    ledger.insert(field.to_string(), format!("Error: {reason}"));
                    default
                }
            },
            RawField::Invalid(reason) => {
                ledger.insert(field.to_string(), format!("Error: {reason}"));
                default
            }
        }
    }
}

/// Validation that accepts every value; used for fields whose type already
/// rules out bad states.
fn accept<T>(_: &T) -> Result<(), String> {
    Ok(())
}

/// Range validation shared by both price fields.
fn valid_price(price: &f64) -> Result<(), String> {
    if !price.is_finite() {
        return Err(format!("price '{price}' is not a finite number"));
    }
    if *price < 0.0 {
        return Err(format!("price '{price}' is negative"));
    }
    Ok(())
}

/// Range validation for coordinate and rate fields.
fn valid_float(value: &f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("value '{value}' is not a finite number"))
    }
}

/// Construction-time defaults that are configuration rather than type
/// defaults, passed explicitly so admission stays deterministic and testable.
#[derive(Clone, Debug)]
pub struct ProductDefaults {
    /// Picture URL applied when a product carries no photo of its own.
    pub pic_url: String,
}

impl Default for ProductDefaults {
    fn default() -> Self {
        Self {
            pic_url: DEFAULT_PRODUCT_PIC_URL.to_string(),
        }
    }
}

/// Raw field slots for one product record.
#[derive(Clone, Debug, Default)]
pub struct ProductDraft {
    /// Unique product identifier.
    pub id: RawField<ItemId>,
    /// Product name.
    pub name: RawField<String>,
    /// Product category.
    pub category: RawField<String>,
    /// Vegetarian flag.
    pub is_vegetarian: RawField<bool>,
    /// Gluten-free flag.
    pub is_gluten_free: RawField<bool>,
    /// Promotion flag.
    pub is_promo: RawField<bool>,
    /// Pieces in stock.
    pub quantity: RawField<u32>,
    /// Full (undiscounted) price.
    pub price_full: RawField<f64>,
    /// Current selling price.
    pub price_curr: RawField<f64>,
    /// Free-form details block.
    pub info: RawField<String>,
    /// Picture URL.
    pub pic_url: RawField<String>,
    /// Identifier of the hosting location page.
    pub location_id: RawField<LocationId>,
}

impl ProductDraft {
    /// Admit the draft into a product record.
    ///
    /// Every slot resolves exactly once; failed slots take their declared
    /// default and leave an entry in the record's ledger, which is frozen
    /// from here on. When exactly one of the two prices was supplied with a
    /// value, the other mirrors it.
    pub fn admit(mut self, recorded_at: DateTime<Utc>, defaults: &ProductDefaults) -> Product {
        match (&self.price_full, &self.price_curr) {
            (RawField::Value(_), RawField::Missing) => self.price_curr = self.price_full.clone(),
            (RawField::Missing, RawField::Value(_)) => self.price_full = self.price_curr.clone(),
            _ => {}
        }

        let mut ledger = IndexMap::new();
        let id = self.id.resolve("id", 0, accept, &mut ledger);
        let name = self.name.resolve("name", String::new(), accept, &mut ledger);
        let category = self.category.resolve("category", String::new(), accept, &mut ledger);
        let is_vegetarian = self.is_vegetarian.resolve("is_vegetarian", false, accept, &mut ledger);
        let is_gluten_free =
            self.is_gluten_free.resolve("is_gluten_free", false, accept, &mut ledger);
        let is_promo = self.is_promo.resolve("is_promo", false, accept, &mut ledger);
        let quantity = self.quantity.resolve("quantity", 0, accept, &mut ledger);
        let price_full = self.price_full.resolve("price_full", 0.0, valid_price, &mut ledger);
        let price_curr = self.price_curr.resolve("price_curr", 0.0, valid_price, &mut ledger);
        let info = self.info.resolve("info", String::new(), accept, &mut ledger);
        let pic_url = self
            .pic_url
            .resolve("pic_url", defaults.pic_url.clone(), accept, &mut ledger);
        let location_id = self.location_id.resolve("location_id", 0, accept, &mut ledger);

        Product {
            meta: RecordMeta::with_errors(recorded_at, ledger),
            id,
            name,
            category,
            is_vegetarian,
            is_gluten_free,
            is_promo,
            quantity,
            price_full,
            price_curr,
            info,
            pic_url,
            location_id,
        }
    }
}

/// Raw field slots for one location record.
#[derive(Clone, Debug, Default)]
pub struct LocationDraft {
    /// Unique location identifier.
    pub id: RawField<ItemId>,
    /// Location name.
    pub name: RawField<String>,
    /// Street address.
    pub address: RawField<String>,
    /// Latitude.
    pub latitude: RawField<f64>,
    /// Longitude.
    pub longitude: RawField<f64>,
    /// Discount rate applied at the location.
    pub discount_rate: RawField<f64>,
    /// Active flag; defaults to true.
    pub is_active: RawField<bool>,
    /// Suspended flag.
    pub is_suspended: RawField<bool>,
}

impl LocationDraft {
    /// Admit the draft into a location record, same rules as
    /// [`ProductDraft::admit`].
    pub fn admit(self, recorded_at: DateTime<Utc>) -> Location {
        let mut ledger = IndexMap::new();
        let id = self.id.resolve("id", 0, accept, &mut ledger);
        let name = self.name.resolve("name", String::new(), accept, &mut ledger);
        let address = self.address.resolve("address", String::new(), accept, &mut ledger);
        let latitude = self.latitude.resolve("latitude", 0.0, valid_float, &mut ledger);
        let longitude = self.longitude.resolve("longitude", 0.0, valid_float, &mut ledger);
        let discount_rate =
            self.discount_rate.resolve("discount_rate", 0.0, valid_float, &mut ledger);
        let is_active = self.is_active.resolve("is_active", true, accept, &mut ledger);
        let is_suspended = self.is_suspended.resolve("is_suspended", false, accept, &mut ledger);

        Location {
            meta: RecordMeta::with_errors(recorded_at, ledger),
            id,
            name,
            address,
            latitude,
            longitude,
            discount_rate,
            is_active,
            is_suspended,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn all_valid_slots_admit_with_an_empty_ledger() {
        let draft = ProductDraft {
            id: RawField::Value(1480),
            name: RawField::Value("Bageta šunka".to_string()),
            category: RawField::Value("Sendviče".to_string()),
            is_vegetarian: RawField::Value(false),
            is_gluten_free: RawField::Value(false),
            is_promo: RawField::Value(true),
            quantity: RawField::Value(4),
            price_full: RawField::Value(59.9),
            price_curr: RawField::Value(49.9),
            info: RawField::Value("Obsahuje lepek".to_string()),
            pic_url: RawField::Value("https://example.test/bageta.jpg".to_string()),
            location_id: RawField::Value(296),
        };
        let product = draft.admit(Utc::now(), &ProductDefaults::default());
        assert!(!product.meta.has_parsing_errors());
        assert_eq!(product.id, 1480);
        assert_eq!(product.quantity, 4);
        assert_eq!(product.price_curr, 49.9);
        assert!(product.is_promo);
    }

    #[test]
    fn invalid_slot_defaults_the_field_and_records_the_failure() {
        let draft = ProductDraft {
            name: RawField::Invalid("bad".to_string()),
            quantity: RawField::Value(5),
            ..ProductDraft::default()
        };
        let product = draft.admit(Utc::now(), &ProductDefaults::default());
        assert_eq!(product.name, "");
        assert_eq!(product.quantity, 5);
        assert_eq!(product.meta.parsing_errors().len(), 1);
        assert_eq!(
            product.meta.parsing_errors().get("name").map(String::as_str),
            Some("Error: bad")
        );
    }

    #[test]
    fn every_slot_failing_still_admits_a_record() {
        macro_rules! reason {
            () => {
                RawField::Invalid("unreadable".to_string())
            };
        }
        let draft = ProductDraft {
            id: reason!(),
            name: reason!(),
            category: reason!(),
            is_vegetarian: reason!(),
            is_gluten_free: reason!(),
            is_promo: reason!(),
            quantity: reason!(),
            price_full: reason!(),
            price_curr: reason!(),
            info: reason!(),
            pic_url: reason!(),
            location_id: reason!(),
        };
        let product = draft.admit(Utc::now(), &ProductDefaults::default());
        assert_eq!(product.meta.parsing_errors().len(), 12);
        assert_eq!(product.id, 0);
        assert_eq!(product.quantity, 0);
        assert_eq!(product.price_full, 0.0);
        // the configured default still applies to a failed slot
        assert_eq!(product.pic_url, ProductDefaults::default().pic_url);
    }

    #[test]
    fn missing_slots_default_silently() {
        let product = ProductDraft::default().admit(Utc::now(), &ProductDefaults::default());
        assert!(!product.meta.has_parsing_errors());
        assert_eq!(product.name, "");
        assert_eq!(product.pic_url, DEFAULT_PRODUCT_PIC_URL);
    }

    #[test]
    fn a_single_supplied_price_stands_in_for_both() {
        let full_only = ProductDraft {
            price_full: RawField::Value(42.5),
            ..ProductDraft::default()
        };
        let product = full_only.admit(Utc::now(), &ProductDefaults::default());
        assert_eq!(product.price_full, 42.5);
        assert_eq!(product.price_curr, 42.5);

        let curr_only = ProductDraft {
            price_curr: RawField::Value(19.9),
            ..ProductDraft::default()
        };
        let product = curr_only.admit(Utc::now(), &ProductDefaults::default());
        assert_eq!(product.price_full, 19.9);
        assert_eq!(product.price_curr, 19.9);
    }

    #[test]
    fn a_failed_price_is_not_mirrored() {
        let draft = ProductDraft {
            price_full: RawField::Value(42.5),
            price_curr: RawField::Invalid("garbled".to_string()),
            ..ProductDraft::default()
        };
        let product = draft.admit(Utc::now(), &ProductDefaults::default());
        assert_eq!(product.price_full, 42.5);
        assert_eq!(product.price_curr, 0.0);
        assert!(product.meta.parsing_errors().contains_key("price_curr"));
    }

    #[test]
    fn out_of_range_values_funnel_through_the_same_channel() {
        let draft = ProductDraft {
            price_full: RawField::Value(f64::NAN),
            price_curr: RawField::Value(-3.0),
            ..ProductDraft::default()
        };
        let product = draft.admit(Utc::now(), &ProductDefaults::default());
        assert_eq!(product.price_full, 0.0);
        assert_eq!(product.price_curr, 0.0);
        assert_eq!(product.meta.parsing_errors().len(), 2);
        assert!(product
            .meta
            .parsing_errors()
            .get("price_curr")
            .is_some_and(|error| error.contains("negative")));
    }

    #[test]
    fn location_defaults_follow_the_declared_values() {
        let location = LocationDraft::default().admit(Utc::now());
        assert!(location.is_active);
        assert!(!location.is_suspended);
        assert_eq!(location.latitude, 0.0);
        assert!(!location.meta.has_parsing_errors());
    }

    #[test]
    fn location_failures_are_recorded_per_field() {
        let draft = LocationDraft {
            id: RawField::Value(296),
            name: RawField::Invalid("not a string".to_string()),
            latitude: RawField::Value(f64::INFINITY),
            ..LocationDraft::default()
        };
        let location = draft.admit(Utc::now());
        assert_eq!(location.id, 296);
        assert_eq!(location.name, "");
        assert_eq!(location.latitude, 0.0);
        assert_eq!(location.meta.parsing_errors().len(), 2);
        assert!(location.meta.parsing_errors().contains_key("latitude"));
    }
}
