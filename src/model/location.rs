use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::pages::LOCATION_PAGE_URL;
use crate::diff::{field_diff, item_diff, DiffOptions, FieldDiffMap, ItemDiffMap};
use crate::errors::DiffError;
use crate::model::meta::RecordMeta;
use crate::types::ItemId;
use crate::utils::{match_strings, normalize_text};

/// One observed vending location from the network directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Shared versioning metadata (observation time + admission ledger).
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Unique numeric identifier of the location.
    pub id: ItemId,
    /// Name of the location.
    pub name: String,
    /// Street address of the location.
    pub address: String,
    /// Latitude of the location.
    pub latitude: f64,
    /// Longitude of the location.
    pub longitude: f64,
    /// Discount rate applied at the location.
    pub discount_rate: f64,
    /// Whether the location is active.
    pub is_active: bool,
    /// Whether the location is suspended.
    pub is_suspended: bool,
}

impl Location {
    /// Lowercase ASCII rendering of the location name.
    pub fn name_normalized(&self) -> String {
        normalize_text(&self.name)
    }

    /// Lowercase ASCII rendering of the location address.
    pub fn address_normalized(&self) -> String {
        normalize_text(&self.address)
    }

    /// Coordinates of the location as a `(latitude, longitude)` pair.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Compare this location with another one field by field.
    pub fn diff(&self, other: &Location, options: &DiffOptions) -> Result<FieldDiffMap, DiffError> {
        field_diff(self, other, options)
    }
}

/// One parse's complete view of the network's location directory.
///
/// Same ownership rules as the product catalog: items are keyed by id, an
/// empty directory is valid, and every query helper returns independent
/// clones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationDirectory {
    /// When the page behind this directory was observed.
    pub recorded_at: DateTime<Utc>,
    /// Locations keyed by their unique id, in page order.
    pub items: IndexMap<ItemId, Location>,
}

impl LocationDirectory {
    /// Empty directory observed at the given time.
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            items: IndexMap::new(),
        }
    }

    /// URL of the directory page.
    pub fn page_url(&self) -> &'static str {
        LOCATION_PAGE_URL
    }

    /// Independent copies of the locations in page order.
    pub fn item_list(&self) -> Vec<Location> {
        self.items.values().cloned().collect()
    }

    /// IDs of the listed locations in page order.
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    /// Number of locations in the directory.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Location names in page order.
    pub fn item_names(&self) -> Vec<String> {
        self.items.values().map(|location| location.name.clone()).collect()
    }

    /// Independent copy of the location with the given id.
    pub fn item_by_id(&self, id: ItemId) -> Option<Location> {
        self.items.get(&id).cloned()
    }

    /// First location matching a predicate, as an independent copy.
    pub fn find_item<F>(&self, predicate: F) -> Option<Location>
    where
        F: Fn(&Location) -> bool,
    {
        self.items.values().find(|location| predicate(location)).cloned()
    }

    /// Every location matching a predicate, as independent copies.
    pub fn find_items<F>(&self, predicate: F) -> Vec<Location>
    where
        F: Fn(&Location) -> bool,
    {
        self.items
            .values()
            .filter(|location| predicate(location))
            .cloned()
            .collect()
    }

    /// First location whose name matches, ignoring case and diacritics.
    pub fn find_item_by_name(&self, name: &str, partial: bool) -> Option<Location> {
        self.find_item(|location| match_strings(name, &location.name, partial))
    }

    /// Every location whose name matches, ignoring case and diacritics.
    pub fn find_items_by_name(&self, name: &str, partial: bool) -> Vec<Location> {
        self.find_items(|location| match_strings(name, &location.name, partial))
    }

    /// Reconcile this directory's items with another observation's.
    pub fn item_diff(
        &self,
        other: &LocationDirectory,
        options: &DiffOptions,
    ) -> Result<ItemDiffMap, DiffError> {
        item_diff(&self.items, &other.items, options)
    }
}
