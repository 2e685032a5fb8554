#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Partial-failure admission of raw field values into records.
pub mod admission;
/// Directional quantity and price comparators.
pub mod compare;
/// Centralized constants: endpoints, markup markers, admission defaults.
pub mod constants;
/// Field-level and collection-level diff engines.
pub mod diff;
mod errors;
/// Content fingerprinting of raw page input.
pub mod hash;
/// Versioned record models and keyed snapshot collections.
pub mod model;
/// Fingerprint-gated parsing of catalog pages.
pub mod parse;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

pub use admission::{LocationDraft, ProductDefaults, ProductDraft, RawField};
pub use compare::{PriceTransition, QuantityTransition};
pub use diff::{
    field_diff, item_diff, DiffKind, DiffOptions, FieldDiff, FieldDiffMap, ItemDiff, ItemDiffMap,
};
pub use errors::{DiffError, PageTypeError};
pub use hash::ContentDigest;
pub use model::{Location, LocationDirectory, Product, ProductCatalog, RecordMeta, TimePrecision};
pub use parse::{
    parse_location_page, parse_product_page, Extraction, LocationPageExtractor,
    LocationPageParser, PageExtractor, ParseMetadata, ProductPageExtractor, ProductPageParser,
    SnapshotCache,
};
pub use types::{ErrorText, FieldName, ItemId, LocationId};
