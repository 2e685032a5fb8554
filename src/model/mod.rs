//! Versioned record models and keyed snapshot collections.

mod location;
mod meta;
mod product;

pub use location::{Location, LocationDirectory};
pub use meta::{RecordMeta, TimePrecision};
pub use product::{Product, ProductCatalog};
