/// Unique numeric identifier of a catalog item (product or location).
/// Example: `1480`
pub type ItemId = u32;
/// Unique numeric identifier of a location page (also known as the page id
/// or the device id).
/// Example: `296`
pub type LocationId = u32;
/// Name of a serialized record field as seen by the diff engine.
/// Examples: `quantity`, `price_curr`, `recordedAt` (aliased form)
pub type FieldName = String;
/// Human-readable error text recorded in ledgers and parse metadata.
/// Example: `Error: attribute 'data-name' is missing`
pub type ErrorText = String;
