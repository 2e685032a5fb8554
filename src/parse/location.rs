//! Extraction of the location directory from the network landing page.
//!
//! The directory is embedded as a JavaScript string variable
//! (`devices = "[...]";`) whose payload is double-encoded JSON: an array
//! serialized into a JSON string literal. Each array entry wraps the actual
//! location fields in a `prop` object.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::admission::{LocationDraft, RawField};
use crate::constants::markup;
use crate::errors::PageTypeError;
use crate::model::LocationDirectory;
use crate::parse::{Extraction, PageExtractor};
use crate::types::ItemId;

/// Mines location records out of the directory landing page.
pub struct LocationPageExtractor {
    devices_pattern: Regex,
}

impl Default for LocationPageExtractor {
    fn default() -> Self {
        Self {
            devices_pattern: Regex::new(markup::DEVICES_PATTERN)
                .expect("markup pattern constant is valid"),
        }
    }
}

impl LocationPageExtractor {
    /// Locate and decode the double-encoded directory payload.
    fn load_payload(&self, raw: &str) -> Result<Vec<Value>, PageTypeError> {
        let Some(captures) = self.devices_pattern.captures(raw) else {
            return Err(PageTypeError::NotALocationPage(
                "the devices variable assignment was not matched".to_string(),
            ));
        };
        let literal = &captures[1];
        let inner: String = serde_json::from_str(literal).map_err(|error| {
            PageTypeError::NotALocationPage(format!(
                "the devices payload is not a JSON string literal: {error}"
            ))
        })?;
        serde_json::from_str(&inner).map_err(|error| {
            PageTypeError::NotALocationPage(format!(
                "the decoded devices payload is not a JSON array: {error}"
            ))
        })
    }
}

impl PageExtractor for LocationPageExtractor {
    type Snapshot = LocationDirectory;

    fn extract(
        &self,
        raw: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<Extraction<LocationDirectory>, PageTypeError> {
        let entries = self.load_payload(raw)?;

        let mut directory = LocationDirectory::new(recorded_at);
        let mut errors = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            let Some(props) = entry.get("prop").and_then(Value::as_object) else {
                warn!(index, "skipping device entry without a 'prop' object");
                errors.push(format!("skipping device entry #{index}: no 'prop' object"));
                continue;
            };
            let Some(id) = props.get("id").and_then(id_value) else {
                warn!(index, "skipping device entry without a numeric id");
                errors.push(format!("skipping device entry #{index}: no numeric 'id'"));
                continue;
            };
            let location = draft_location(props, id).admit(recorded_at);
            for (field, error) in location.meta.parsing_errors() {
                errors.push(format!("location id={id}: {field}: {error}"));
            }
            if directory.items.insert(id, location).is_some() {
                errors.push(format!("duplicate location id={id}; keeping the later entry"));
            }
        }

        Ok(Extraction {
            snapshot: directory,
            errors,
        })
    }

    fn empty(&self, recorded_at: DateTime<Utc>) -> LocationDirectory {
        LocationDirectory::new(recorded_at)
    }
}

/// All raw field slots for one directory entry.
///
/// The payload historically used short keys (`lat`, `active`); both the short
/// and the spelled-out aliases are accepted.
fn draft_location(props: &Map<String, Value>, id: ItemId) -> LocationDraft {
    LocationDraft {
        id: RawField::Value(id),
        name: string_field(props, &["username", "name"]),
        address: string_field(props, &["address"]),
        latitude: float_field(props, &["lat", "latitude"]),
        longitude: float_field(props, &["lon", "longitude"]),
        discount_rate: float_field(props, &["discount", "discountRate"]),
        is_active: bool_field(props, &["active", "isActive"]),
        is_suspended: bool_field(props, &["suspended", "isSuspended"]),
    }
}

/// Item id from a JSON value that may be a number or a numeric string.
fn id_value(value: &Value) -> Option<ItemId> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|id| ItemId::try_from(id).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// First present alias as a string slot; JSON null counts as absent.
fn string_field(props: &Map<String, Value>, aliases: &[&str]) -> RawField<String> {
    for alias in aliases {
        match props.get(*alias) {
            None => continue,
            Some(Value::String(text)) => return RawField::Value(text.trim().to_string()),
            Some(Value::Null) => return RawField::Missing,
            Some(other) => {
                return RawField::Invalid(format!("field '{alias}' is not a string (got {other})"))
            }
        }
    }
    RawField::Missing
}

/// First present alias as a float slot; numeric strings are accepted.
fn float_field(props: &Map<String, Value>, aliases: &[&str]) -> RawField<f64> {
    for alias in aliases {
        match props.get(*alias) {
            None => continue,
            Some(Value::Number(number)) => {
                return match number.as_f64() {
                    Some(value) => RawField::Value(value),
                    None => RawField::Invalid(format!("field '{alias}' overflows a float")),
                }
            }
            Some(Value::String(text)) => {
                return match text.trim().parse::<f64>() {
                    Ok(value) => RawField::Value(value),
                    Err(_) => {
                        RawField::Invalid(format!("field '{alias}' is not numeric (got '{text}')"))
                    }
                }
            }
            Some(Value::Null) => return RawField::Missing,
            Some(other) => {
                return RawField::Invalid(format!("field '{alias}' is not a number (got {other})"))
            }
        }
    }
    RawField::Missing
}

/// First present alias as a boolean slot; `0`/`1` numbers and strings are
/// accepted alongside JSON booleans.
fn bool_field(props: &Map<String, Value>, aliases: &[&str]) -> RawField<bool> {
    for alias in aliases {
        match props.get(*alias) {
            None => continue,
            Some(Value::Bool(flag)) => return RawField::Value(*flag),
            Some(Value::Number(number)) => {
                return match number.as_i64() {
                    Some(0) => RawField::Value(false),
                    Some(1) => RawField::Value(true),
                    _ => RawField::Invalid(format!("field '{alias}' is not a 0/1 flag")),
                }
            }
            Some(Value::String(text)) => {
                return match text.trim() {
                    "0" | "false" => RawField::Value(false),
                    "1" | "true" => RawField::Value(true),
                    other => RawField::Invalid(format!(
                        "field '{alias}' is not a boolean flag (got '{other}')"
                    )),
                }
            }
            Some(Value::Null) => return RawField::Missing,
            Some(other) => {
                return RawField::Invalid(format!("field '{alias}' is not a boolean (got {other})"))
            }
        }
    }
    RawField::Missing
}
