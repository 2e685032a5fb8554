//! Field-level and collection-level diff engines.
//!
//! Both engines compare the serde serialization of their operands, so any two
//! values serialized through the same field-naming rules can be diffed. The
//! engines never mutate their inputs and produce sparse output: a field or
//! item that is equal on both sides yields no entry.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DiffError;
use crate::types::{FieldName, ItemId};

/// Field name dropped by [`DiffOptions::exclude_recorded_at`].
const RECORDED_AT_FIELD: &str = "recorded_at";

/// Classification of one detected difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    /// Present only on the right side.
    Created,
    /// Present on both sides with different values.
    Updated,
    /// Present only on the left side.
    Deleted,
}

/// One differing field with the value seen on each side.
///
/// The absent side of a `Created`/`Deleted` entry is JSON null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// What kind of difference this is.
    pub kind: DiffKind,
    /// Value on the left side.
    pub left: Value,
    /// Value on the right side.
    pub right: Value,
}

/// Differing fields keyed by serialized field name.
pub type FieldDiffMap = BTreeMap<FieldName, FieldDiff>;

/// One differing item with its field-level breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDiff {
    /// What happened to the item as a whole.
    pub kind: DiffKind,
    /// Field-level differences behind the classification.
    ///
    /// For `Created`/`Deleted` this is the full field list diffed against an
    /// absent placeholder, so every field is reported.
    pub fields: FieldDiffMap,
}

/// Differing items keyed by item id.
pub type ItemDiffMap = BTreeMap<ItemId, ItemDiff>;

/// Options controlling how operands are serialized before comparison.
#[derive(Clone, Copy, Debug)]
pub struct DiffOptions {
    /// Drop `recorded_at` before comparing. On by default: observation
    /// timestamps almost always differ and would dominate every diff.
    pub exclude_recorded_at: bool,
    /// Rename fields to their camelCase wire aliases, consistently on both
    /// sides.
    pub by_alias: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            exclude_recorded_at: true,
            by_alias: false,
        }
    }
}

/// Compare two records field by field.
///
/// A field present only in `left` is reported Deleted, present only in
/// `right` Created, present in both with unequal serialized values Updated.
/// Equality is the serialized value's native equality; there is no epsilon
/// comparison, so independently derived floats may surface as spurious
/// updates when rounding differs.
///
/// # Errors
///
/// Serializing an operand to anything but a named-field record is caller
/// misuse and returns [`DiffError`]; it is never reported as a data-level
/// diff entry.
pub fn field_diff<L, R>(left: &L, right: &R, options: &DiffOptions) -> Result<FieldDiffMap, DiffError>
where
    L: Serialize,
    R: Serialize,
{
    let left_fields = record_fields(left, options)?;
    let right_fields = record_fields(right, options)?;
    Ok(diff_field_maps(&left_fields, &right_fields))
}

/// Reconcile two ID-keyed collections into created, updated, and deleted
/// items.
///
/// Items are matched by key. A pair with zero differing fields yields no
/// entry, so comparing a collection with itself (or two empties) returns an
/// empty map; one empty side yields all-Created or all-Deleted. For one-sided
/// items the field breakdown is computed against an absent placeholder.
///
/// # Errors
///
/// Same contract-error rules as [`field_diff`].
pub fn item_diff<T>(
    left: &IndexMap<ItemId, T>,
    right: &IndexMap<ItemId, T>,
    options: &DiffOptions,
) -> Result<ItemDiffMap, DiffError>
where
    T: Serialize,
{
    let absent = Map::new();
    let mut diff = ItemDiffMap::new();
    for (id, left_item) in left {
        let left_fields = record_fields(left_item, options)?;
        match right.get(id) {
            Some(right_item) => {
                let fields = diff_field_maps(&left_fields, &record_fields(right_item, options)?);
                if !fields.is_empty() {
                    diff.insert(
                        *id,
                        ItemDiff {
                            kind: DiffKind::Updated,
                            fields,
                        },
                    );
                }
            }
            None => {
                diff.insert(
                    *id,
                    ItemDiff {
                        kind: DiffKind::Deleted,
                        fields: diff_field_maps(&left_fields, &absent),
                    },
                );
            }
        }
    }
    for (id, right_item) in right {
        if !left.contains_key(id) {
            diff.insert(
                *id,
                ItemDiff {
                    kind: DiffKind::Created,
                    fields: diff_field_maps(&absent, &record_fields(right_item, options)?),
                },
            );
        }
    }
    Ok(diff)
}

/// Serialize one operand to its named-field map under the given options.
fn record_fields<T>(record: &T, options: &DiffOptions) -> Result<Map<String, Value>, DiffError>
where
    T: Serialize,
{
    let value = serde_json::to_value(record)?;
    let mut fields = match value {
        Value::Object(map) => map,
        other => {
            return Err(DiffError::NotARecord {
                got: json_kind(&other),
            })
        }
    };
    if options.exclude_recorded_at {
        fields.remove(RECORDED_AT_FIELD);
    }
    if options.by_alias {
        fields = fields
            .into_iter()
            .map(|(name, value)| (to_camel(&name), value))
            .collect();
    }
    Ok(fields)
}

/// Core map-vs-map comparison shared by both engines.
fn diff_field_maps(left: &Map<String, Value>, right: &Map<String, Value>) -> FieldDiffMap {
    let mut diff = FieldDiffMap::new();
    for (field, left_value) in left {
        match right.get(field) {
            Some(right_value) => {
                if left_value != right_value {
                    diff.insert(
                        field.clone(),
                        FieldDiff {
                            kind: DiffKind::Updated,
                            left: left_value.clone(),
                            right: right_value.clone(),
                        },
                    );
                }
            }
            None => {
                diff.insert(
                    field.clone(),
                    FieldDiff {
                        kind: DiffKind::Deleted,
                        left: left_value.clone(),
                        right: Value::Null,
                    },
                );
            }
        }
    }
    for (field, right_value) in right {
        if !left.contains_key(field) {
            diff.insert(
                field.clone(),
                FieldDiff {
                    kind: DiffKind::Created,
                    left: Value::Null,
                    right: right_value.clone(),
                },
            );
        }
    }
    diff
}

/// Short description of a JSON value's shape, for contract errors.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Convert a snake_case field name to its camelCase wire alias.
fn to_camel(name: &str) -> String {
    let mut aliased = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            aliased.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            aliased.push(ch);
        }
    }
    aliased
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Stamped {
        recorded_at: chrono::DateTime<Utc>,
        quantity: u32,
        price_curr: f64,
    }

    #[derive(Serialize)]
    struct StampedWide {
        recorded_at: chrono::DateTime<Utc>,
        quantity: u32,
        price_curr: f64,
        note: String,
    }

    fn stamped(quantity: u32, price_curr: f64) -> Stamped {
        Stamped {
            recorded_at: Utc::now(),
            quantity,
            price_curr,
        }
    }

    #[test]
    fn equal_records_yield_an_empty_diff() {
        let diff = field_diff(&stamped(5, 49.9), &stamped(5, 49.9), &DiffOptions::default()).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn recorded_at_is_excluded_by_default_and_included_on_request() {
        use chrono::TimeZone;

        let mut left = stamped(5, 49.9);
        let mut right = stamped(5, 49.9);
        left.recorded_at = Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap();
        right.recorded_at = Utc.with_ymd_and_hms(2025, 3, 14, 20, 0, 0).unwrap();

        let default = field_diff(&left, &right, &DiffOptions::default()).unwrap();
        assert!(default.is_empty());

        let options = DiffOptions {
            exclude_recorded_at: false,
            ..DiffOptions::default()
        };
        let full = field_diff(&left, &right, &options).unwrap();
        assert_eq!(full.len(), 1);
        assert_eq!(full["recorded_at"].kind, DiffKind::Updated);
    }

    #[test]
    fn changed_field_is_reported_updated_with_both_values() {
        let diff = field_diff(&stamped(5, 49.9), &stamped(2, 49.9), &DiffOptions::default()).unwrap();
        assert_eq!(diff.len(), 1);
        let entry = &diff["quantity"];
        assert_eq!(entry.kind, DiffKind::Updated);
        assert_eq!(entry.left, serde_json::json!(5));
        assert_eq!(entry.right, serde_json::json!(2));
    }

    #[test]
    fn one_sided_fields_report_created_and_deleted_with_null_gaps() {
        let narrow = stamped(5, 49.9);
        let wide = StampedWide {
            recorded_at: Utc::now(),
            quantity: 5,
            price_curr: 49.9,
            note: "akce".to_string(),
        };

        let grown = field_diff(&narrow, &wide, &DiffOptions::default()).unwrap();
        assert_eq!(grown["note"].kind, DiffKind::Created);
        assert_eq!(grown["note"].left, Value::Null);
        assert_eq!(grown["note"].right, serde_json::json!("akce"));

        let shrunk = field_diff(&wide, &narrow, &DiffOptions::default()).unwrap();
        assert_eq!(shrunk["note"].kind, DiffKind::Deleted);
        assert_eq!(shrunk["note"].right, Value::Null);
    }

    #[test]
    fn aliasing_renames_fields_on_both_sides() {
        let options = DiffOptions {
            by_alias: true,
            ..DiffOptions::default()
        };
        let diff = field_diff(&stamped(5, 49.9), &stamped(5, 39.9), &options).unwrap();
        assert_eq!(diff.len(), 1);
        assert!(diff.contains_key("priceCurr"));
        assert!(!diff.contains_key("price_curr"));
    }

    #[test]
    fn non_record_operands_are_a_contract_error() {
        let result = field_diff(&42u32, &stamped(1, 1.0), &DiffOptions::default());
        assert!(matches!(result, Err(DiffError::NotARecord { got: "a number" })));
    }

    #[test]
    fn to_camel_handles_plain_and_compound_names() {
        assert_eq!(to_camel("quantity"), "quantity");
        assert_eq!(to_camel("price_curr"), "priceCurr");
        assert_eq!(to_camel("is_gluten_free"), "isGlutenFree");
        assert_eq!(to_camel("recorded_at"), "recordedAt");
    }

    #[test]
    fn item_diff_classifies_created_updated_deleted() {
        let mut left: IndexMap<ItemId, Stamped> = IndexMap::new();
        left.insert(1, stamped(5, 49.9));
        left.insert(2, stamped(2, 29.9));
        let mut right: IndexMap<ItemId, Stamped> = IndexMap::new();
        right.insert(2, stamped(1, 29.9));
        right.insert(3, stamped(9, 19.9));

        let diff = item_diff(&left, &right, &DiffOptions::default()).unwrap();
        assert_eq!(diff.len(), 3);
        assert_eq!(diff[&1].kind, DiffKind::Deleted);
        assert_eq!(diff[&2].kind, DiffKind::Updated);
        assert_eq!(diff[&3].kind, DiffKind::Created);

        // one-sided items report every field against the absent placeholder
        assert_eq!(diff[&1].fields.len(), 2);
        assert!(diff[&1].fields.values().all(|f| f.kind == DiffKind::Deleted));
        assert!(diff[&3].fields.values().all(|f| f.kind == DiffKind::Created));

        // the surviving pair reports only what changed
        assert_eq!(diff[&2].fields.len(), 1);
        assert!(diff[&2].fields.contains_key("quantity"));
    }

    #[test]
    fn item_diff_of_equal_collections_is_empty() {
        let mut items: IndexMap<ItemId, Stamped> = IndexMap::new();
        items.insert(1, stamped(5, 49.9));
        let diff = item_diff(&items, &items, &DiffOptions::default()).unwrap();
        assert!(diff.is_empty());

        let empty: IndexMap<ItemId, Stamped> = IndexMap::new();
        let diff = item_diff(&empty, &empty, &DiffOptions::default()).unwrap();
        assert!(diff.is_empty());
    }
}
