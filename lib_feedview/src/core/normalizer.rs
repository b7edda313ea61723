//! # Record Normalizer
//!
//! Producers publish the same attribute under different spellings
//! (`memberNumber`, `member_number`, `EVA_DQ`, ...). The accepted spellings
//! for each canonical field are declared once in [`PRECEDENCE`], highest
//! precedence first, and [`normalize`] walks that table.
//!
//! A spelling counts as supplied when the key is present with a value other
//! than `null` or the empty string. Falsy values like `0` and `false` are
//! real values and stop the search.

use serde_json::{Map, Value};

use crate::core::decoder::DecodedPayload;
use crate::core::record::{CanonicalField, CanonicalRecord};

/// Accepted source keys for one canonical field, highest precedence first.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// The canonical field being populated.
    pub field: CanonicalField,
    /// Source spellings, checked in order.
    pub keys: &'static [&'static str],
}

/// The precedence table. Producers disagree on which spelling is primary, so the
/// order differs per field: `p_value` and `EVA_DQ` outrank their camelCase forms.
pub const PRECEDENCE: [FieldRule; 6] = [
    FieldRule {
        field: CanonicalField::MemberNumber,
        keys: &["memberNumber", "member_number"],
    },
    FieldRule {
        field: CanonicalField::CallProbability,
        keys: &["callProbability", "call_probability"],
    },
    FieldRule {
        field: CanonicalField::RawPageTags,
        keys: &["rawPageTags", "raw_page_tags"],
    },
    FieldRule {
        field: CanonicalField::Intent,
        keys: &["intent"],
    },
    FieldRule {
        field: CanonicalField::PValue,
        keys: &["p_value", "pValue"],
    },
    FieldRule {
        field: CanonicalField::EvaDq,
        keys: &["EVA_DQ", "evaDq", "eva_dq"],
    },
];

/// Builds a canonical record from a decoded payload.
///
/// Never fails. Degraded payloads and JSON that is not an object yield an
/// all-empty record; missing keys leave their field empty.
pub fn normalize(payload: &DecodedPayload) -> CanonicalRecord {
    match payload {
        DecodedPayload::Structured(Value::Object(map)) => normalize_object(map),
        DecodedPayload::Structured(other) => {
            log::debug!("Structured payload is not an object ({}), producing empty record", kind(other));
            CanonicalRecord::default()
        }
        DecodedPayload::Degraded(_) => CanonicalRecord::default(),
    }
}

fn normalize_object(map: &Map<String, Value>) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();
    for rule in PRECEDENCE.iter() {
        if let Some(value) = resolve(map, rule.keys) {
            record.set(rule.field, value.clone());
        }
    }
    record
}

/// First supplied value among `keys`, in order.
fn resolve<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_supplied(value))
}

fn is_supplied(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
