//! # Canonical Records
//!
//! Upstream producers disagree on how to spell field names, but the display
//! only ever knows six columns. [`CanonicalField`] names those columns in
//! display order and [`CanonicalRecord`] holds one value (or nothing) per
//! column.

use serde::Serialize;
use serde_json::Value;

/// One of the six display attributes, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    /// Member identifier, string or number.
    MemberNumber,
    /// Numeric call probability score.
    CallProbability,
    /// Page tags, either a string or a structured list.
    RawPageTags,
    /// Intent label.
    Intent,
    /// Numeric p-value.
    PValue,
    /// EVA data-quality indicator.
    EvaDq,
}

impl CanonicalField {
    /// All fields in column order.
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::MemberNumber,
        CanonicalField::CallProbability,
        CanonicalField::RawPageTags,
        CanonicalField::Intent,
        CanonicalField::PValue,
        CanonicalField::EvaDq,
    ];

    /// Column header shown on the display surface.
    pub fn title(self) -> &'static str {
        match self {
            CanonicalField::MemberNumber => "Member Number",
            CanonicalField::CallProbability => "Call Probability",
            CanonicalField::RawPageTags => "Raw Page Tags",
            CanonicalField::Intent => "Intent",
            CanonicalField::PValue => "P Value",
            CanonicalField::EvaDq => "EVA DQ",
        }
    }

    /// The canonical (camelCase) key, used when the record is serialized.
    pub fn key(self) -> &'static str {
        match self {
            CanonicalField::MemberNumber => "memberNumber",
            CanonicalField::CallProbability => "callProbability",
            CanonicalField::RawPageTags => "rawPageTags",
            CanonicalField::Intent => "intent",
            CanonicalField::PValue => "pValue",
            CanonicalField::EvaDq => "evaDq",
        }
    }
}

/// A normalized row. Every field is optional because upstream data is untrusted.
///
/// Values keep their JSON shape so that a numeric probability is still a
/// number when it reaches the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Member identifier.
    pub member_number: Option<Value>,
    /// Call probability score.
    pub call_probability: Option<Value>,
    /// Raw page tags.
    pub raw_page_tags: Option<Value>,
    /// Intent label.
    pub intent: Option<Value>,
    /// P-value.
    pub p_value: Option<Value>,
    /// EVA DQ indicator.
    pub eva_dq: Option<Value>,
}

impl CanonicalRecord {
    /// Returns the value stored for `field`, if any.
    pub fn get(&self, field: CanonicalField) -> Option<&Value> {
        self.slot(field).as_ref()
    }

    /// Stores `value` for `field`, replacing whatever was there.
    pub fn set(&mut self, field: CanonicalField, value: Value) {
        *self.slot_mut(field) = Some(value);
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, field: CanonicalField, value: Value) -> Self {
        self.set(field, value);
        self
    }

    /// True when no field carries a value, which is what degraded payloads produce.
    pub fn is_empty(&self) -> bool {
        CanonicalField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    fn slot(&self, field: CanonicalField) -> &Option<Value> {
        match field {
            CanonicalField::MemberNumber => &self.member_number,
            CanonicalField::CallProbability => &self.call_probability,
            CanonicalField::RawPageTags => &self.raw_page_tags,
            CanonicalField::Intent => &self.intent,
            CanonicalField::PValue => &self.p_value,
            CanonicalField::EvaDq => &self.eva_dq,
        }
    }

    fn slot_mut(&mut self, field: CanonicalField) -> &mut Option<Value> {
        match field {
            CanonicalField::MemberNumber => &mut self.member_number,
            CanonicalField::CallProbability => &mut self.call_probability,
            CanonicalField::RawPageTags => &mut self.raw_page_tags,
            CanonicalField::Intent => &mut self.intent,
            CanonicalField::PValue => &mut self.p_value,
            CanonicalField::EvaDq => &mut self.eva_dq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_titles_follow_display_order() {
        let titles: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.title()).collect();
        assert_eq!(
            titles,
            vec!["Member Number", "Call Probability", "Raw Page Tags", "Intent", "P Value", "EVA DQ"]
        );
    }

    #[test]
    fn get_and_set_address_the_same_slot() {
        let mut record = CanonicalRecord::default();
        assert!(record.is_empty());

        record.set(CanonicalField::PValue, json!(0.05));
        assert_eq!(record.get(CanonicalField::PValue), Some(&json!(0.05)));
        assert_eq!(record.p_value, Some(json!(0.05)));
        assert!(!record.is_empty());
    }

    #[test]
    fn serializes_with_canonical_keys() {
        let record = CanonicalRecord::default()
            .with(CanonicalField::MemberNumber, json!("42"))
            .with(CanonicalField::EvaDq, json!("ok"));

        let value = serde_json::to_value(&record).unwrap();
        for field in CanonicalField::ALL {
            assert!(value.get(field.key()).is_some(), "missing key {}", field.key());
        }
        assert_eq!(value["memberNumber"], json!("42"));
        assert_eq!(value["callProbability"], Value::Null);
    }
}
