//! Snapshot of already-reserved slots, keyed by `MM/DD/YYYY`.
//!
//! The map comes from an external service and is read leniently: anything
//! that does not look like `{"MM/DD/YYYY": ["slot", ...]}` is treated as "no
//! bookings" for that date instead of failing.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::calendar::format_key;
use crate::error::Result;
use crate::slots::TimeSlot;

/// Date key → raw list of booked slot identifiers.
///
/// The per-date lists are kept as received (including duplicates or slots
/// that make no sense for that weekday) because the fully-booked threshold
/// counts raw entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BookedMap {
    entries: BTreeMap<String, Vec<TimeSlot>>,
}

impl BookedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from an arbitrary JSON value.
    ///
    /// - a non-object value yields an empty map
    /// - a `null` or non-array date entry is skipped
    /// - non-string items inside a date's array are dropped
    pub fn from_value(value: Value) -> Self {
        let Value::Object(object) = value else {
            return Self::default();
        };

        let entries = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Array(items) => {
                    let slots: Vec<TimeSlot> = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(id) => Some(TimeSlot::from(id)),
                            _ => None,
                        })
                        .collect();
                    Some((key, slots))
                }
                _ => None,
            })
            .collect();

        Self { entries }
    }

    /// Parse a JSON document into a map.
    ///
    /// # Errors
    /// Returns `EngineError::Json` only when `json` is not syntactically valid
    /// JSON. Shape problems are absorbed as described on [`BookedMap::from_value`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    /// Record a booking for `date`. Mostly useful for building fixtures.
    pub fn insert(&mut self, date: NaiveDate, slot: impl Into<TimeSlot>) {
        self.entries
            .entry(format_key(date))
            .or_default()
            .push(slot.into());
    }

    /// Builder form of [`BookedMap::insert`].
    pub fn with_booking(mut self, date: NaiveDate, slot: impl Into<TimeSlot>) -> Self {
        self.insert(date, slot);
        self
    }

    /// Raw entries recorded for `date`, or an empty slice.
    pub fn entries_for(&self, date: NaiveDate) -> &[TimeSlot] {
        self.entries_for_key(&format_key(date))
    }

    /// Raw entries under an exact key. Keys in any other format never match.
    pub fn entries_for_key(&self, key: &str) -> &[TimeSlot] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of raw entries recorded for `date`, duplicates included.
    pub fn raw_count(&self, date: NaiveDate) -> usize {
        self.entries_for(date).len()
    }

    /// Number of date keys in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for BookedMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn null_entry_means_no_bookings() {
        let map = BookedMap::from_value(json!({ "06/06/2025": null }));
        assert!(map.entries_for(date(2025, 6, 6)).is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn non_object_root_is_empty() {
        assert!(BookedMap::from_value(json!(["06/06/2025"])).is_empty());
        assert!(BookedMap::from_value(json!("oops")).is_empty());
        assert!(BookedMap::from_value(Value::Null).is_empty());
    }

    #[test]
    fn non_string_items_are_dropped() {
        let map = BookedMap::from_value(json!({ "06/09/2025": ["a", 3, null, "b"] }));
        assert_eq!(map.raw_count(date(2025, 6, 9)), 2);
    }

    #[test]
    fn duplicates_count_towards_raw_total() {
        let map = BookedMap::new()
            .with_booking(date(2025, 6, 9), "a")
            .with_booking(date(2025, 6, 9), "a");
        assert_eq!(map.raw_count(date(2025, 6, 9)), 2);
    }

    #[test]
    fn iso_keys_never_match() {
        let map = BookedMap::from_value(json!({ "2025-06-09": ["a", "b"] }));
        assert_eq!(map.raw_count(date(2025, 6, 9)), 0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn deserialize_is_lenient() {
        let map: BookedMap = serde_json::from_str(r#"{"06/09/2025": {"bad": true}}"#).unwrap();
        assert!(map.is_empty());
        assert!(BookedMap::from_json_str("{not json").is_err());
    }

    #[test]
    fn serializes_as_plain_object() {
        let map = BookedMap::new().with_booking(date(2025, 6, 9), "a");
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            json!({ "06/09/2025": ["a"] })
        );
    }
}
