//! WASM bindings for slot-engine.
//!
//! Exposes the eligibility rules to the booking form's date picker and slot
//! dropdowns via `wasm-bindgen`. Complex values cross the boundary as JSON
//! strings; dates may be given as `YYYY-MM-DD` or `MM/DD/YYYY`.
//!
//! The booked map argument is read leniently: a string that is not valid JSON
//! is treated as an empty map, so a degraded fetch never breaks the picker.
//! Likewise a date argument that is empty or does not parse means "no date
//! selected" and yields an empty answer (`[]`, `false`, `""`, `0`, `null`)
//! instead of throwing.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slot_engine::{AvailabilityEngine, BookedMap, DateEligibility, Selection};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EligibilityDto {
    date: String,
    offered: Vec<String>,
    booked: Vec<String>,
    selectable: Vec<String>,
    fully_booked: bool,
    class_name: &'static str,
}

impl From<&DateEligibility> for EligibilityDto {
    fn from(e: &DateEligibility) -> Self {
        Self {
            date: slot_engine::format_key(e.date),
            offered: e.offered.iter().map(ToString::to_string).collect(),
            booked: e.booked.iter().map(ToString::to_string).collect(),
            selectable: e.selectable.iter().map(ToString::to_string).collect(),
            fully_booked: e.fully_booked,
            class_name: e.display.css_class(),
        }
    }
}

#[derive(Serialize)]
struct DuplicateDto {
    first: usize,
    second: usize,
    date: String,
    time: String,
}

/// Input format for selections passed from JavaScript.
#[derive(Deserialize)]
struct SelectionInput {
    #[serde(rename = "classDate", default)]
    class_date: Option<String>,
    time: String,
}

// ---------------------------------------------------------------------------
// Boundary-free core, unit-testable on native targets
// ---------------------------------------------------------------------------

/// The date a picker argument refers to, if any.
///
/// An empty string, `"null"`, `"undefined"` or anything that does not parse
/// means no date is selected.
fn picked_date(s: &str) -> Option<NaiveDate> {
    slot_engine::parse_date(s).ok()
}

fn parse_booked(json: &str) -> BookedMap {
    BookedMap::from_json_str(json).unwrap_or_default()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn format_dates(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| slot_engine::format_key(*d)).collect()
}

fn offered_slots_json(date: &str) -> Result<String, String> {
    let slots = match picked_date(date) {
        Some(date) => AvailabilityEngine::default().offered_slots(date),
        None => Vec::new(),
    };
    to_json(&slots)
}

fn selectable_slots_json(date: &str, booked_json: &str) -> Result<String, String> {
    let slots = match picked_date(date) {
        Some(date) => AvailabilityEngine::default().selectable_slots(date, &parse_booked(booked_json)),
        None => Vec::new(),
    };
    to_json(&slots)
}

fn disabled_slots_json(date: &str, booked_json: &str) -> Result<String, String> {
    let slots = match picked_date(date) {
        Some(date) => AvailabilityEngine::default().disabled_slots(date, &parse_booked(booked_json)),
        None => Vec::new(),
    };
    to_json(&slots)
}

/// Threshold for `date`; 0 when no date is selected.
fn required_count(date: &str) -> u32 {
    picked_date(date)
        .map(|date| AvailabilityEngine::default().required_slot_count(date))
        .map_or(0, |count| u32::try_from(count).unwrap_or(u32::MAX))
}

fn date_disabled(date: &str, booked_json: &str) -> bool {
    picked_date(date).is_some_and(|date| {
        AvailabilityEngine::default().is_date_disabled(date, &parse_booked(booked_json))
    })
}

fn class_name(date: &str, booked_json: &str) -> &'static str {
    match picked_date(date) {
        Some(date) => AvailabilityEngine::default()
            .date_display_class(date, &parse_booked(booked_json))
            .css_class(),
        None => "",
    }
}

/// Eligibility object, or JSON `null` when no date is selected.
fn eligibility_json(date: &str, booked_json: &str) -> Result<String, String> {
    let dto = picked_date(date).map(|date| {
        let eligibility = AvailabilityEngine::default().eligibility(date, &parse_booked(booked_json));
        EligibilityDto::from(&eligibility)
    });
    to_json(&dto)
}

fn candidate_dates_json(today: &str, lead_days: u32, count: usize) -> Result<String, String> {
    let dates = match picked_date(today) {
        Some(today) => slot_engine::candidate_dates(today, lead_days, count),
        None => Vec::new(),
    };
    to_json(&format_dates(&dates))
}

fn valid_dates_json(
    today: &str,
    booked_json: &str,
    lead_days: u32,
    count: usize,
) -> Result<String, String> {
    let dates = match picked_date(today) {
        Some(today) => AvailabilityEngine::default().valid_dates(
            &parse_booked(booked_json),
            today,
            lead_days,
            count,
        ),
        None => Vec::new(),
    };
    to_json(&format_dates(&dates))
}

/// Choices without a usable date are skipped; reported indices still refer
/// to positions in the input array.
fn duplicate_selections_json(selections_json: &str) -> Result<String, String> {
    let inputs: Vec<SelectionInput> = serde_json::from_str(selections_json)
        .map_err(|e| format!("Invalid selections JSON: {}", e))?;

    let (positions, selections): (Vec<usize>, Vec<Selection>) = inputs
        .into_iter()
        .enumerate()
        .filter_map(|(index, input)| {
            let date = picked_date(input.class_date.as_deref()?)?;
            Some((index, Selection::new(date, input.time)))
        })
        .unzip();

    let dtos: Vec<DuplicateDto> = slot_engine::find_duplicate_selections(&selections)
        .into_iter()
        .map(|d| DuplicateDto {
            first: positions[d.first],
            second: positions[d.second],
            date: slot_engine::format_key(d.selection.date),
            time: d.selection.slot.to_string(),
        })
        .collect();
    to_json(&dtos)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// Slots that run on `date`, as a JSON array of slot ids.
///
/// `"[]"` when no date is selected.
#[wasm_bindgen(js_name = "offeredSlots")]
pub fn offered_slots(date: &str) -> Result<String, JsValue> {
    offered_slots_json(date).map_err(js_err)
}

/// Fully-booked threshold for `date` (3 on Fridays, 2 otherwise, 0 without a date).
#[wasm_bindgen(js_name = "requiredSlotCount")]
pub fn required_slot_count(date: &str) -> u32 {
    required_count(date)
}

/// Offered slots that are still open on `date`, as a JSON array.
#[wasm_bindgen(js_name = "selectableSlots")]
pub fn selectable_slots(date: &str, booked_json: &str) -> Result<String, JsValue> {
    selectable_slots_json(date, booked_json).map_err(js_err)
}

/// Offered slots that are booked on `date`, as a JSON array.
#[wasm_bindgen(js_name = "disabledSlots")]
pub fn disabled_slots(date: &str, booked_json: &str) -> Result<String, JsValue> {
    disabled_slots_json(date, booked_json).map_err(js_err)
}

/// Whether the date picker must block `date`. `false` without a date.
///
/// Suitable for a `filterDate` callback after negation.
#[wasm_bindgen(js_name = "isDateDisabled")]
pub fn is_date_disabled(date: &str, booked_json: &str) -> bool {
    date_disabled(date, booked_json)
}

/// CSS class for the day cell: `""`, `"partially-booked"` or `"fully-booked"`.
#[wasm_bindgen(js_name = "dayClassName")]
pub fn day_class_name(date: &str, booked_json: &str) -> String {
    class_name(date, booked_json).to_string()
}

/// Everything about one day as a JSON object (`null` without a date).
#[wasm_bindgen(js_name = "dateEligibility")]
pub fn date_eligibility(date: &str, booked_json: &str) -> Result<String, JsValue> {
    eligibility_json(date, booked_json).map_err(js_err)
}

/// Placeholder window of `count` weekdays starting `lead_days` after `today`,
/// as a JSON array of `MM/DD/YYYY` strings.
#[wasm_bindgen(js_name = "candidateDates")]
pub fn candidate_dates(today: &str, lead_days: u32, count: usize) -> Result<String, JsValue> {
    candidate_dates_json(today, lead_days, count).map_err(js_err)
}

/// Like `candidateDates` but skipping fully booked days.
#[wasm_bindgen(js_name = "validDates")]
pub fn valid_dates(
    today: &str,
    booked_json: &str,
    lead_days: u32,
    count: usize,
) -> Result<String, JsValue> {
    valid_dates_json(today, booked_json, lead_days, count).map_err(js_err)
}

/// Find repeated `{classDate, time}` choices in a JSON array of selections.
///
/// Returns a JSON array of `{first, second, date, time}` objects.
#[wasm_bindgen(js_name = "findDuplicateSelections")]
pub fn find_duplicate_selections(selections_json: &str) -> Result<String, JsValue> {
    duplicate_selections_json(selections_json).map_err(js_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn eligibility_uses_picker_class_names() {
        let json = eligibility_json(
            "2025-06-06",
            r#"{"06/06/2025": ["9am-12pm EST/8am-11pm CST"]}"#,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["date"], "06/06/2025");
        assert_eq!(value["class_name"], "partially-booked");
        assert_eq!(value["selectable"].as_array().unwrap().len(), 2);
        assert_eq!(value["fully_booked"], false);
    }

    #[test]
    fn garbage_booked_json_reads_as_empty() {
        let json = selectable_slots_json("06/09/2025", "<html>502</html>").unwrap();
        let value: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(value.len(), 2);
    }

    #[test]
    fn unselected_date_gives_empty_answers() {
        for date in ["", "null", "undefined", "tomorrow"] {
            assert_eq!(offered_slots_json(date).unwrap(), "[]", "{date:?}");
            assert_eq!(selectable_slots_json(date, "{}").unwrap(), "[]", "{date:?}");
            assert_eq!(disabled_slots_json(date, "{}").unwrap(), "[]", "{date:?}");
            assert_eq!(required_count(date), 0, "{date:?}");
            assert!(!date_disabled(date, "{}"), "{date:?}");
            assert_eq!(class_name(date, "{}"), "", "{date:?}");
            assert_eq!(eligibility_json(date, "{}").unwrap(), "null", "{date:?}");
            assert_eq!(candidate_dates_json(date, 2, 7).unwrap(), "[]", "{date:?}");
            assert_eq!(valid_dates_json(date, "{}", 2, 7).unwrap(), "[]", "{date:?}");
        }
    }

    #[test]
    fn picked_date_answers_follow_engine() {
        let booked = r#"{"06/09/2025": ["9am-12pm EST/8am-11pm CST", "2pm-5pm EST/1pm-4pm CST"]}"#;
        assert_eq!(required_count("06/06/2025"), 3);
        assert_eq!(required_count("2025-06-09"), 2);
        assert!(date_disabled("06/09/2025", booked));
        assert!(date_disabled("06/07/2025", "{}"));
        assert_eq!(class_name("06/09/2025", booked), "fully-booked");
        let disabled: Vec<String> =
            serde_json::from_str(&disabled_slots_json("06/09/2025", booked).unwrap()).unwrap();
        assert_eq!(disabled.len(), 2);
    }

    #[test]
    fn duplicate_check_skips_unpicked_choices() {
        let json = duplicate_selections_json(
            r#"[{"classDate":null,"time":"x"},{"classDate":"06/09/2025","time":"x"},{"time":"x"},{"classDate":"2025-06-09","time":"x"}]"#,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["first"], 1);
        assert_eq!(value[0]["second"], 3);
    }

    #[test]
    fn malformed_selections_json_is_an_error() {
        assert!(duplicate_selections_json("{not json").is_err());
    }

    #[test]
    fn valid_dates_are_keys() {
        let json = valid_dates_json("2025-06-04", "{}", 2, 2).unwrap();
        assert_eq!(json, r#"["06/06/2025","06/09/2025"]"#);
    }

    #[test]
    fn duplicate_selections_are_reported() {
        let json = duplicate_selections_json(
            r#"[{"classDate":"06/09/2025","time":"x"},{"classDate":"2025-06-09","time":"x"}]"#,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["first"], 0);
        assert_eq!(value[0]["second"], 1);
        assert_eq!(value[0]["date"], "06/09/2025");
    }

    #[test]
    fn offered_slots_on_weekend_is_empty_array() {
        assert_eq!(offered_slots_json("2025-06-07").unwrap(), "[]");
    }
}
