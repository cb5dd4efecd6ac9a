//! Date and slot eligibility over a booked-map snapshot.
//!
//! Every query here is a pure function of `(date, BookedMap)` and the slot
//! catalog. Nothing is cached between calls, so a caller can swap in a fresh
//! snapshot at any time and the next query reflects it.
//!
//! Two different views of the booked entries are in play:
//!
//! - slot queries ([`AvailabilityEngine::selectable_slots`],
//!   [`AvailabilityEngine::disabled_slots`]) work on the *intersection* of
//!   booked and offered slots, so a stray entry for a slot that does not run
//!   that day never hides anything;
//! - day queries ([`AvailabilityEngine::is_date_disabled`],
//!   [`AvailabilityEngine::date_display_class`]) compare the *raw* entry count
//!   against the weekday threshold (2 on Monday..Thursday, 3 on Friday).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booked::BookedMap;
use crate::calendar::{self, is_friday, is_weekend};
use crate::slots::{SlotCatalog, TimeSlot};

/// Upper bound on days scanned when building the preview window.
pub const MAX_SCAN_DAYS: usize = 60;

/// Cosmetic booking level of a day in a date picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayClass {
    /// Weekend, or no bookings at all.
    #[default]
    None,
    /// Some bookings, below the fully-booked threshold.
    Partial,
    /// Raw booked count meets the threshold.
    Full,
}

impl DisplayClass {
    /// CSS class a date picker attaches to the day cell.
    pub fn css_class(self) -> &'static str {
        match self {
            DisplayClass::None => "",
            DisplayClass::Partial => "partially-booked",
            DisplayClass::Full => "fully-booked",
        }
    }
}

/// Everything a form needs to render one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateEligibility {
    pub date: NaiveDate,
    /// Slots that run on this weekday, in catalog order.
    pub offered: Vec<TimeSlot>,
    /// Distinct slots recorded as booked under this date's key.
    pub booked: Vec<TimeSlot>,
    /// Offered slots that are not booked.
    pub selectable: Vec<TimeSlot>,
    /// Whether the whole day is blocked (weekend, or raw count ≥ threshold).
    pub fully_booked: bool,
    pub display: DisplayClass,
}

/// Stateless eligibility rules for one slot catalog.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityEngine {
    catalog: SlotCatalog,
}

impl AvailabilityEngine {
    pub fn new(catalog: SlotCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    /// Slots that run on `date`.
    ///
    /// Monday..Thursday get the standard slots, Friday gets the standard slots
    /// followed by the restricted slot, and weekends get nothing.
    pub fn offered_slots(&self, date: NaiveDate) -> Vec<TimeSlot> {
        if is_weekend(date) {
            return Vec::new();
        }
        let mut offered = self.catalog.standard().to_vec();
        if is_friday(date) {
            offered.push(self.catalog.restricted().clone());
        }
        offered
    }

    /// Raw booked count at which `date` is considered fully booked.
    ///
    /// This is the number of standard slots, plus one on Fridays. It is not
    /// the size of the whole catalog: the restricted slot does not count on
    /// other days.
    pub fn required_slot_count(&self, date: NaiveDate) -> usize {
        self.catalog.standard().len() + usize::from(is_friday(date))
    }

    /// Distinct slots recorded under `date`'s `MM/DD/YYYY` key.
    pub fn booked_slots(&self, date: NaiveDate, booked: &BookedMap) -> BTreeSet<TimeSlot> {
        booked.entries_for(date).iter().cloned().collect()
    }

    /// Offered slots that are booked: the options to render as disabled.
    pub fn disabled_slots(&self, date: NaiveDate, booked: &BookedMap) -> Vec<TimeSlot> {
        let taken = booked.entries_for(date);
        self.offered_slots(date)
            .into_iter()
            .filter(|slot| taken.contains(slot))
            .collect()
    }

    /// Offered slots minus booked slots, in catalog order.
    pub fn selectable_slots(&self, date: NaiveDate, booked: &BookedMap) -> Vec<TimeSlot> {
        let taken = booked.entries_for(date);
        self.offered_slots(date)
            .into_iter()
            .filter(|slot| !taken.contains(slot))
            .collect()
    }

    /// Whether `date` must be blocked in a date picker.
    ///
    /// Weekends are always blocked. Weekdays are blocked once the raw entry
    /// count under their key reaches [`AvailabilityEngine::required_slot_count`],
    /// whether or not each entry is a slot that runs that day.
    pub fn is_date_disabled(&self, date: NaiveDate, booked: &BookedMap) -> bool {
        if is_weekend(date) {
            return true;
        }
        booked.raw_count(date) >= self.required_slot_count(date)
    }

    /// Cosmetic booking level of `date`. Never blocks selection by itself.
    pub fn date_display_class(&self, date: NaiveDate, booked: &BookedMap) -> DisplayClass {
        if is_weekend(date) {
            return DisplayClass::None;
        }
        let count = booked.raw_count(date);
        if count >= self.required_slot_count(date) {
            DisplayClass::Full
        } else if count > 0 {
            DisplayClass::Partial
        } else {
            DisplayClass::None
        }
    }

    /// All per-day facts in one value.
    pub fn eligibility(&self, date: NaiveDate, booked: &BookedMap) -> DateEligibility {
        DateEligibility {
            date,
            offered: self.offered_slots(date),
            booked: self.booked_slots(date, booked).into_iter().collect(),
            selectable: self.selectable_slots(date, booked),
            fully_booked: self.is_date_disabled(date, booked),
            display: self.date_display_class(date, booked),
        }
    }

    /// Up to `count` bookable weekdays starting `lead_days` after `today`.
    ///
    /// Days for which [`AvailabilityEngine::is_date_disabled`] holds are
    /// skipped. At most [`MAX_SCAN_DAYS`] weekdays are examined, so a
    /// saturated snapshot yields a short list rather than an endless scan.
    pub fn valid_dates(
        &self,
        booked: &BookedMap,
        today: NaiveDate,
        lead_days: u32,
        count: usize,
    ) -> Vec<NaiveDate> {
        calendar::candidate_dates(today, lead_days, MAX_SCAN_DAYS)
            .into_iter()
            .filter(|date| !self.is_date_disabled(*date, booked))
            .take(count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_classes_match_picker_styles() {
        assert_eq!(DisplayClass::None.css_class(), "");
        assert_eq!(DisplayClass::Partial.css_class(), "partially-booked");
        assert_eq!(DisplayClass::Full.css_class(), "fully-booked");
    }

    #[test]
    fn display_class_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DisplayClass::Partial).unwrap(),
            "\"partial\""
        );
    }
}
