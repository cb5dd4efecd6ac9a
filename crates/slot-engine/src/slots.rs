//! Time slot identifiers and the catalog of slots a class runs in.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Morning session, offered Monday through Friday.
pub const MORNING_SLOT: &str = "9am-12pm EST/8am-11pm CST";

/// Afternoon session, offered Monday through Friday.
pub const AFTERNOON_SLOT: &str = "2pm-5pm EST/1pm-4pm CST";

/// Late-morning session that only runs on Fridays.
pub const FRIDAY_SLOT: &str = "10am-1pm EST/9am-12pm CST";

/// An opaque time-slot identifier, compared by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlot(String);

impl TimeSlot {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimeSlot {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TimeSlot {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TimeSlot {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The fixed set of slots a class runs in.
///
/// Standard slots run every weekday. The single restricted slot runs on
/// Fridays only, in addition to the standard ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCatalog {
    standard: Vec<TimeSlot>,
    restricted: TimeSlot,
}

impl SlotCatalog {
    /// Build a catalog from ordered standard slots and the Friday-only slot.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidCatalog` if there are no standard slots,
    /// a slot is listed twice, or the restricted slot is also a standard slot.
    pub fn new(standard: Vec<TimeSlot>, restricted: TimeSlot) -> Result<Self> {
        if standard.is_empty() {
            return Err(EngineError::InvalidCatalog(
                "at least one standard slot is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for slot in standard.iter().chain(std::iter::once(&restricted)) {
            if !seen.insert(slot.as_str()) {
                return Err(EngineError::InvalidCatalog(format!(
                    "slot '{}' is listed more than once",
                    slot
                )));
            }
        }

        Ok(Self {
            standard,
            restricted,
        })
    }

    /// The catalog the Intro to AI class is sold with.
    pub fn intro_to_ai() -> Self {
        Self {
            standard: vec![TimeSlot::from(MORNING_SLOT), TimeSlot::from(AFTERNOON_SLOT)],
            restricted: TimeSlot::from(FRIDAY_SLOT),
        }
    }

    pub fn standard(&self) -> &[TimeSlot] {
        &self.standard
    }

    pub fn restricted(&self) -> &TimeSlot {
        &self.restricted
    }

    /// Every slot in catalog order, restricted slot last.
    pub fn all(&self) -> impl Iterator<Item = &TimeSlot> {
        self.standard.iter().chain(std::iter::once(&self.restricted))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.all().any(|slot| slot.as_str() == id)
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::intro_to_ai()
    }
}
