//! # slot-engine
//!
//! Weekday class-slot eligibility for a booking form.
//!
//! Given a snapshot of already-booked slots per date, the engine decides which
//! calendar days a user may pick, which time slots run on each day, and which
//! of those are still open. Everything is a pure function over the snapshot:
//! no I/O, no caching, no clock reads except in [`calendar::today_in`].
//!
//! ## Modules
//!
//! - [`calendar`]: `MM/DD/YYYY` keys, weekday rules, rolling date windows
//! - [`slots`]: `TimeSlot` identifiers and the `SlotCatalog`
//! - [`booked`]: the lenient `BookedMap` snapshot
//! - [`availability`]: per-date offered/booked/selectable slots and day blocking
//! - [`conflict`]: duplicate and snapshot checks on chosen selections
//! - [`error`]: Error types

pub mod availability;
pub mod booked;
pub mod calendar;
pub mod conflict;
pub mod error;
pub mod slots;

pub use availability::{AvailabilityEngine, DateEligibility, DisplayClass};
pub use booked::BookedMap;
pub use calendar::{candidate_dates, format_iso, format_key, next_eligible_weekday, parse_date};
pub use conflict::{check_selection, find_duplicate_selections, Selection, SelectionIssue};
pub use error::EngineError;
pub use slots::{SlotCatalog, TimeSlot};
