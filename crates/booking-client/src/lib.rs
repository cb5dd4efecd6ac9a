//! # booking-client
//!
//! The stateful side of the class booking form: form input and validation,
//! the booked-dates snapshot lifecycle, bot verification, and the HTTP
//! client for the booking backend.
//!
//! Eligibility rules live in [`slot_engine`]; this crate feeds them the
//! current snapshot and turns user actions into service calls.
//!
//! ## Modules
//!
//! - [`form`]: form state, events and validation
//! - [`session`]: `FormSession` with refresh, availability re-check, submit
//! - [`service`]: `BookingService` port and its HTTP implementation
//! - [`verify`]: verification tokens with bounded retry
//! - [`cache`]: TTL cache for the last snapshot
//! - [`config`]: TOML configuration with environment overrides
//! - [`error`]: Error types

pub mod cache;
pub mod config;
pub mod error;
pub mod form;
pub mod service;
pub mod session;
pub mod verify;

pub use cache::{MokaSnapshotCache, SnapshotCache};
pub use config::{load_config, ClientConfig};
pub use error::{ConfigError, ConflictReason, ConflictReport, ServiceError, SessionError, VerifyError};
pub use form::{BookingRequest, ContactDetails, FormEvent, FormInput, FormVariant};
pub use service::{BookingService, HttpBookingService, LeadSubmission};
pub use session::{FormSession, SessionSettings, SnapshotSource, SubmitReceipt};
pub use verify::{acquire_token, RetryPolicy, StaticTokenProvider, TokenProvider, VerificationToken};
