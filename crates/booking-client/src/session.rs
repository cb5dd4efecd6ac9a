//! A form session: snapshot lifecycle, availability re-checks and submission.
//!
//! The session owns the current booked-map snapshot and hands it to the
//! availability engine for rendering. The snapshot is an `Arc<BookedMap>`
//! that is only ever replaced as a whole, so anything holding a clone keeps a
//! consistent view while a refresh is in flight.
//!
//! Failure handling follows one rule: an error only blocks the action that
//! was attempted. A failed fetch degrades to the cached (or current) snapshot,
//! a conflict leaves the form untouched for the user to fix, and a failed
//! submission persists nothing.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use futures::future::join_all;
use slot_engine::calendar::{candidate_dates, today_in};
use slot_engine::{find_duplicate_selections, AvailabilityEngine, BookedMap, DateEligibility, Selection};
use tracing::{debug, info, instrument, warn};

use crate::cache::SnapshotCache;
use crate::config::ClientConfig;
use crate::error::{ConfigError, ConflictReason, ConflictReport, SessionError};
use crate::form::{BookingRequest, FormInput, FormVariant};
use crate::service::{BookingService, LeadSubmission};
use crate::verify::{acquire_token, RetryPolicy, TokenProvider, SUBMIT_ACTION};

/// Where the snapshot came from after a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Fetched from the booking service just now.
    Fresh,
    /// The fetch failed; the cached snapshot was used.
    Cached,
    /// The fetch failed and nothing was cached; the previous snapshot stays.
    Unchanged,
}

/// Tunables of a session, usually derived from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timezone: Tz,
    pub lead_days: u32,
    pub window_len: usize,
    pub retry: RetryPolicy,
    pub verification_action: String,
    pub redirect_url: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            lead_days: 2,
            window_len: 7,
            retry: RetryPolicy::default(),
            verification_action: SUBMIT_ACTION.to_string(),
            redirect_url: None,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            timezone: config.timezone()?,
            lead_days: config.lead_days,
            window_len: config.window_len,
            retry: config.retry_policy(),
            verification_action: config.verification.action.clone(),
            redirect_url: config.redirect_url.clone(),
        })
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub selections: Vec<Selection>,
    /// Page to send the user to next, if configured.
    pub redirect_url: Option<String>,
}

pub struct FormSession {
    engine: AvailabilityEngine,
    service: Arc<dyn BookingService>,
    tokens: Arc<dyn TokenProvider>,
    cache: Arc<dyn SnapshotCache>,
    settings: SessionSettings,
    snapshot: Arc<BookedMap>,
}

impl FormSession {
    pub fn new(
        service: Arc<dyn BookingService>,
        tokens: Arc<dyn TokenProvider>,
        cache: Arc<dyn SnapshotCache>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            engine: AvailabilityEngine::default(),
            service,
            tokens,
            cache,
            settings,
            snapshot: Arc::new(BookedMap::new()),
        }
    }

    /// Use a non-default slot catalog.
    pub fn with_engine(mut self, engine: AvailabilityEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> &AvailabilityEngine {
        &self.engine
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// The snapshot the form should render from right now.
    pub fn snapshot(&self) -> Arc<BookedMap> {
        Arc::clone(&self.snapshot)
    }

    /// Begin a session: show cached data immediately, then fetch fresh data.
    pub async fn start(&mut self) -> SnapshotSource {
        if let Some(cached) = self.cache.get() {
            debug!(dates = cached.len(), "loaded cached booked dates");
            self.snapshot = cached;
        }
        self.refresh().await
    }

    /// Fetch a fresh snapshot, falling back to the cache on failure.
    ///
    /// Never fails: the form stays usable with the best data available.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> SnapshotSource {
        match self.service.booked_dates().await {
            Ok(map) => {
                let map = Arc::new(map);
                self.cache.set(Arc::clone(&map));
                self.snapshot = map;
                info!(dates = self.snapshot.len(), "booked dates refreshed");
                SnapshotSource::Fresh
            }
            Err(err) => match self.cache.get() {
                Some(cached) => {
                    warn!(error = %err, "booked dates fetch failed, using cached snapshot");
                    self.snapshot = cached;
                    SnapshotSource::Cached
                }
                None => {
                    warn!(error = %err, "booked dates fetch failed, keeping current snapshot");
                    SnapshotSource::Unchanged
                }
            },
        }
    }

    /// Today's date in the session's timezone.
    pub fn today(&self) -> NaiveDate {
        today_in(self.settings.timezone)
    }

    pub fn eligibility(&self, date: NaiveDate) -> DateEligibility {
        self.engine.eligibility(date, &self.snapshot)
    }

    /// Weekdays to show before any snapshot has arrived.
    pub fn placeholder_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        candidate_dates(today, self.settings.lead_days, self.settings.window_len)
    }

    /// Upcoming bookable dates according to the current snapshot.
    pub fn valid_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        self.engine.valid_dates(
            &self.snapshot,
            today,
            self.settings.lead_days,
            self.settings.window_len,
        )
    }

    /// Re-validate every selection right before submission.
    ///
    /// A date and slot chosen twice in the same form is reported without
    /// asking the server. Otherwise all selections are checked concurrently
    /// and every one the server reports as taken is returned.
    ///
    /// # Errors
    /// `SessionError::Conflicts` lists the rejected selections;
    /// `SessionError::Service` means the check itself could not be made.
    #[instrument(skip(self, request), fields(selections = request.selections.len()))]
    pub async fn check_availability(&self, request: &BookingRequest) -> Result<(), SessionError> {
        let duplicates = find_duplicate_selections(&request.selections);
        if !duplicates.is_empty() {
            let mut reports: Vec<ConflictReport> = Vec::new();
            for dup in duplicates {
                if reports.iter().any(|r| r.index == dup.second) {
                    continue;
                }
                reports.push(ConflictReport {
                    index: dup.second,
                    selection: dup.selection,
                    reason: ConflictReason::DuplicateOf(dup.first),
                });
            }
            warn!(conflicts = reports.len(), "duplicate selections in form");
            return Err(SessionError::Conflicts(reports));
        }

        let checks = request
            .selections
            .iter()
            .map(|selection| self.service.check_availability(selection));
        let results = join_all(checks).await;

        let mut reports = Vec::new();
        for (index, (selection, result)) in request.selections.iter().zip(results).enumerate() {
            if !result? {
                reports.push(ConflictReport {
                    index,
                    selection: selection.clone(),
                    reason: ConflictReason::AlreadyBooked,
                });
            }
        }

        if reports.is_empty() {
            Ok(())
        } else {
            warn!(conflicts = reports.len(), "selections no longer available");
            Err(SessionError::Conflicts(reports))
        }
    }

    /// Validate, verify, re-check and submit the form.
    ///
    /// On success the cached snapshot is invalidated and a fresh one fetched
    /// so the new booking shows up immediately.
    #[instrument(skip(self, input))]
    pub async fn submit(
        &mut self,
        input: &FormInput,
        variant: FormVariant,
    ) -> Result<SubmitReceipt, SessionError> {
        let request = input.validate(variant).map_err(SessionError::Invalid)?;

        let token = acquire_token(
            self.tokens.as_ref(),
            &self.settings.verification_action,
            self.settings.retry,
        )
        .await?;

        self.check_availability(&request).await?;

        let lead = LeadSubmission::new(&request, &token);
        self.service
            .submit(&lead)
            .await
            .map_err(SessionError::Submission)?;
        info!(sessions = request.selections.len(), "booking submitted");

        self.cache.invalidate();
        self.refresh().await;

        Ok(SubmitReceipt {
            selections: request.selections,
            redirect_url: self.settings.redirect_url.clone(),
        })
    }
}
