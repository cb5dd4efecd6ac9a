//! The external booking service: booked-dates query, availability check and
//! lead submission.

use async_trait::async_trait;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use slot_engine::{format_iso, format_key, BookedMap, Selection};
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::ServiceError;
use crate::form::BookingRequest;
use crate::verify::VerificationToken;

const BOOKED_DATES_PATH: &str = "api/booked-dates";
const CHECK_AVAILABILITY_PATH: &str = "api/check-availability";
const SUBMIT_PATH: &str = "api/intro-to-ai-payment";

/// Operations the form session needs from the backend.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Current snapshot of booked slots per date.
    async fn booked_dates(&self) -> Result<BookedMap, ServiceError>;

    /// Whether `selection` can still be booked, decided by the server.
    async fn check_availability(&self, selection: &Selection) -> Result<bool, ServiceError>;

    /// Persist a lead with its chosen sessions.
    async fn submit(&self, lead: &LeadSubmission) -> Result<(), ServiceError>;
}

/// Wire body of the availability check. Dates use the booked-map key format.
#[derive(Debug, Serialize)]
struct AvailabilityRequest<'a> {
    #[serde(rename = "classDate")]
    class_date: String,
    time: &'a str,
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    /// A missing flag counts as unavailable.
    #[serde(default)]
    available: bool,
}

/// Wire body of a lead submission.
///
/// Sessions are flattened into numbered fields (`classDate`, `classDate2`,
/// `classDate3` and `time`, `time2`, `time3`) with ISO dates. Unused
/// positions are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub your_company: String,
    pub phone_number: String,
    pub time: Option<String>,
    pub time2: Option<String>,
    pub time3: Option<String>,
    pub class_date: Option<String>,
    pub class_date2: Option<String>,
    pub class_date3: Option<String>,
    pub recaptcha_token: String,
}

impl LeadSubmission {
    pub fn new(request: &BookingRequest, token: &VerificationToken) -> Self {
        let time = |i: usize| request.selections.get(i).map(|s| s.slot.to_string());
        let date = |i: usize| request.selections.get(i).map(|s| format_iso(s.date));

        Self {
            first_name: request.contact.first_name.clone(),
            last_name: request.contact.last_name.clone(),
            email: request.contact.email.clone(),
            your_company: request.contact.company.clone(),
            phone_number: request.contact.phone.clone(),
            time: time(0),
            time2: time(1),
            time3: time(2),
            class_date: date(0),
            class_date2: date(1),
            class_date3: date(2),
            recaptcha_token: token.as_str().to_string(),
        }
    }
}

/// [`BookingService`] over HTTP/JSON.
pub struct HttpBookingService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBookingService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Build a client with the configured base URL and request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Turn a non-2xx response into `ServiceError::Api`.
    async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        Err(ServiceError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl BookingService for HttpBookingService {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn booked_dates(&self) -> Result<BookedMap, ServiceError> {
        let response = self.http.get(self.url(BOOKED_DATES_PATH)).send().await?;
        let body: serde_json::Value = Self::ensure_success(response).await?.json().await?;
        let map = BookedMap::from_value(body);
        debug!(dates = map.len(), "fetched booked dates");
        Ok(map)
    }

    #[instrument(skip(self, selection), fields(date = %selection.date, slot = %selection.slot))]
    async fn check_availability(&self, selection: &Selection) -> Result<bool, ServiceError> {
        let body = AvailabilityRequest {
            class_date: format_key(selection.date),
            time: selection.slot.as_str(),
        };
        let response = self
            .http
            .post(self.url(CHECK_AVAILABILITY_PATH))
            .json(&body)
            .send()
            .await?;
        let parsed: AvailabilityResponse = Self::ensure_success(response).await?.json().await?;
        debug!(available = parsed.available, "availability checked");
        Ok(parsed.available)
    }

    #[instrument(skip(self, lead))]
    async fn submit(&self, lead: &LeadSubmission) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.url(SUBMIT_PATH))
            .json(lead)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        debug!("lead submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ContactDetails;
    use chrono::NaiveDate;
    use serde_json::json;

    fn request(selections: Vec<Selection>) -> BookingRequest {
        BookingRequest {
            contact: ContactDetails {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                company: "Engines Ltd".into(),
                phone: "555-0100".into(),
            },
            selections,
        }
    }

    #[test]
    fn lead_uses_numbered_camel_case_fields() {
        let lead = LeadSubmission::new(
            &request(vec![
                Selection::new(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(), "am"),
                Selection::new(NaiveDate::from_ymd_opt(2025, 6, 13).unwrap(), "fri"),
            ]),
            &VerificationToken::new("tok"),
        );

        assert_eq!(
            serde_json::to_value(&lead).unwrap(),
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "yourCompany": "Engines Ltd",
                "phoneNumber": "555-0100",
                "time": "am",
                "time2": "fri",
                "classDate": "2025-06-09",
                "time3": null,
                "classDate2": "2025-06-13",
                "classDate3": null,
                "recaptchaToken": "tok"
            })
        );
    }

    #[test]
    fn availability_request_uses_key_format() {
        let body = AvailabilityRequest {
            class_date: format_key(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()),
            time: "am",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "classDate": "06/09/2025", "time": "am" })
        );
    }

    #[test]
    fn missing_available_flag_means_unavailable() {
        let parsed: AvailabilityResponse = serde_json::from_str("{}").unwrap();
        assert!(!parsed.available);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let service = HttpBookingService::new("http://localhost:5000/");
        assert_eq!(
            service.url(BOOKED_DATES_PATH),
            "http://localhost:5000/api/booked-dates"
        );
    }
}
