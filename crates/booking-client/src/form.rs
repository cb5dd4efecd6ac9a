//! Form input as one immutable value, updated through a reducer.
//!
//! A form holds contact details, up to three `(date, slot)` choices, and the
//! terms checkbox. UI callbacks turn user actions into [`FormEvent`]s and
//! replace their `FormInput` with `input.apply(event)`. Validation produces a
//! [`BookingRequest`], the only shape the session accepts for submission.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slot_engine::{Selection, TimeSlot};

/// Most class sessions a single form can book.
pub const MAX_CHOICES: usize = 3;

/// Which booking form is in use, by how many sessions it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormVariant {
    /// One session (`/one`).
    Single,
    /// Two sessions (`/`).
    #[default]
    Double,
    /// Three sessions (`/three`).
    Triple,
}

impl FormVariant {
    pub fn required_choices(self) -> usize {
        match self {
            FormVariant::Single => 1,
            FormVariant::Double => 2,
            FormVariant::Triple => 3,
        }
    }

    /// Map a form route to its variant.
    pub fn from_route(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/one" => Some(FormVariant::Single),
            "" => Some(FormVariant::Double),
            "/three" => Some(FormVariant::Triple),
            _ => None,
        }
    }
}

impl FromStr for FormVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "one" | "single" => Ok(FormVariant::Single),
            "2" | "two" | "double" => Ok(FormVariant::Double),
            "3" | "three" | "triple" => Ok(FormVariant::Triple),
            other => Err(format!("unknown form variant '{}' (expected one, two or three)", other)),
        }
    }
}

/// Who is booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
}

/// One date picker plus its slot dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotChoice {
    pub date: Option<NaiveDate>,
    pub slot: Option<TimeSlot>,
}

/// Text inputs of the contact section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Company,
    Phone,
}

/// A single user action on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    SetContact(ContactField, String),
    /// Pick (or clear) the date of choice `index`.
    SetDate { index: usize, date: Option<NaiveDate> },
    /// Pick (or clear) the slot of choice `index`.
    SetSlot { index: usize, slot: Option<TimeSlot> },
    SetTermsAccepted(bool),
    Reset,
}

/// Everything the user has entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub contact: ContactDetails,
    pub choices: [SlotChoice; MAX_CHOICES],
    pub terms_accepted: bool,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the input with `event` applied.
    ///
    /// Events addressing a choice index past [`MAX_CHOICES`] are ignored.
    /// Moving a choice to a different date clears its slot, since the slots on
    /// offer depend on the weekday.
    pub fn apply(mut self, event: FormEvent) -> Self {
        match event {
            FormEvent::SetContact(field, value) => {
                let target = match field {
                    ContactField::FirstName => &mut self.contact.first_name,
                    ContactField::LastName => &mut self.contact.last_name,
                    ContactField::Email => &mut self.contact.email,
                    ContactField::Company => &mut self.contact.company,
                    ContactField::Phone => &mut self.contact.phone,
                };
                *target = value;
            }
            FormEvent::SetDate { index, date } => {
                if let Some(choice) = self.choices.get_mut(index) {
                    if choice.date != date {
                        choice.slot = None;
                    }
                    choice.date = date;
                }
            }
            FormEvent::SetSlot { index, slot } => {
                if let Some(choice) = self.choices.get_mut(index) {
                    choice.slot = slot;
                }
            }
            FormEvent::SetTermsAccepted(accepted) => self.terms_accepted = accepted,
            FormEvent::Reset => return Self::default(),
        }
        self
    }

    /// Check the input against `variant` and build a submission request.
    ///
    /// Contact values are trimmed. Only the first `required_choices()` choices
    /// are considered; later ones are ignored even if filled in.
    ///
    /// # Errors
    /// Returns every problem found, not just the first.
    pub fn validate(&self, variant: FormVariant) -> Result<BookingRequest, FormErrors> {
        let mut errors = Vec::new();

        let contact = ContactDetails {
            first_name: self.contact.first_name.trim().to_string(),
            last_name: self.contact.last_name.trim().to_string(),
            email: self.contact.email.trim().to_string(),
            company: self.contact.company.trim().to_string(),
            phone: self.contact.phone.trim().to_string(),
        };

        let required = [
            (FormField::FirstName, &contact.first_name),
            (FormField::LastName, &contact.last_name),
            (FormField::Email, &contact.email),
            (FormField::Company, &contact.company),
            (FormField::Phone, &contact.phone),
        ];
        for (field, value) in required {
            if value.is_empty() {
                errors.push(FieldError::new(field, "is required"));
            }
        }
        if !contact.email.is_empty() && !looks_like_email(&contact.email) {
            errors.push(FieldError::new(FormField::Email, "is not a valid e-mail address"));
        }

        let mut selections = Vec::with_capacity(variant.required_choices());
        for (index, choice) in self.choices.iter().take(variant.required_choices()).enumerate() {
            match (choice.date, &choice.slot) {
                (Some(date), Some(slot)) => selections.push(Selection::new(date, slot.clone())),
                (None, _) => errors.push(FieldError::new(FormField::Date(index), "is required")),
                (Some(_), None) => {
                    errors.push(FieldError::new(FormField::Slot(index), "is required"))
                }
            }
        }

        if !self.terms_accepted {
            errors.push(FieldError::new(FormField::Terms, "must be accepted"));
        }

        if errors.is_empty() {
            Ok(BookingRequest {
                contact,
                selections,
            })
        } else {
            Err(FormErrors(errors))
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// A validated form, ready for the availability check and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub contact: ContactDetails,
    /// Between one and [`MAX_CHOICES`] selections, in form order.
    pub selections: Vec<Selection>,
}

/// Form control an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Company,
    Phone,
    Date(usize),
    Slot(usize),
    Terms,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::FirstName => f.write_str("First Name"),
            FormField::LastName => f.write_str("Last Name"),
            FormField::Email => f.write_str("Email"),
            FormField::Company => f.write_str("Company Name"),
            FormField::Phone => f.write_str("Phone Number"),
            FormField::Date(i) => write!(f, "Class Date {}", i + 1),
            FormField::Slot(i) => write!(f, "Program Time {}", i + 1),
            FormField::Terms => f.write_str("Terms"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: FormField, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// All validation problems of one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.iter().map(|e| e.field)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}
