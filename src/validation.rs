//! Appointment conflict validation.
//!
//! Everything here is pure: the caller hands in a snapshot of existing
//! appointments and gets back a verdict. Nothing is read from or written to
//! the database.

use crate::models::{Appointment, AppointmentForm, ClockTime, ParseClockTimeError};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::borrow::Cow;
use std::str::FromStr;

/// Optional restriction of appointments to opening hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub enabled: bool,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            enabled: false,
            open: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
        }
    }
}

impl BusinessHours {
    pub fn permits(&self, start: NaiveTime, end: NaiveTime) -> bool {
        !self.enabled || (start >= self.open && end <= self.close)
    }
}

/// How a trainer name is turned into the key that scopes conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrainerMatch {
    #[default]
    Exact,
    /// Case-insensitive, with surrounding and repeated whitespace ignored.
    Normalized,
}

impl TrainerMatch {
    pub fn scope_key<'a>(self, trainer_name: &'a str) -> Cow<'a, str> {
        match self {
            TrainerMatch::Exact => Cow::Borrowed(trainer_name),
            TrainerMatch::Normalized => Cow::Owned(
                trainer_name
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase(),
            ),
        }
    }
}

impl FromStr for TrainerMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(TrainerMatch::Exact),
            "normalized" => Ok(TrainerMatch::Normalized),
            other => Err(format!("unknown trainer match mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please complete all required fields")]
    MissingField,
    #[error(transparent)]
    MalformedTime(#[from] ParseClockTimeError),
    #[error("start time must be before end time")]
    InvalidTimeRange,
    #[error("appointments must fall between {open} and {close}")]
    OutsideBusinessHours { open: ClockTime, close: ClockTime },
    #[error(
        "{trainer_name} already has an appointment between {start_time} - {end_time} at {school_name}"
    )]
    SchedulingConflict {
        appointment_id: String,
        trainer_name: String,
        school_name: String,
        start_time: ClockTime,
        end_time: ClockTime,
    },
}

impl ValidationError {
    fn conflict_with(apt: &Appointment) -> Self {
        ValidationError::SchedulingConflict {
            appointment_id: apt.id.clone(),
            trainer_name: apt.trainer_name.clone(),
            school_name: apt.school_name.clone(),
            start_time: ClockTime(apt.start_time),
            end_time: ClockTime(apt.end_time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapCheck<'a> {
    pub conflicting: Option<&'a Appointment>,
}

impl OverlapCheck<'_> {
    pub fn has_conflict(&self) -> bool {
        self.conflicting.is_some()
    }
}

/// A form that passed every check, with its times parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAppointment {
    pub trainer_name: String,
    pub school_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub observations: Option<String>,
}

/// `{is_valid, error}` view of a validation result, as returned to the form layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<&Result<T, ValidationError>> for ValidationOutcome {
    fn from(result: &Result<T, ValidationError>) -> Self {
        match result {
            Ok(_) => ValidationOutcome {
                is_valid: true,
                error: None,
            },
            Err(e) => ValidationOutcome {
                is_valid: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Half-open intervals `[start, end)` and `[other_start, other_end)` overlap.
/// Touching endpoints do not count.
pub fn overlaps(
    start: NaiveTime,
    end: NaiveTime,
    other_start: NaiveTime,
    other_end: NaiveTime,
) -> bool {
    start < other_end && other_start < end
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    pub business_hours: BusinessHours,
    pub trainer_match: TrainerMatch,
}

impl Validator {
    /// Looks for an appointment of the same trainer on the same day whose time
    /// range overlaps `[start_time, end_time)`. `exclude_id` skips the
    /// appointment being edited. When several collide, the earliest one is
    /// reported.
    pub fn validate_time_overlap<'a>(
        &self,
        trainer_name: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        existing: &'a [Appointment],
        exclude_id: Option<&str>,
    ) -> OverlapCheck<'a> {
        let key = self.trainer_match.scope_key(trainer_name);
        let conflicting = existing
            .iter()
            .filter(|apt| {
                apt.date == date
                    && Some(apt.id.as_str()) != exclude_id
                    && self.trainer_match.scope_key(&apt.trainer_name) == key
            })
            .filter(|apt| overlaps(start_time, end_time, apt.start_time, apt.end_time))
            .min_by_key(|apt| (apt.start_time, apt.end_time));

        OverlapCheck { conflicting }
    }

    /// Runs the form checks in order and stops at the first failure: required
    /// fields, time syntax, time order, business hours, then overlap.
    pub fn validate_appointment_form(
        &self,
        form: &AppointmentForm,
        existing: &[Appointment],
        exclude_id: Option<&str>,
    ) -> Result<ValidatedAppointment, ValidationError> {
        let required = [
            &form.trainer_name,
            &form.school_name,
            &form.start_time,
            &form.end_time,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ValidationError::MissingField);
        }

        let ClockTime(start_time) = form.start_time.parse()?;
        let ClockTime(end_time) = form.end_time.parse()?;
        if start_time >= end_time {
            return Err(ValidationError::InvalidTimeRange);
        }

        if !self.business_hours.permits(start_time, end_time) {
            return Err(ValidationError::OutsideBusinessHours {
                open: ClockTime(self.business_hours.open),
                close: ClockTime(self.business_hours.close),
            });
        }

        let trainer_name = form.trainer_name.trim();
        let check = self.validate_time_overlap(
            trainer_name,
            form.date,
            start_time,
            end_time,
            existing,
            exclude_id,
        );
        if let Some(apt) = check.conflicting {
            return Err(ValidationError::conflict_with(apt));
        }

        Ok(ValidatedAppointment {
            trainer_name: trainer_name.to_string(),
            school_name: form.school_name.trim().to_string(),
            date: form.date,
            start_time,
            end_time,
            observations: form
                .observations
                .as_deref()
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string),
        })
    }
}
