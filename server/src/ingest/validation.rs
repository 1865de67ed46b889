//! Inbound Message Validation
//!
//! Turns a raw webhook body into a [`ValidMessage`]. Structural problems (bad
//! JSON, missing or mistyped fields) are reported by serde; field contracts are
//! small predicates composed through `validator`.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationError as FieldError, ValidationErrors};

use crate::db::NewMessage;

/// Candidate message as sent by the caller. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InboundMessage {
    #[validate(length(min = 1, message = "message_id must not be empty"))]
    pub message_id: String,
    #[validate(custom(function = "validate_msisdn"))]
    pub from: String,
    #[validate(custom(function = "validate_msisdn"))]
    pub to: String,
    #[validate(custom(function = "validate_utc_timestamp"))]
    pub ts: String,
    #[validate(length(max = 4096, message = "text must be at most 4096 characters"))]
    pub text: Option<String>,
}

/// Reasons a webhook body is rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Body is not a JSON object with the required string fields.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Body parsed but at least one field breaks its contract.
    #[error("{errors}")]
    Invalid {
        message_id: String,
        errors: ValidationErrors,
    },
}

impl ValidationError {
    /// The caller's `message_id`, when the body got far enough to have one.
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Malformed(_) => None,
            Self::Invalid { message_id, .. } => Some(message_id.as_str()),
        }
    }
}

/// A message whose every field has passed validation.
///
/// Only [`parse_and_validate`] and [`ValidMessage::try_from`] construct it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMessage {
    message_id: String,
    from: String,
    to: String,
    ts: String,
    text: Option<String>,
}

impl ValidMessage {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn from_msisdn(&self) -> &str {
        &self.from
    }

    pub fn ts(&self) -> &str {
        &self.ts
    }

    /// Borrow as an insertable row.
    pub fn as_new_message(&self) -> NewMessage<'_> {
        NewMessage {
            message_id: &self.message_id,
            from_msisdn: &self.from,
            to_msisdn: &self.to,
            ts: &self.ts,
            text: self.text.as_deref(),
        }
    }
}

impl TryFrom<InboundMessage> for ValidMessage {
    type Error = ValidationError;

    fn try_from(candidate: InboundMessage) -> Result<Self, Self::Error> {
        if let Err(errors) = candidate.validate() {
            return Err(ValidationError::Invalid {
                message_id: candidate.message_id,
                errors,
            });
        }

        Ok(Self {
            message_id: candidate.message_id,
            from: candidate.from,
            to: candidate.to,
            ts: candidate.ts,
            text: candidate.text,
        })
    }
}

/// Parse a raw JSON body and validate every field.
pub fn parse_and_validate(body: &[u8]) -> Result<ValidMessage, ValidationError> {
    let candidate: InboundMessage =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    ValidMessage::try_from(candidate)
}

// ============================================================================
// Field predicates
// ============================================================================

fn field_error(code: &'static str, message: &'static str) -> FieldError {
    FieldError::new(code).with_message(Cow::Borrowed(message))
}

/// `+` followed by one or more ASCII digits.
pub fn validate_msisdn(value: &str) -> Result<(), FieldError> {
    let Some(digits) = value.strip_prefix('+') else {
        return Err(field_error("msisdn_prefix", "must start with +"));
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(field_error(
            "msisdn_digits",
            "must contain only digits after +",
        ));
    }
    Ok(())
}

/// ISO-8601 date-time ending in a literal `Z`.
///
/// The suffix check runs first, so numeric offsets such as `+05:30` or
/// `+00:00` are rejected even though they are valid ISO-8601.
pub fn validate_utc_timestamp(value: &str) -> Result<(), FieldError> {
    let Some(local) = value.strip_suffix('Z') else {
        return Err(field_error("ts_not_utc", "must end with Z"));
    };

    if parse_iso_datetime(local).is_some() {
        Ok(())
    } else {
        Err(field_error(
            "ts_invalid",
            "must be a valid ISO-8601 UTC timestamp",
        ))
    }
}

/// Calendar date and time of day joined by `T`, each in extended
/// (`2025-01-15`, `10:00:00.5`) or basic (`20250115`, `100000.5`) form.
///
/// The time may stop at hours or minutes. Fractions need seconds and are kept
/// to nanosecond precision. Second `60` is not a valid instant.
fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let (date, time) = value.split_once('T')?;
    Some(NaiveDateTime::new(parse_date(date)?, parse_time(time)?))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let (year, month, day) = match value.as_bytes() {
        [_, _, _, _, b'-', _, _, b'-', _, _] => {
            (value.get(0..4)?, value.get(5..7)?, value.get(8..10)?)
        }
        [_, _, _, _, _, _, _, _] => (value.get(0..4)?, value.get(4..6)?, value.get(6..8)?),
        _ => return None,
    };
    // Year 0 is not a calendar year
    let year = i32::try_from(digits(year)?).ok().filter(|&y| y >= 1)?;
    NaiveDate::from_ymd_opt(year, digits(month)?, digits(day)?)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let (clock, fraction) = match value.split_once(['.', ',']) {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (value, None),
    };

    let (hour, minute, second) = match clock.as_bytes() {
        [_, _] => (clock, None, None),
        [_, _, b':', _, _] => (clock.get(0..2)?, clock.get(3..5), None),
        [_, _, b':', _, _, b':', _, _] => (clock.get(0..2)?, clock.get(3..5), clock.get(6..8)),
        [_, _, _, _] => (clock.get(0..2)?, clock.get(2..4), None),
        [_, _, _, _, _, _] => (clock.get(0..2)?, clock.get(2..4), clock.get(4..6)),
        _ => return None,
    };

    let nanos = match fraction {
        Some(_) if second.is_none() => return None,
        Some(fraction) => fraction_nanos(fraction)?,
        None => 0,
    };

    NaiveTime::from_hms_nano_opt(
        digits(hour)?,
        minute.map_or(Some(0), digits)?,
        second.map_or(Some(0), digits)?,
        nanos,
    )
    // chrono represents a leap second as nanos >= 1s
    .filter(|t| t.nanosecond() < 1_000_000_000)
}

/// Decimal fraction of a second; digits past nanoseconds are dropped.
fn fraction_nanos(fraction: &str) -> Option<u32> {
    if !is_digits(fraction) {
        return None;
    }
    let kept = fraction.get(..fraction.len().min(9))?;
    let scale = 10u32.pow(9 - kept.len() as u32);
    Some(digits(kept)? * scale)
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Unsigned ASCII decimal, at least one digit.
fn digits(value: &str) -> Option<u32> {
    if !is_digits(value) {
        return None;
    }
    value.parse().ok()
}
