//! Place and slot identifiers.
//!
//! A slot id has the structural form `"<startDatetime>~<durationMinutes>"`.
//! Capacity rows are keyed by the raw id while confirmations display the
//! decomposed start time, so both parts are kept verbatim next to the parsed
//! values.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const SEPARATOR: char = '~';
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Errors raised when a place or slot identifier is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotIdValidationError {
    #[error("place id must not be empty")]
    EmptyPlaceId,
    #[error("slot id must look like <startDatetime>~<durationMinutes>")]
    MissingSeparator,
    #[error("slot start `{start}` is not an ISO-8601 date-time")]
    InvalidStart { start: String },
    #[error("slot duration `{duration}` is not a positive number of minutes")]
    InvalidDuration { duration: String },
}

/// Identifier of a venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    pub fn new(raw: impl Into<String>) -> Result<Self, SlotIdValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SlotIdValidationError::EmptyPlaceId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PlaceId> for String {
    fn from(value: PlaceId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PlaceId {
    type Error = SlotIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of a bookable time slot within a place.
///
/// # Examples
/// ```
/// use booking::domain::SlotId;
///
/// let slot = SlotId::parse("2026-05-04T18:30:00.000Z~60").expect("valid slot");
/// assert_eq!(slot.start_raw(), "2026-05-04T18:30:00.000Z");
/// assert_eq!(slot.duration_minutes(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotId {
    raw: String,
    split_at: usize,
    starts_at: DateTime<Utc>,
    duration_minutes: u32,
}

impl SlotId {
    /// Split on the first `~` and parse both halves.
    ///
    /// Starts with an offset are converted to UTC; offset-less starts are
    /// read as UTC.
    pub fn parse(raw: &str) -> Result<Self, SlotIdValidationError> {
        let split_at = raw
            .find(SEPARATOR)
            .ok_or(SlotIdValidationError::MissingSeparator)?;
        let (start, duration) = (&raw[..split_at], &raw[split_at + 1..]);

        let starts_at = parse_start(start).ok_or_else(|| SlotIdValidationError::InvalidStart {
            start: start.to_owned(),
        })?;
        let duration_minutes = duration
            .parse::<u32>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| SlotIdValidationError::InvalidDuration {
                duration: duration.to_owned(),
            })?;

        Ok(Self {
            raw: raw.to_owned(),
            split_at,
            starts_at,
            duration_minutes,
        })
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// Start exactly as written in the identifier.
    pub fn start_raw(&self) -> &str {
        &self.raw[..self.split_at]
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }
}

fn parse_start(start: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(start) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(start, format).ok())
        .map(|naive| naive.and_utc())
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<SlotId> for String {
    fn from(value: SlotId) -> Self {
        value.raw
    }
}

impl TryFrom<String> for SlotId {
    type Error = SlotIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
