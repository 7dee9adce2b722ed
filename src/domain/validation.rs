use crate::domain::complaint::{
    ComplaintSubmission, DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, EnrichedComplaint,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

pub const BOOKING_ID_FIELD: &str = "bookingId";
pub const DESCRIPTION_FIELD: &str = "description";
/// Pseudo-field reported when the payload as a whole cannot be read.
pub const BODY_FIELD: &str = "body";

const HYPHENATED_UUID_LEN: usize = 36;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

/// Every problem found in a submission. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed for {} field(s)", errors.len())]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    fn body(reason: impl Into<String>) -> Self {
        Self { errors: vec![FieldError::new(BODY_FIELD, reason)] }
    }

    /// Names of the offending fields, in report order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(|e| e.field)
    }
}

/// Decodes a request body into an untyped payload.
///
/// # Errors
/// Returns a `body` failure if the bytes are not a JSON document.
pub fn parse_payload(bytes: &[u8]) -> Result<Value, ValidationFailure> {
    serde_json::from_slice(bytes).map_err(|e| ValidationFailure::body(format!("invalid JSON: {e}")))
}

/// Validates a raw submission and stamps it with the current UTC time.
///
/// # Errors
/// Returns a `ValidationFailure` listing every invalid field.
pub fn validate(raw: &Value) -> Result<EnrichedComplaint, ValidationFailure> {
    validate_at(raw, OffsetDateTime::now_utc())
}

/// Same as [`validate`] with an explicit receipt time. The timestamp is only
/// applied once every check has passed.
///
/// # Errors
/// Returns a `ValidationFailure` listing every invalid field.
pub fn validate_at(raw: &Value, now: OffsetDateTime) -> Result<EnrichedComplaint, ValidationFailure> {
    let Some(fields) = raw.as_object() else {
        return Err(ValidationFailure::body("expected a JSON object"));
    };

    let booking_id = required(fields, BOOKING_ID_FIELD).and_then(parse_booking_id);
    let description = required(fields, DESCRIPTION_FIELD).and_then(parse_description);

    match (booking_id, description) {
        (Ok(booking_id), Ok(description)) => Ok(ComplaintSubmission { booking_id, description }.enrich(now)),
        (booking_id, description) => {
            let errors = [booking_id.err(), description.err()].into_iter().flatten().collect();
            Err(ValidationFailure { errors })
        }
    }
}

fn required<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, FieldError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(FieldError::new(name, "field required")),
        Some(value) => Ok(value),
    }
}

fn parse_booking_id(value: &Value) -> Result<Uuid, FieldError> {
    let Some(text) = value.as_str() else {
        return Err(FieldError::new(BOOKING_ID_FIELD, "must be a string"));
    };

    // Only the hyphenated 8-4-4-4-12 form is accepted; the uuid parser alone
    // would also take simple, braced and urn forms.
    if text.len() != HYPHENATED_UUID_LEN {
        return Err(FieldError::new(BOOKING_ID_FIELD, "must be a UUID in 8-4-4-4-12 form"));
    }

    Uuid::try_parse(text).map_err(|e| FieldError::new(BOOKING_ID_FIELD, format!("invalid UUID: {e}")))
}

fn parse_description(value: &Value) -> Result<String, FieldError> {
    let Some(text) = value.as_str() else {
        return Err(FieldError::new(DESCRIPTION_FIELD, "must be a string"));
    };

    let length = text.chars().count();
    if length < DESCRIPTION_MIN_CHARS {
        return Err(FieldError::new(
            DESCRIPTION_FIELD,
            format!("must be at least {DESCRIPTION_MIN_CHARS} character(s)"),
        ));
    }
    if length > DESCRIPTION_MAX_CHARS {
        return Err(FieldError::new(
            DESCRIPTION_FIELD,
            format!("must be at most {DESCRIPTION_MAX_CHARS} characters, got {length}"),
        ));
    }

    Ok(text.to_string())
}
