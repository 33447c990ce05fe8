use crate::domain::message::{DispatchRequest, FieldViolation, MessageBody, PhoneNumber};
use serde_json::Value;

const PHONE_REQUIRED: &str = "Phone number is required";
const PHONE_FORMAT: &str = "Phone number must be in E.164 format (e.g., +1234567890)";
const PHONES_REQUIRED: &str = "Phone numbers must be a non-empty array";
const EACH_PHONE_FORMAT: &str = "Each phone number must be in E.164 format (e.g., +1234567890)";
const MESSAGE_REQUIRED: &str = "Message is required";
const MESSAGE_LENGTH: &str = "Message must be between 1 and 4096 characters";

/// A raw JSON field as seen by validation. `null` and `""` both count as missing.
enum Field<'a> {
    Missing,
    Text(&'a str),
    Other(&'a Value),
}

impl<'a> Field<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(s)) if s.is_empty() => Self::Missing,
            Some(Value::String(s)) => Self::Text(s),
            Some(other) => Self::Other(other),
        }
    }
}

/// Checks a single-recipient send. Every failing field is reported, in field order.
///
/// Fields arrive as raw JSON so that a value of the wrong type is reported as a
/// violation of that field rather than rejecting the whole body.
///
/// # Errors
/// Returns the full list of violations when any field is invalid.
pub fn validate_single(
    phone_number: Option<&Value>,
    message: Option<&Value>,
) -> Result<DispatchRequest, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    let recipient = match Field::of(phone_number) {
        Field::Missing => {
            violations.push(FieldViolation::new("phone_number", PHONE_REQUIRED));
            None
        }
        Field::Text(raw) => {
            let parsed = PhoneNumber::parse(raw);
            if parsed.is_none() {
                violations.push(FieldViolation::new("phone_number", PHONE_FORMAT));
            }
            parsed
        }
        Field::Other(_) => {
            violations.push(FieldViolation::new("phone_number", PHONE_FORMAT));
            None
        }
    };
    let body = check_body(message, &mut violations);

    match (recipient, body) {
        (Some(recipient), Some(body)) if violations.is_empty() => Ok(DispatchRequest::Single { recipient, body }),
        _ => Err(violations),
    }
}

/// Checks a multi-recipient send. Each malformed entry is reported as `phone_numbers[i]`.
///
/// # Errors
/// Returns the full list of violations when any field is invalid.
pub fn validate_bulk(
    phone_numbers: Option<&Value>,
    message: Option<&Value>,
) -> Result<DispatchRequest, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    let mut recipients = Vec::new();

    match phone_numbers {
        Some(Value::Array(raw)) if !raw.is_empty() => {
            for (index, entry) in raw.iter().enumerate() {
                match entry.as_str().and_then(PhoneNumber::parse) {
                    Some(parsed) => recipients.push(parsed),
                    None => violations.push(FieldViolation::new(format!("phone_numbers[{index}]"), EACH_PHONE_FORMAT)),
                }
            }
        }
        _ => violations.push(FieldViolation::new("phone_numbers", PHONES_REQUIRED)),
    }
    let body = check_body(message, &mut violations);

    match body {
        Some(body) if violations.is_empty() => Ok(DispatchRequest::Bulk { recipients, body }),
        _ => Err(violations),
    }
}

fn check_body(message: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<MessageBody> {
    match Field::of(message) {
        Field::Missing => {
            violations.push(FieldViolation::new("message", MESSAGE_REQUIRED));
            None
        }
        Field::Text(raw) => {
            let parsed = MessageBody::parse(raw);
            if parsed.is_none() {
                violations.push(FieldViolation::new("message", MESSAGE_LENGTH));
            }
            parsed
        }
        Field::Other(_) => {
            violations.push(FieldViolation::new("message", MESSAGE_LENGTH));
            None
        }
    }
}
