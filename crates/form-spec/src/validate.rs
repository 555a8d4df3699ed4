use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

use crate::spec::field::{FieldKind, FieldSchema};
use crate::spec::form::FormSchema;
use crate::values::{FieldValues, ValidationErrors};

/// Runs every field rule in schema order and returns the full error set.
///
/// At most one message is recorded per field; the required check runs before
/// any type check.
pub fn validate(schema: &FormSchema, values: &FieldValues) -> ValidationErrors {
    schema
        .fields()
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.name))
                .map(|message| (field.name.clone(), message))
        })
        .collect()
}

pub fn validate_field(field: &FieldSchema, value: Option<&str>) -> Option<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();

    if trimmed.is_empty() {
        if field.required {
            return Some(format!("{} is required", field.label));
        }
        return None;
    }

    match field.kind {
        FieldKind::Number if !is_number(trimmed) => {
            Some(format!("{} must be a valid number", field.label))
        }
        FieldKind::Date if !is_calendar_date(trimmed) => {
            Some(format!("{} must be a valid date", field.label))
        }
        FieldKind::Dropdown if !field.options.iter().any(|option| option == trimmed) => {
            Some(format!("{} must be one of the listed options", field.label))
        }
        _ => None,
    }
}

fn is_number(text: &str) -> bool {
    text.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Accepts `YYYY-MM-DD` calendar dates and RFC 3339 timestamps.
fn is_calendar_date(text: &str) -> bool {
    parse_plain_date(text).is_some() || OffsetDateTime::parse(text, &Rfc3339).is_ok()
}

fn parse_plain_date(text: &str) -> Option<Date> {
    let mut parts = text.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }
    if ![year, month, day]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    Date::from_calendar_date(year.parse().ok()?, month, day.parse().ok()?).ok()
}
