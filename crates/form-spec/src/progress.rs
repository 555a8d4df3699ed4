use serde::Serialize;

use crate::spec::form::FormSchema;
use crate::values::FieldValues;

/// Completion counters over the required fields of a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub required: usize,
    pub percent: u8,
}

impl ProgressSummary {
    pub fn is_complete(&self) -> bool {
        self.completed == self.required
    }
}

pub fn progress_summary(schema: &FormSchema, values: &FieldValues) -> ProgressSummary {
    let (required, completed) = schema
        .required_fields()
        .fold((0usize, 0usize), |(required, completed), field| {
            let filled = usize::from(values.is_filled(&field.name));
            (required + 1, completed + filled)
        });
    ProgressSummary {
        completed,
        required,
        percent: percent(completed, required),
    }
}

/// Percentage of required fields holding a non-blank value, rounded half up.
/// Zero when the schema has no required fields; 100 only once every required
/// field is filled.
pub fn progress(schema: &FormSchema, values: &FieldValues) -> u8 {
    progress_summary(schema, values).percent
}

fn percent(completed: usize, required: usize) -> u8 {
    if required == 0 {
        return 0;
    }
    // round(100 * c / r) == floor((200 * c + r) / (2 * r))
    let value = (200 * completed + required) / (2 * required);
    let cap = if completed < required { 99 } else { 100 };
    u8::try_from(value.min(cap)).unwrap_or(cap as u8)
}

#[cfg(test)]
mod tests {
    use super::percent;

    #[test]
    fn rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 4), 0);
        assert_eq!(percent(4, 4), 100);
    }

    #[test]
    fn incomplete_never_reaches_full() {
        assert_eq!(percent(199, 200), 99);
        assert_eq!(percent(200, 200), 100);
    }

    #[test]
    fn no_required_fields_is_zero() {
        assert_eq!(percent(0, 0), 0);
    }
}
