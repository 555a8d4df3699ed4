use form_spec::{FieldValues, FormSchema, ProgressSummary, ValidationErrors, progress_summary};
use serde::Serialize;

use crate::error::EngineError;
use crate::feedback::{Feedback, FeedbackSlot};
use crate::records::{RecordId, RecordStore, SubmittedRecord};

/// Whether the form is creating a new record or rewriting an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EditingState {
    #[default]
    NotEditing,
    Editing { index: usize, record: RecordId },
}

impl EditingState {
    pub fn is_editing(&self) -> bool {
        matches!(self, EditingState::Editing { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            EditingState::Editing { index, .. } => Some(*index),
            EditingState::NotEditing => None,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Save Changes"
        } else {
            "Submit"
        }
    }
}

/// Read-only view of everything the presentation layer may show.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub form_type: Option<String>,
    pub loading: bool,
    pub schema: FormSchema,
    pub values: FieldValues,
    pub errors: ValidationErrors,
    pub feedback: Option<Feedback>,
    pub progress: ProgressSummary,
    pub records: Vec<SubmittedRecord>,
    pub editing: EditingState,
}

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) form_type: Option<String>,
    pub(crate) loading: bool,
    pub(crate) schema: FormSchema,
    pub(crate) values: FieldValues,
    pub(crate) errors: ValidationErrors,
    pub(crate) records: RecordStore,
    pub(crate) editing: EditingState,
    pub(crate) feedback: FeedbackSlot,
    pub(crate) fetch_generation: u64,
}

impl EngineState {
    pub(crate) fn active_records(&self) -> &[SubmittedRecord] {
        match &self.form_type {
            Some(form_type) => self.records.records(form_type),
            None => &[],
        }
    }

    pub(crate) fn position_of(&self, id: RecordId) -> Result<usize, EngineError> {
        let form_type = self.form_type.as_deref().ok_or(EngineError::NoActiveForm)?;
        self.records
            .position(form_type, id)
            .ok_or(EngineError::UnknownRecord(id))
    }

    /// Clears everything scoped to the active form type. Records survive.
    pub(crate) fn reset_form(&mut self) {
        self.schema = FormSchema::empty();
        self.values.clear();
        self.errors = ValidationErrors::default();
        self.editing = EditingState::NotEditing;
        self.feedback.clear();
    }

    pub(crate) fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            form_type: self.form_type.clone(),
            loading: self.loading,
            schema: self.schema.clone(),
            values: self.values.clone(),
            errors: self.errors.clone(),
            feedback: self.feedback.current().cloned(),
            progress: progress_summary(&self.schema, &self.values),
            records: self.active_records().to_vec(),
            editing: self.editing,
        }
    }
}
