use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use form_spec::{FieldValues, FormSchema, ValidationErrors, validate};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, FormTypeOption};
use crate::error::EngineError;
use crate::feedback::{
    CHANGES_SAVED, ENTRY_DELETED, FIX_ERRORS, FORM_SUBMITTED, Feedback, SCHEMA_LOAD_FAILED,
};
use crate::provider::{ProviderError, SchemaProvider};
use crate::records::{RecordId, SubmittedRecord};
use crate::state::{EditingState, EngineSnapshot, EngineState};

/// Result of a form-type selection.
#[derive(Debug)]
pub enum SelectOutcome {
    /// The none-sentinel was selected; no schema is active.
    Cleared,
    Loaded { fields: usize },
    /// The provider failed; the form stays empty and an error message is shown.
    Failed(ProviderError),
    /// A newer selection started while this one was in flight; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created { index: usize, id: RecordId },
    Updated { index: usize, id: RecordId },
    Rejected { errors: ValidationErrors },
}

struct Shared {
    state: Mutex<EngineState>,
    updates: watch::Sender<EngineSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &EngineState) {
        self.updates.send_replace(state.snapshot());
    }
}

/// Schema-driven form state machine.
///
/// Every mutating operation runs under one lock and publishes a fresh
/// [`EngineSnapshot`] to subscribers before returning. The schema fetch is the
/// only suspending step, and only the latest selection's result is applied.
pub struct FormEngine {
    provider: Arc<dyn SchemaProvider>,
    config: EngineConfig,
    shared: Arc<Shared>,
}

impl FormEngine {
    pub fn new(provider: Arc<dyn SchemaProvider>, config: EngineConfig) -> Self {
        let (updates, _) = watch::channel(EngineSnapshot::default());
        Self {
            provider,
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(EngineState::default()),
                updates,
            }),
        }
    }

    pub fn with_provider(provider: impl SchemaProvider + 'static) -> Self {
        Self::new(Arc::new(provider), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn form_types(&self) -> &[FormTypeOption] {
        &self.config.form_types
    }

    /// Receives a snapshot after every state change, including feedback expiry.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn active_form_type(&self) -> Option<String> {
        self.shared.lock().form_type.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock().loading
    }

    pub fn schema(&self) -> FormSchema {
        self.shared.lock().schema.clone()
    }

    pub fn values(&self) -> FieldValues {
        self.shared.lock().values.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        self.shared.lock().errors.clone()
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.shared.lock().feedback.current().cloned()
    }

    pub fn editing(&self) -> EditingState {
        self.shared.lock().editing
    }

    pub fn progress(&self) -> u8 {
        let state = self.shared.lock();
        form_spec::progress(&state.schema, &state.values)
    }

    /// Records of the active form type.
    pub fn records(&self) -> Vec<SubmittedRecord> {
        self.shared.lock().active_records().to_vec()
    }

    pub fn records_for(&self, form_type: &str) -> Vec<SubmittedRecord> {
        self.shared.lock().records.records(form_type).to_vec()
    }

    /// Switches the active form type and loads its schema.
    ///
    /// `None` or a blank id selects nothing. Values, errors, feedback and edit
    /// mode are reset immediately; submitted records are kept.
    pub async fn select_form_type(&self, selection: Option<&str>) -> SelectOutcome {
        let selection = selection
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);

        let generation = {
            let mut state = self.shared.lock();
            state.fetch_generation += 1;
            state.reset_form();
            state.form_type = selection.clone();
            state.loading = selection.is_some();
            self.shared.publish(&state);
            state.fetch_generation
        };

        let Some(form_type) = selection else {
            debug!("form type cleared");
            return SelectOutcome::Cleared;
        };

        debug!(form_type = %form_type, generation, "requesting schema");
        let result = self.provider.fetch_schema(&form_type).await;

        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if state.fetch_generation != generation {
            debug!(
                form_type = %form_type,
                generation,
                latest = state.fetch_generation,
                "discarding stale schema response"
            );
            return SelectOutcome::Superseded;
        }

        state.loading = false;
        let outcome = match result {
            Ok(schema) => {
                info!(form_type = %form_type, fields = schema.len(), "schema loaded");
                let fields = schema.len();
                state.schema = schema;
                SelectOutcome::Loaded { fields }
            }
            Err(err) => {
                warn!(form_type = %form_type, error = %err, "failed to load schema");
                state.schema = FormSchema::empty();
                self.post_feedback(state, Feedback::error(SCHEMA_LOAD_FAILED));
                SelectOutcome::Failed(err)
            }
        };
        self.shared.publish(state);
        outcome
    }

    /// Writes a raw value and drops that field's error without re-validating.
    pub fn set_field_value(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), EngineError> {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if !state.schema.contains(name) {
            return Err(EngineError::UnknownField(name.to_string()));
        }
        state.values.set(name, value);
        state.errors.remove(name);
        self.shared.publish(state);
        Ok(())
    }

    /// Recomputes the error set from scratch and returns whether it is empty.
    pub fn validate(&self) -> bool {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        state.errors = validate(&state.schema, &state.values);
        self.shared.publish(state);
        state.errors.is_empty()
    }

    /// Validates and then either appends a new record or rewrites the record
    /// being edited in place.
    pub fn submit(&self) -> Result<SubmitOutcome, EngineError> {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        let form_type = match &state.form_type {
            Some(form_type) if !state.schema.is_empty() => form_type.clone(),
            _ => return Err(EngineError::NoActiveForm),
        };

        state.errors = validate(&state.schema, &state.values);
        if !state.errors.is_empty() {
            debug!(form_type = %form_type, errors = state.errors.len(), "submission rejected");
            let errors = state.errors.clone();
            self.post_feedback(state, Feedback::error(FIX_ERRORS));
            self.shared.publish(state);
            return Ok(SubmitOutcome::Rejected { errors });
        }

        let (outcome, message) = match state.editing {
            EditingState::NotEditing => {
                let (index, id) = state.records.append(&form_type, state.values.clone());
                info!(form_type = %form_type, index, record = %id, "record created");
                (SubmitOutcome::Created { index, id }, FORM_SUBMITTED)
            }
            EditingState::Editing { index, .. } => {
                let id = state
                    .records
                    .replace(&form_type, index, state.values.clone())?;
                info!(form_type = %form_type, index, record = %id, "record updated");
                (SubmitOutcome::Updated { index, id }, CHANGES_SAVED)
            }
        };

        state.values.clear();
        state.editing = EditingState::NotEditing;
        self.post_feedback(state, Feedback::success(message));
        self.shared.publish(state);
        Ok(outcome)
    }

    /// Loads the record at `index` of the active form type into the form.
    pub fn begin_edit(&self, index: usize) -> Result<(), EngineError> {
        let mut guard = self.shared.lock();
        self.begin_edit_locked(&mut guard, index)
    }

    pub fn begin_edit_record(&self, id: RecordId) -> Result<(), EngineError> {
        let mut guard = self.shared.lock();
        let index = guard.position_of(id)?;
        self.begin_edit_locked(&mut guard, index)
    }

    /// Leaves edit mode and empties the form.
    pub fn cancel_edit(&self) {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        state.editing = EditingState::NotEditing;
        state.values.clear();
        state.errors = ValidationErrors::default();
        self.shared.publish(state);
    }

    /// Removes the record at `index`; later records move up by one.
    ///
    /// Edit mode follows the record it points at: it ends if that record is
    /// deleted and shifts down if an earlier record is.
    pub fn delete_record(&self, index: usize) -> Result<SubmittedRecord, EngineError> {
        let mut guard = self.shared.lock();
        self.delete_record_locked(&mut guard, index)
    }

    pub fn delete_record_by_id(&self, id: RecordId) -> Result<SubmittedRecord, EngineError> {
        let mut guard = self.shared.lock();
        let index = guard.position_of(id)?;
        self.delete_record_locked(&mut guard, index)
    }

    fn begin_edit_locked(
        &self,
        state: &mut EngineState,
        index: usize,
    ) -> Result<(), EngineError> {
        let form_type = state.form_type.clone().ok_or(EngineError::NoActiveForm)?;
        let record = state.records.get(&form_type, index)?;
        state.values = record.values().clone();
        state.editing = EditingState::Editing {
            index,
            record: record.id(),
        };
        debug!(form_type = %form_type, index, "editing record");
        self.shared.publish(state);
        Ok(())
    }

    fn delete_record_locked(
        &self,
        state: &mut EngineState,
        index: usize,
    ) -> Result<SubmittedRecord, EngineError> {
        let form_type = state.form_type.clone().ok_or(EngineError::NoActiveForm)?;
        let removed = state.records.remove(&form_type, index)?;

        state.editing = match state.editing {
            EditingState::Editing { index: editing, .. } if editing == index => {
                debug!(form_type = %form_type, index, "record under edit was deleted");
                EditingState::NotEditing
            }
            EditingState::Editing {
                index: editing,
                record,
            } if editing > index => EditingState::Editing {
                index: editing - 1,
                record,
            },
            other => other,
        };

        info!(form_type = %form_type, index, record = %removed.id(), "record deleted");
        self.post_feedback(state, Feedback::success(ENTRY_DELETED));
        self.shared.publish(state);
        Ok(removed)
    }

    /// Shows `feedback` and schedules its removal after the configured ttl.
    /// Any previously scheduled removal is cancelled.
    fn post_feedback(&self, state: &mut EngineState, feedback: Feedback) {
        let seq = state.feedback.replace(feedback);
        let Ok(runtime) = Handle::try_current() else {
            debug!("no async runtime; feedback stays until replaced");
            return;
        };
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let ttl = self.config.feedback_ttl;
        let task = runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut state = shared.lock();
            if state.feedback.clear_if(seq) {
                debug!(seq, "feedback expired");
                shared.publish(&state);
            }
        });
        state.feedback.arm(task);
    }
}
