use serde::Serialize;
use tokio::task::JoinHandle;

pub const SCHEMA_LOAD_FAILED: &str = "Failed to load form structure.";
pub const FIX_ERRORS: &str = "Please fix the errors and try again.";
pub const FORM_SUBMITTED: &str = "Form submitted successfully!";
pub const CHANGES_SAVED: &str = "Changes saved successfully!";
pub const ENTRY_DELETED: &str = "Entry deleted successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub message: String,
    pub kind: FeedbackKind,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FeedbackKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FeedbackKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == FeedbackKind::Error
    }
}

/// Holds the visible message together with the task scheduled to clear it.
///
/// Every replacement bumps `seq` and aborts the pending clear task, so a
/// clear only ever applies to the message it was scheduled for.
#[derive(Debug, Default)]
pub(crate) struct FeedbackSlot {
    current: Option<Feedback>,
    seq: u64,
    clear_task: Option<JoinHandle<()>>,
}

impl FeedbackSlot {
    pub(crate) fn current(&self) -> Option<&Feedback> {
        self.current.as_ref()
    }

    pub(crate) fn replace(&mut self, feedback: Feedback) -> u64 {
        self.cancel_pending();
        self.seq += 1;
        self.current = Some(feedback);
        self.seq
    }

    pub(crate) fn arm(&mut self, task: JoinHandle<()>) {
        self.clear_task = Some(task);
    }

    pub(crate) fn clear(&mut self) {
        self.cancel_pending();
        self.seq += 1;
        self.current = None;
    }

    /// Clears the message only if it is still the one tagged `seq`.
    pub(crate) fn clear_if(&mut self, seq: u64) -> bool {
        if self.seq != seq || self.current.is_none() {
            return false;
        }
        self.current = None;
        self.clear_task = None;
        true
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
    }
}

impl Drop for FeedbackSlot {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_sequence_does_not_clear() {
        let mut slot = FeedbackSlot::default();
        let first = slot.replace(Feedback::error(FIX_ERRORS));
        let second = slot.replace(Feedback::success(FORM_SUBMITTED));
        assert!(!slot.clear_if(first));
        assert_eq!(slot.current().map(|f| f.message.as_str()), Some(FORM_SUBMITTED));
        assert!(slot.clear_if(second));
        assert!(slot.current().is_none());
    }

    #[test]
    fn explicit_clear_invalidates_sequence() {
        let mut slot = FeedbackSlot::default();
        let seq = slot.replace(Feedback::success(ENTRY_DELETED));
        slot.clear();
        assert!(!slot.clear_if(seq));
    }
}
