use thiserror::Error;

use crate::records::RecordId;

/// Contract violations raised by engine operations. State is left untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no form is loaded")]
    NoActiveForm,
    #[error("field '{0}' is not part of the active form")]
    UnknownField(String),
    #[error("record index {index} is out of range ({len} records)")]
    InvalidIndex { index: usize, len: usize },
    #[error("record {0} does not belong to the active form type")]
    UnknownRecord(RecordId),
}
