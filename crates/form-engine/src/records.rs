use std::collections::BTreeMap;
use std::fmt;

use form_spec::FieldValues;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Stable identity of a submitted record. Survives in-place edits and is
/// never reused, unlike the record's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Frozen copy of the form values taken at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedRecord {
    id: RecordId,
    values: FieldValues,
}

impl SubmittedRecord {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name)
    }
}

/// Submitted records grouped by form type, in submission order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<String, Vec<SubmittedRecord>>,
}

impl RecordStore {
    pub fn records(&self, form_type: &str) -> &[SubmittedRecord] {
        self.records
            .get(form_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get(&self, form_type: &str, index: usize) -> Result<&SubmittedRecord, EngineError> {
        let records = self.records(form_type);
        records.get(index).ok_or(EngineError::InvalidIndex {
            index,
            len: records.len(),
        })
    }

    pub fn position(&self, form_type: &str, id: RecordId) -> Option<usize> {
        self.records(form_type)
            .iter()
            .position(|record| record.id == id)
    }

    pub fn append(&mut self, form_type: &str, values: FieldValues) -> (usize, RecordId) {
        let id = RecordId::new();
        let records = self.records.entry(form_type.to_string()).or_default();
        records.push(SubmittedRecord { id, values });
        (records.len() - 1, id)
    }

    /// Swaps the values of the record at `index`, keeping its position and id.
    pub fn replace(
        &mut self,
        form_type: &str,
        index: usize,
        values: FieldValues,
    ) -> Result<RecordId, EngineError> {
        let len = self.len(form_type);
        let record = self
            .records
            .get_mut(form_type)
            .and_then(|records| records.get_mut(index))
            .ok_or(EngineError::InvalidIndex { index, len })?;
        record.values = values;
        Ok(record.id)
    }

    /// Removes the record at `index`; later records move up by one.
    pub fn remove(
        &mut self,
        form_type: &str,
        index: usize,
    ) -> Result<SubmittedRecord, EngineError> {
        let len = self.len(form_type);
        match self.records.get_mut(form_type) {
            Some(records) if index < records.len() => Ok(records.remove(index)),
            _ => Err(EngineError::InvalidIndex { index, len }),
        }
    }

    pub fn len(&self, form_type: &str) -> usize {
        self.records(form_type).len()
    }
}
