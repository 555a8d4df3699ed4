#![allow(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod provider;
pub mod records;
pub mod state;

pub use config::{DEFAULT_FEEDBACK_TTL, EngineConfig, FormTypeOption, default_form_types};
pub use engine::{FormEngine, SelectOutcome, SubmitOutcome};
pub use error::EngineError;
pub use feedback::{Feedback, FeedbackKind};
pub use provider::{
    CatalogSchemaProvider, DEFAULT_LATENCY, MockSchemaProvider, ProviderError, SchemaCatalog,
    SchemaProvider,
};
pub use records::{RecordId, RecordStore, SubmittedRecord};
pub use state::{EditingState, EngineSnapshot};
