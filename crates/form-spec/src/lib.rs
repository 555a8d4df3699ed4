#![allow(missing_docs)]

pub mod progress;
pub mod spec;
pub mod validate;
pub mod values;

pub use progress::{ProgressSummary, progress, progress_summary};
pub use spec::{FieldKind, FieldSchema, FormSchema, FormSchemaDocument, SchemaError};
pub use validate::{validate, validate_field};
pub use values::{FieldValues, ValidationErrors};
