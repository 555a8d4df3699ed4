pub mod field;
pub mod form;

pub use field::{FieldKind, FieldSchema};
pub use form::{FormSchema, FormSchemaDocument, SchemaError};
