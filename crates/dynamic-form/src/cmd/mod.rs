pub mod forms;
pub mod run;
pub mod schema;
pub mod validate;
