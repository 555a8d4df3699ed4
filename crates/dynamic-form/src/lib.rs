#![allow(missing_docs)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod logging;
pub mod render;

pub use config::{AppConfig, ProviderConfig};
pub use render::render_text;
