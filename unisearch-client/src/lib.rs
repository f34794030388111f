pub mod api;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod render;

pub use error::{DirectoryError, ExportError};
