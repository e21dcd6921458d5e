pub mod backend;
pub mod error;
mod models;
mod name;

pub use crate::backend::LinkBackend;
pub use crate::models::{EntryKind, LinkEntry};
pub use crate::name::validate as validate_name;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn LinkBackend + Send + Sync>;
