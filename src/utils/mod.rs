//! Utility modules

pub mod errors;
pub mod logging;
pub mod pagination;

pub use errors::{AppError, Result};
pub use pagination::{EventCursor, PAGE_SIZE};
