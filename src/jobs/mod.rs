//! Background jobs module
//!
//! Long-running tasks spawned alongside the HTTP server: the auto-completion
//! sweep and the change notification dispatcher.

pub mod dispatcher;
pub mod sweep;

pub use dispatcher::{classify, ChangeDispatcher, Notification};
pub use sweep::AutoCompletionSweep;
