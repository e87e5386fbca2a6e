// Application layer - the operations any front end (CLI, TUI, API) calls.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
