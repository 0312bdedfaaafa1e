//! # sss-control — Token Control Plane
//!
//! The outermost library crate. [`TokenControlPlane`] is the explicit
//! per-token handle the CLI, an API layer, or an execution environment
//! drives; there is no ambient global state, so any number of tokens can be
//! controlled side by side in one process.
//!
//! Every committed operation lands in the [`Journal`]; rejected operations
//! leave the journal and every record untouched.

pub mod journal;
pub mod plane;

pub use journal::{ControlEvent, Journal, JournalEntry};
pub use plane::TokenControlPlane;
