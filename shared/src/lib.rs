//! Shared types and workflow rules for the Stockyard platform
//!
//! This crate holds the domain model and the pure parts of the stock workflow
//! (deduction planning, approval and delivery transitions, permissions). It is
//! used by the backend and, through WASM, by the browser UI.

pub mod error;
pub mod models;
pub mod validation;

pub use error::*;
pub use models::*;
pub use validation::*;
