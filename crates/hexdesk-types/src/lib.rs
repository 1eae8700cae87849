//! Foundation types for hexdesk.
//!
//! Every other hexdesk crate depends on this one for the shared error
//! taxonomy, configuration, the session (role/difficulty) model, the notices
//! the core raises toward its presentation layer, and the persistence store
//! abstraction.

pub mod config;
pub mod error;
pub mod notice;
pub mod session;
pub mod store;
