//! Defines the data structures and models used throughout the application.
//!
//! This includes the validated query, the provider's daily records, and the
//! payloads returned by the HTTP endpoints.

mod climate;

pub use climate::*;
