//! Provides clients and utilities for interacting with external APIs.
//!
//! Includes:
//! - `power`: Client for the NASA POWER daily point API.

mod power;

pub use power::*;
