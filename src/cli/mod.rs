//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes the command-line/environment configuration and the `App` that turns
//! it into a running HTTP server.

mod commands;

pub use commands::*;
