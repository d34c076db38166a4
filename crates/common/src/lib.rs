//! Common utilities for topdon-remote
//!
//! This crate provides functionality shared by the client library, its
//! binary, and the integration tests: the error type, tracing setup, and
//! test helpers.

pub mod error;
pub mod logging;
pub mod test_utils;

pub use error::{Error, Result};
pub use logging::setup_logging;
