//! Shared utilities for Huddle binaries and libraries.

pub mod logger;
pub mod time;
