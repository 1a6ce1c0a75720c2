//! Common utilities for the Koala browser.
//!
//! This crate provides shared infrastructure used by all browser components:
//! - **Warning System** - deduplicated `tracing` warnings for repeated failures

pub mod warning;
