//! # Panix Development Tools
//!
//! Command-line tools for content authors:
//! - Config and override validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
