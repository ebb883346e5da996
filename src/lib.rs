#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
// Snowflake and duration arithmetic converts between integer widths on purpose
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
#[cfg(feature = "discord")]
pub mod discord;
pub mod scan;
pub mod utils;

/// Re-exports for fuzz targets. Not part of the public API.
#[doc(hidden)]
pub mod fuzz_api {
    pub use crate::config::parse_config;
    pub use scrollcheck_core::marker::phrase::parse_after_marker;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
