//! Adapters: concrete implementations of the ports this crate defines.
//!
//! Reference: SPEC_FULL.md Section 2 (Configuration).

mod config;

pub use config::StaticConfigProvider;

#[cfg(feature = "config-toml")]
pub use config::{ConfigError, TomlConfigProvider};
