//! Agronomy Configuration Module
//!
//! Every constant the recommendation engine uses (crop table, adjustment
//! factors, product grades, schedule splits, score weights, prices) is
//! loaded from TOML with built-in defaults.
//!
//! ## Loading Order
//!
//! 1. `SOILWISE_CONFIG` environment variable (path to TOML file)
//! 2. `agronomy.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(AgronomyConfig::load());
//!
//! // Anywhere in the codebase:
//! let floor = config::get().adjustments.existing_nutrients.floor;
//! ```

mod agronomy_config;
pub mod defaults;
pub mod validation;

pub use agronomy_config::*;

use std::sync::OnceLock;

/// Global agronomy configuration, initialized once at startup.
static AGRONOMY_CONFIG: OnceLock<AgronomyConfig> = OnceLock::new();

/// Initialize the global agronomy configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: AgronomyConfig) {
    if AGRONOMY_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global agronomy configuration.
///
/// Falls back to built-in defaults when `init()` has not been called, so
/// library users and tests can skip initialization.
pub fn get() -> &'static AgronomyConfig {
    AGRONOMY_CONFIG.get_or_init(AgronomyConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    AGRONOMY_CONFIG.get().is_some()
}
