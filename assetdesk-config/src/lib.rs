//! Shared configuration library for assetdesk.
//!
//! Centralizes browser tuning defaults, file/env loading and the guard rails
//! applied before a configuration is handed to the core.

pub mod models;
pub mod validation;

pub use models::browser::{
    BrowserConfig, BrowserConfigSource, CONFIG_JSON_ENV, CONFIG_PATH_ENV,
    ConfigFormat,
};
pub use validation::{
    ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};
