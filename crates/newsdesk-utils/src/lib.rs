//! Shared utilities for newsdesk
//!
//! This crate provides the functionality every other crate in the workspace
//! leans on: tracing setup and the environment-backed [`Settings`] the server
//! is started with.

pub mod logging;
pub mod settings;

pub use logging::{LogFormat, init_tracing, init_tracing_with};
pub use settings::{Settings, SettingsBuilder, SettingsError};
