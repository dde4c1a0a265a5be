//! Noise Control — per-tab audio indicators for a tabbed browser.
//!
//! Tab probers report media activity, the indicator registry keeps the
//! authoritative per-tab state and renders it, and sidebar views mirror it.
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
pub mod ui;
