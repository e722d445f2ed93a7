//! HTTP API: a thin JSON adapter over the item registry.

pub mod app;
pub mod config;
