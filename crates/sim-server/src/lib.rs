//! HTTP host for the telemetry simulator

pub mod api;
pub mod config;
