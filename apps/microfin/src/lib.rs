//! # microfin
//!
//! Library side of the microfin binary: the HTTP API, the CLI and policy
//! loading. Split out so integration tests can drive the router directly.

pub mod api;
pub mod cli;
pub mod config;
