//! Projects and Tasks Dashboard Library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod format;
pub mod logging;
pub mod normalize;
pub mod types;
