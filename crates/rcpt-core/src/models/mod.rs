//! Result and configuration models.

pub mod config;
pub mod receipt;
