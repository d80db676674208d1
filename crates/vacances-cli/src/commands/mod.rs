//! Command implementations.

pub mod config;
pub mod run;
pub mod status;
pub mod zones;
