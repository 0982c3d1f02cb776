//! LAPDm stack configuration management
//!
//! This crate provides configuration loading and parsing:
//! - TOML configuration file parsing
//! - Stack configuration structures, including LAPDm timer and window parameters

pub mod stack_config;
pub mod toml_config;

pub use stack_config::*;
pub use toml_config::*;
