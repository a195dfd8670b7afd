//! # Feynman Common Library
//!
//! Shared code for the Super Feynman tutor services:
//! - Database initialization, migrations and entity models
//! - Bootstrap configuration loading and root folder resolution
//! - Common error type
//! - Timestamp and UUID helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
