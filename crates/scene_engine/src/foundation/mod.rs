//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and transforms
//! - Name hashing
//! - Frame timing
//! - Logging utilities

pub mod hash;
pub mod logging;
pub mod math;
pub mod time;
