//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types for 2D gameplay space
//! - Reusable scratch collections for per-tick work
//! - Frame time accounting
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
