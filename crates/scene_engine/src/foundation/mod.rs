//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Handle types for arena-backed collections
//! - Platform time management
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
