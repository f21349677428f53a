//! Configuration module for auditor
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Audit policy persistence

pub mod paths;
pub mod settings;

pub use paths::AuditorPaths;
pub use settings::Settings;
