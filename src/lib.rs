//! auditor - record-level audit trail with field redaction
//!
//! This library records an audit entry for every create, update and delete
//! of a tracked record. Each entry carries the before and after state of the
//! record, filtered through a per-table policy that can drop fields, mask
//! them, or restrict the payload to the fields that actually changed.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `audit`: Diffing, redaction, entry assembly, actor context and stores
//! - `config`: Configuration, audit policies and path management
//! - `error`: Custom error types
//! - `models`: Tracked records (users, posts) and their IDs
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer with audit hooks
//! - `export`: Audit log export (CSV, JSON, YAML)
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use auditor::audit::{ActorContext, Auditor, MemoryAuditStore};
//! use auditor::config::Settings;
//!
//! let auditor = Auditor::new(
//!     Arc::new(MemoryAuditStore::new()),
//!     Settings::default().policy_registry(),
//! );
//! ActorContext::new("admin-123")
//!     .scope(async { service.create(input) })
//!     .await?;
//! auditor.flush().await;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{AuditorError, AuditorResult};
