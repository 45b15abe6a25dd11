//! Core functionality module
//!
//! This module contains the ambient machinery shared by every component:
//! configuration, error handling and the host key-value storage abstraction.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `storage` - Key-value storage trait with JSON-file and in-memory backends

pub mod config;
pub mod error;
pub mod storage;
