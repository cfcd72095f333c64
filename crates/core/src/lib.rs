//! Minimart Core - Shared types library.
//!
//! This crate provides the domain vocabulary used by every Minimart component:
//! - `server` - HTTP API, storage adapters and the order workflow
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Postgres encoding is available behind the `postgres`
//! feature so the storage adapters can bind these types directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, usernames,
//!   session tokens and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
