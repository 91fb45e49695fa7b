//! Stock Home Core - Shared domain types.
//!
//! This crate provides the types used across all Stock Home components:
//! - `server` - JSON backend for the household inventory client
//! - `cli` - Command-line tools for migrations, users and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Enabling the `postgres` feature adds `sqlx` encode/decode
//! implementations so the same types can be bound to queries directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated emails and house names, and the
//!   enums describing roles, priorities, activity kinds and stock status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
