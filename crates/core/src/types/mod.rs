//! Core types for Stock Home.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod house_name;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use house_name::{HouseName, HouseNameError};
pub use id::*;
pub use status::*;
