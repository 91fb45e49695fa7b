//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Sign-up, sign-in and password changes (Argon2id)
//! - `listing` - Pure filters behind the list screens
//! - `reports` - Period summaries, category and contributor shares
//! - `notifications` - Derived per-house notification feed
//! - `relative_time` - "5 menit lalu" style timestamps

pub mod auth;
pub mod listing;
pub mod notifications;
pub mod relative_time;
pub mod reports;
