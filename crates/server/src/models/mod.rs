//! Domain models for Stock Home.
//!
//! Repositories in `crate::db` decode rows into these, through private row
//! structs where a column needs validating on the way out.

pub mod activity;
pub mod house;
pub mod membership;
pub mod profile;
pub mod shopping;
pub mod stock_item;
pub mod user;

pub use activity::{Activity, NewActivity};
pub use house::{House, HouseSummary};
pub use membership::Member;
pub use profile::{NotificationPreferences, Profile};
pub use shopping::{NewShoppingEntry, ShoppingEntry};
pub use stock_item::{NewStockItem, StockItem, StockItemChanges};
pub use user::{CurrentUser, User, session_keys};
