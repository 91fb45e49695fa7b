//! HTTP middleware stack for the server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (records into the span)
//! 4. Session layer (tower-sessions with `PostgreSQL` store, signed cookie)
//! 5. Rate limiting on the auth routes (governor)
//!
//! Authentication and house resolution are extractors rather than layers:
//! [`RequireAuth`] and [`HouseContext`].

pub mod auth;
pub mod house;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAuth, clear_current_user, set_current_user};
pub use house::HouseContext;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::{SessionLayer, create_session_layer};
