//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (read or generate `x-request-id`)
//! 4. CORS
//!
//! Authentication is not a layer: handlers opt in with the
//! [`CurrentUser`] and [`RequireAdmin`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, RequireAdmin, bearer_token, ensure_owner, ensure_owner_or_admin};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
