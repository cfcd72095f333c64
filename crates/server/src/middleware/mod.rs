//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (record on span, tag in Sentry, echo in response)
//!
//! Authentication is not a layer: protected handlers take the
//! [`RequireUser`] or [`RequireAdmin`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::{RequireAdmin, RequireUser, bearer_token};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
