//! Request interceptors for the product API.
//!
//! Each route composes the stages it needs explicitly (see
//! [`crate::routes`]):
//!
//! ```text
//! Request → Logger → Authenticator → Validator → Handler → Response
//!             ↓            ↓              ↓
//!       x-request-id   401 Unauth     400 Validation Error
//! ```
//!
//! - **Logger** wraps every request and never short-circuits.
//! - **Authenticator** guards create, update and delete.
//! - **Validator** is a body extractor used by create and update; route
//!   layers run before extractors, so an unauthenticated request is
//!   rejected for auth even when its body is also invalid.
//! - **Errors** renders terminal failures: panics become 500 responses and
//!   development builds get diagnostics attached.

pub mod auth;
pub mod errors;
pub mod logger;
pub mod validate;

pub use auth::{API_KEY_HEADER, ApiKeyAuth};
pub use errors::{handle_panic, render_error_details};
pub use logger::{REQUEST_ID_HEADER, RequestLogLayer};
pub use validate::ValidProduct;
