//! Error handling for the portal server
//!
//! Server-side error type, constructor helpers and the HTTP error body.

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{PortalError, Result};
