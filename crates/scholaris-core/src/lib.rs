//! # Scholaris Core
//!
//! Core types, errors, and utilities for the Scholaris API.
//!
//! - [`errors`]: the error taxonomy shared by every operation, with HTTP response conversion
//! - [`pagination`]: pagination utilities for list endpoints
//! - [`serde`]: custom serde helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use scholaris_core::errors::AppError;
//! use scholaris_core::pagination::PaginationParams;
//!
//! let error = AppError::permission_denied("Teachers cannot delete homework");
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod errors;
pub mod pagination;
pub mod serde;

pub use errors::{AppError, ErrorKind, MessageResponse};
pub use pagination::{PaginationMeta, PaginationParams};
