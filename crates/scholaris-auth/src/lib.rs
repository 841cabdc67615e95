//! # Scholaris Auth
//!
//! The identity/session provider: access-token claims, token issue and
//! verification, and the conversion from verified claims into the explicit
//! [`Requester`](scholaris_models::Requester) every policy call receives.
//!
//! ```ignore
//! use scholaris_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(&identity, &jwt_config)?;
//! let requester = verify_token(&token, &jwt_config)?.requester();
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, TokenIdentity};
pub use jwt::{create_access_token, verify_token};
