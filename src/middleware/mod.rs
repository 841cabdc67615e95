//! Request extractors for authentication and coarse role gates.
//!
//! [`auth::AuthUser`] verifies the bearer token and yields the explicit
//! [`Requester`](scholaris_models::Requester) every service call receives.
//! The `Require*` extractors reject a request before the handler runs when the
//! requester's role can never perform the operation; finer decisions (school,
//! ownership, class) are made by the policy crate inside services.

pub mod auth;
