pub mod auth_helpers;
pub mod password;
pub mod scope;
