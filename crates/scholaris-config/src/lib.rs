//! # Scholaris Config
//!
//! Configuration structures loaded from environment variables (after `dotenvy`
//! has populated the process environment):
//!
//! - [`jwt`]: access-token signing configuration
//! - [`cors`]: allowed browser origins
//! - [`server`]: bind address and observability switches
//!
//! ```ignore
//! use scholaris_config::{CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
