use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::requester::Requester;
use crate::roles::Role;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NavItem {
    #[schema(value_type = String)]
    pub label: &'static str,
    #[schema(value_type = String)]
    pub path: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NavSection {
    #[schema(value_type = String)]
    pub title: &'static str,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub requester: Requester,
    pub effective_role: Role,
    #[schema(value_type = String)]
    pub tier: &'static str,
    pub navigation: Vec<NavSection>,
}
