//! JWT claim structures for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use scholaris_models::ids::{ClassId, SchoolId, UserId};
use scholaris_models::{Requester, Role};

/// Claims embedded in an access token.
///
/// Everything the policy layer needs is carried here so authorization never
/// needs a lookup. Class-admin status and `class_ids` are a snapshot taken at
/// login; they refresh with the next token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    /// None for super admins
    pub school_id: Option<SchoolId>,
    #[serde(default)]
    pub is_class_admin: bool,
    #[serde(default)]
    pub class_admin_of: Option<ClassId>,
    /// Student's own class, or the classes of a parent's children
    #[serde(default)]
    pub class_ids: Vec<ClassId>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn requester(&self) -> Requester {
        let requester = Requester::new(self.sub, self.role, self.school_id)
            .with_class_ids(self.class_ids.clone());

        match self.class_admin_of {
            Some(class_id) if self.is_class_admin => requester.with_class_admin_of(class_id),
            _ => requester,
        }
    }
}

/// What the login flow knows about a user when it issues a token.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub school_id: Option<SchoolId>,
    pub class_admin_of: Option<ClassId>,
    pub class_ids: Vec<ClassId>,
}
