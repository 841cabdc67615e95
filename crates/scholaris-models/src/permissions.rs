use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-row write flags returned alongside owned records so clients can show or
/// hide edit/delete controls. Computed by the same function that guards writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecordPermissions {
    pub can_edit: bool,
    pub can_delete: bool,
}
