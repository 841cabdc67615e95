use scholaris_core::AppError;
use scholaris_models::Requester;
use scholaris_models::ids::SchoolId;
use scholaris_policy::{Decision, EntityKind, WriteAction};

use crate::metrics::track_authz_decision;

/// Applies a policy decision: counts it, logs denials and turns them into
/// `PermissionDenied`.
pub fn enforce(
    requester: &Requester,
    entity: EntityKind,
    action: WriteAction,
    decision: Decision,
) -> Result<(), AppError> {
    track_authz_decision(entity.as_str(), action.as_str(), decision.is_allowed());

    if let Some(reason) = decision.reason() {
        tracing::warn!(
            user_id = %requester.user_id,
            role = %requester.role,
            entity = entity.as_str(),
            action = action.as_str(),
            reason,
            "Permission denied"
        );
    }

    decision.into_result()
}

/// The school a write targets. Super admins must name it; everyone else
/// always writes into their own school and `specified` is ignored.
pub fn target_school(
    requester: &Requester,
    specified: Option<SchoolId>,
) -> Result<SchoolId, AppError> {
    if requester.is_super_admin() {
        return specified
            .ok_or_else(|| AppError::bad_request("Super admins must specify school_id"));
    }

    requester
        .school_id
        .ok_or_else(|| AppError::permission_denied("Your account is not attached to a school"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholaris_core::ErrorKind;
    use scholaris_models::Role;
    use scholaris_models::ids::UserId;

    #[test]
    fn test_super_admin_must_name_school() {
        let root = Requester::new(UserId(1), Role::SuperAdmin, None);
        assert_eq!(
            target_school(&root, None).unwrap_err().kind,
            ErrorKind::BadRequest
        );
        assert_eq!(target_school(&root, Some(SchoolId(3))).unwrap(), SchoolId(3));
    }

    #[test]
    fn test_school_users_ignore_specified_school() {
        let admin = Requester::new(UserId(12), Role::SchoolAdmin, Some(SchoolId(2)));
        assert_eq!(target_school(&admin, Some(SchoolId(3))).unwrap(), SchoolId(2));
    }

    #[test]
    fn test_enforce_maps_denial() {
        let teacher = Requester::new(UserId(40), Role::Teacher, Some(SchoolId(2)));
        let err = enforce(
            &teacher,
            EntityKind::Homework,
            WriteAction::Delete,
            scholaris_policy::can_manage_schools(&teacher),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }
}
