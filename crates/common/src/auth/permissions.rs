//! Centralized authorization decision table
//!
//! Every mutating request is checked twice: once at the class level
//! before the target row is loaded, and once at the object level after.
//! A request that passes the class gate but fails the object gate is
//! rejected, never downgraded.

use crate::auth::Identity;
use crate::errors::{ApiError, Result};
use uuid::Uuid;

/// Request verb, collapsed to what the policy distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Read-only verbs are "safe": open resources allow them anonymously
    pub fn is_safe(&self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// Resource class the policy matrix is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The /users collection (admin surface)
    Users,

    /// The caller's own /users/me profile
    OwnProfile,

    /// Categories, genres, and titles
    Catalog,

    Reviews,

    Comments,
}

/// Class-level gate: can this caller reach this operation at all,
/// independent of a specific object
pub fn class_permits(caller: Option<&Identity>, scope: Scope, action: Action) -> bool {
    match scope {
        Scope::Users => caller.is_some_and(Identity::is_admin_or_staff),
        Scope::OwnProfile => caller.is_some(),
        Scope::Catalog => action.is_safe() || caller.is_some_and(Identity::is_admin),
        Scope::Reviews | Scope::Comments => action.is_safe() || caller.is_some(),
    }
}

/// Object-level gate: given a resolved resource, does the caller's role
/// or relationship to it grant the action
pub fn object_permits(caller: &Identity, action: Action, author_id: Uuid) -> bool {
    action.is_safe() || caller.is_privileged() || caller.id == author_id
}

/// Class-level gate as a Result, for use in handlers
pub fn require_class(caller: Option<&Identity>, scope: Scope, action: Action) -> Result<()> {
    if class_permits(caller, scope, action) {
        Ok(())
    } else {
        Err(ApiError::Forbidden {
            message: "You do not have permission to perform this action".to_string(),
        })
    }
}

/// Object-level gate as a Result, for use in handlers
pub fn require_object(caller: &Identity, action: Action, author_id: Uuid) -> Result<()> {
    if object_permits(caller, action, author_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden {
            message: "You do not have permission to modify this object".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Role;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "caller".to_string(),
            role,
            is_staff: false,
        }
    }

    fn staff() -> Identity {
        Identity {
            is_staff: true,
            ..identity(Role::User)
        }
    }

    const MUTATIONS: [Action; 3] = [Action::Create, Action::Update, Action::Delete];

    #[test]
    fn test_users_collection_is_admin_or_staff_only() {
        let admin = identity(Role::Admin);
        let staff = staff();

        for action in [Action::List, Action::Retrieve, Action::Create, Action::Update, Action::Delete] {
            assert!(class_permits(Some(&admin), Scope::Users, action));
            assert!(class_permits(Some(&staff), Scope::Users, action));
            assert!(!class_permits(Some(&identity(Role::User)), Scope::Users, action));
            assert!(!class_permits(Some(&identity(Role::Moderator)), Scope::Users, action));
            assert!(!class_permits(None, Scope::Users, action));
        }
    }

    #[test]
    fn test_own_profile_requires_authentication_only() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            let caller = identity(role);
            assert!(class_permits(Some(&caller), Scope::OwnProfile, Action::Retrieve));
            assert!(class_permits(Some(&caller), Scope::OwnProfile, Action::Update));
        }
        assert!(!class_permits(None, Scope::OwnProfile, Action::Retrieve));
    }

    #[test]
    fn test_catalog_reads_are_open_to_anyone() {
        for caller in [None, Some(identity(Role::User))] {
            assert!(class_permits(caller.as_ref(), Scope::Catalog, Action::List));
            assert!(class_permits(caller.as_ref(), Scope::Catalog, Action::Retrieve));
        }
    }

    #[test]
    fn test_catalog_writes_are_admin_only() {
        let admin = identity(Role::Admin);

        for action in MUTATIONS {
            assert!(class_permits(Some(&admin), Scope::Catalog, action));
            assert!(!class_permits(Some(&identity(Role::User)), Scope::Catalog, action));
            assert!(!class_permits(Some(&identity(Role::Moderator)), Scope::Catalog, action));
            assert!(!class_permits(None, Scope::Catalog, action));
        }
    }

    #[test]
    fn test_staff_without_admin_role_cannot_write_catalog() {
        // The catalog gate keys on the admin role, not the staff flag
        for action in MUTATIONS {
            assert!(!class_permits(Some(&staff()), Scope::Catalog, action));
        }
    }

    #[test]
    fn test_review_and_comment_reads_are_open() {
        for scope in [Scope::Reviews, Scope::Comments] {
            assert!(class_permits(None, scope, Action::List));
            assert!(class_permits(None, scope, Action::Retrieve));
        }
    }

    #[test]
    fn test_review_and_comment_writes_require_authentication() {
        for scope in [Scope::Reviews, Scope::Comments] {
            for action in MUTATIONS {
                assert!(!class_permits(None, scope, action));
                assert!(class_permits(Some(&identity(Role::User)), scope, action));
            }
        }
    }

    #[test]
    fn test_object_gate_allows_author() {
        let caller = identity(Role::User);
        assert!(object_permits(&caller, Action::Update, caller.id));
        assert!(object_permits(&caller, Action::Delete, caller.id));
    }

    #[test]
    fn test_object_gate_rejects_non_author_plain_user() {
        let caller = identity(Role::User);
        let other = Uuid::new_v4();
        assert!(!object_permits(&caller, Action::Update, other));
        assert!(!object_permits(&caller, Action::Delete, other));
    }

    #[test]
    fn test_object_gate_allows_moderator_admin_staff_on_foreign_objects() {
        let other = Uuid::new_v4();
        assert!(object_permits(&identity(Role::Moderator), Action::Delete, other));
        assert!(object_permits(&identity(Role::Admin), Action::Update, other));
        assert!(object_permits(&staff(), Action::Delete, other));
    }

    #[test]
    fn test_object_gate_always_allows_safe_reads() {
        let caller = identity(Role::User);
        assert!(object_permits(&caller, Action::Retrieve, Uuid::new_v4()));
        assert!(object_permits(&caller, Action::List, Uuid::new_v4()));
    }

    #[test]
    fn test_class_pass_object_fail_is_forbidden() {
        // A plain user may reach review mutation as a class, but the
        // object gate on someone else's review must still reject.
        let caller = identity(Role::User);
        assert!(class_permits(Some(&caller), Scope::Reviews, Action::Update));
        assert!(require_object(&caller, Action::Update, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_require_class_maps_to_forbidden() {
        let err = require_class(Some(&identity(Role::User)), Scope::Catalog, Action::Create)
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { .. }));
    }
}
