//! Project ownership.
//!
//! A project belongs to exactly one creator. [`Owner`] records which kind of
//! account posted it, and [`OwnerScope`] turns a [`Caller`] into the
//! predicate every "my projects" query uses, so role handling lives here and
//! nowhere else.

use serde::{Deserialize, Serialize};

use super::{Caller, Role, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Owner {
    Organization(UserId),
    Developer(UserId),
    Student(UserId),
}

impl Owner {
    /// Owner to stamp on a new project. Students and unrecognised roles both
    /// post as students.
    pub fn for_caller(caller: &Caller) -> Self {
        let id = caller.id.clone();
        match caller.role {
            Some(Role::Organization) => Owner::Organization(id),
            Some(Role::Developer) => Owner::Developer(id),
            _ => Owner::Student(id),
        }
    }

    pub fn id(&self) -> &UserId {
        match self {
            Owner::Organization(id) | Owner::Developer(id) | Owner::Student(id) => id,
        }
    }

    pub fn is(&self, user: &UserId) -> bool {
        self.id() == user
    }

    /// Label shown as `createdBy`.
    pub fn label(&self) -> &'static str {
        match self {
            Owner::Organization(_) => "Organization",
            Owner::Developer(_) => "Developer",
            Owner::Student(_) => "Student",
        }
    }

    pub fn company_id(&self) -> Option<&UserId> {
        match self {
            Owner::Organization(id) => Some(id),
            _ => None,
        }
    }

    pub fn developer_id(&self) -> Option<&UserId> {
        match self {
            Owner::Developer(id) => Some(id),
            _ => None,
        }
    }

    pub fn student_id(&self) -> Option<&UserId> {
        match self {
            Owner::Student(id) => Some(id),
            _ => None,
        }
    }
}

/// Which projects count as "owned by the caller".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    /// Known role: the owner must be of that kind with the caller's id.
    Exact(Owner),
    /// Unknown or missing role: any owner kind with the caller's id.
    AnyKind(UserId),
}

impl OwnerScope {
    pub fn for_caller(caller: &Caller) -> Self {
        let id = caller.id.clone();
        match caller.role {
            Some(Role::Organization) => OwnerScope::Exact(Owner::Organization(id)),
            Some(Role::Developer) => OwnerScope::Exact(Owner::Developer(id)),
            Some(Role::Student) => OwnerScope::Exact(Owner::Student(id)),
            Some(Role::Other(_)) | None => OwnerScope::AnyKind(id),
        }
    }

    pub fn matches(&self, owner: &Owner) -> bool {
        match self {
            OwnerScope::Exact(expected) => expected == owner,
            OwnerScope::AnyKind(id) => owner.is(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Option<Role>) -> Caller {
        Caller::new("user-1", role)
    }

    #[test]
    fn test_owner_follows_role() {
        assert_eq!(
            Owner::for_caller(&caller(Some(Role::Organization))),
            Owner::Organization("user-1".into())
        );
        assert_eq!(
            Owner::for_caller(&caller(Some(Role::Developer))),
            Owner::Developer("user-1".into())
        );
        assert_eq!(
            Owner::for_caller(&caller(Some(Role::Student))),
            Owner::Student("user-1".into())
        );
    }

    #[test]
    fn test_unknown_role_posts_as_student() {
        let owner = Owner::for_caller(&caller(Some(Role::Other("admin".into()))));
        assert_eq!(owner, Owner::Student("user-1".into()));
        assert_eq!(Owner::for_caller(&caller(None)).label(), "Student");
    }

    #[test]
    fn test_legacy_fields_are_exclusive() {
        let owner = Owner::Organization("org".into());
        assert_eq!(owner.company_id(), Some(&UserId::from("org")));
        assert!(owner.developer_id().is_none());
        assert!(owner.student_id().is_none());
    }

    #[test]
    fn test_exact_scope_requires_matching_kind() {
        let scope = OwnerScope::for_caller(&caller(Some(Role::Developer)));
        assert!(scope.matches(&Owner::Developer("user-1".into())));
        assert!(!scope.matches(&Owner::Student("user-1".into())));
        assert!(!scope.matches(&Owner::Developer("someone-else".into())));
    }

    #[test]
    fn test_unknown_role_scope_matches_any_kind() {
        let scope = OwnerScope::for_caller(&caller(Some(Role::Other("admin".into()))));
        assert!(scope.matches(&Owner::Organization("user-1".into())));
        assert!(scope.matches(&Owner::Developer("user-1".into())));
        assert!(scope.matches(&Owner::Student("user-1".into())));
        assert!(!scope.matches(&Owner::Student("user-2".into())));
    }

    #[test]
    fn test_owner_serializes_as_tagged_value() {
        let json = serde_json::to_value(Owner::Developer("d1".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "developer", "id": "d1" }));
    }
}
