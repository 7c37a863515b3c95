//! Role-derived permissions.
//!
//! The server grants one role per user; what that role may do in the UI is
//! a fixed table keyed on the role code.

use pflow_core::roles;
use pflow_store::SessionStore;

/// What the current user may do, derived from their role code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permissions {
    role: String,
}

impl Permissions {
    /// Permissions for an explicit role code.
    #[must_use]
    pub fn for_role(code: impl Into<String>) -> Self {
        Self { role: code.into() }
    }

    /// Permissions of whoever is currently logged in. An unauthenticated
    /// session has none.
    #[must_use]
    pub fn current(session: &SessionStore) -> Self {
        Self::for_role(session.role_code())
    }

    /// The role code these permissions derive from.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    fn role_in(&self, allowed: &[&str]) -> bool {
        !self.role.is_empty() && allowed.contains(&self.role.as_str())
    }

    /// System administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role_in(&[roles::ADMIN])
    }

    /// Department manager.
    #[must_use]
    pub fn is_dept_manager(&self) -> bool {
        self.role_in(&[roles::DEPT_MANAGER])
    }

    /// Team leader.
    #[must_use]
    pub fn is_team_leader(&self) -> bool {
        self.role_in(&[roles::TEAM_LEADER])
    }

    /// Team member.
    #[must_use]
    pub fn is_team_member(&self) -> bool {
        self.role_in(&[roles::TEAM_MEMBER])
    }

    /// Create, edit and disable user accounts.
    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.is_admin()
    }

    /// Start new projects. Reserved for the people doing the work.
    #[must_use]
    pub fn can_create_project(&self) -> bool {
        self.role_in(&[roles::TEAM_LEADER, roles::TEAM_MEMBER])
    }

    /// Browse the operation log.
    #[must_use]
    pub fn can_view_logs(&self) -> bool {
        self.is_admin()
    }

    /// Add and edit knowledge-base entries.
    #[must_use]
    pub fn can_manage_knowledge(&self) -> bool {
        self.role_in(&roles::ALL)
    }

    /// Approve, archive and reassign projects.
    #[must_use]
    pub fn can_manage_project(&self) -> bool {
        self.role_in(&[roles::ADMIN, roles::DEPT_MANAGER])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pflow_core::{Role, User};
    use pflow_store::MemoryStorage;

    #[test]
    fn admin_permissions() {
        let p = Permissions::for_role(roles::ADMIN);
        assert!(p.is_admin());
        assert!(p.can_manage_users());
        assert!(p.can_view_logs());
        assert!(p.can_manage_project());
        assert!(p.can_manage_knowledge());
        assert!(!p.can_create_project());
    }

    #[test]
    fn team_member_permissions() {
        let p = Permissions::for_role(roles::TEAM_MEMBER);
        assert!(p.is_team_member());
        assert!(p.can_create_project());
        assert!(p.can_manage_knowledge());
        assert!(!p.can_manage_users());
        assert!(!p.can_view_logs());
        assert!(!p.can_manage_project());
    }

    #[test]
    fn dept_manager_and_team_leader() {
        let manager = Permissions::for_role(roles::DEPT_MANAGER);
        assert!(manager.is_dept_manager());
        assert!(manager.can_manage_project());
        assert!(!manager.can_create_project());

        let leader = Permissions::for_role(roles::TEAM_LEADER);
        assert!(leader.is_team_leader());
        assert!(leader.can_create_project());
        assert!(!leader.can_manage_project());
    }

    #[test]
    fn unknown_or_missing_role_grants_nothing() {
        for p in [Permissions::for_role(""), Permissions::for_role("auditor")] {
            assert!(!p.is_admin());
            assert!(!p.can_manage_knowledge());
            assert!(!p.can_create_project());
        }
    }

    #[test]
    fn current_follows_session() {
        let store = SessionStore::load(Arc::new(MemoryStorage::new()));
        assert_eq!(Permissions::current(&store).role(), "");

        let user = User {
            role: Some(Role::new(roles::DEPT_MANAGER, "Department manager")),
            ..User::default()
        };
        store.set("abc", user).unwrap();
        assert!(Permissions::current(&store).can_manage_project());

        store.clear().unwrap();
        assert!(!Permissions::current(&store).can_manage_project());
    }
}
