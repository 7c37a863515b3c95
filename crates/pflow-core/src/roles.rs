//! Role codes known to the project-flow server.
//!
//! A user carries exactly one role; its code is the only input to
//! permission and route admission decisions.

/// System administrator.
pub const ADMIN: &str = "admin";

/// Department manager.
pub const DEPT_MANAGER: &str = "dept_manager";

/// Team leader.
pub const TEAM_LEADER: &str = "team_leader";

/// Team member.
pub const TEAM_MEMBER: &str = "team_member";

/// Every role code, most privileged first.
pub const ALL: [&str; 4] = [ADMIN, DEPT_MANAGER, TEAM_LEADER, TEAM_MEMBER];
