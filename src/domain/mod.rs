//! Core authorization model: roles, actions, and the policy table that maps
//! one to the other.
//!
//! Every permission decision in the crate goes through [`Role::allows`];
//! endpoints never hard-code role membership checks.

use serde::{Deserialize, Serialize};

/// Per-project role attached to a (user, project) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Write,
    Read,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Write => "write",
            Self::Read => "read",
        }
    }

    /// Parses the stored role string. Unknown strings yield `None`, which
    /// downstream treats as no access.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "write" => Some(Self::Write),
            "read" => Some(Self::Read),
            _ => None,
        }
    }

    /// The policy table. Admin may do everything; write may read and write
    /// secrets; read may only read.
    #[must_use]
    pub const fn allows(self, action: Action) -> bool {
        match (self, action) {
            (Self::Admin, _)
            | (Self::Write, Action::ReadSecret | Action::WriteSecret)
            | (Self::Read, Action::ReadSecret) => true,
            _ => false,
        }
    }
}

/// Everything a caller can ask of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadSecret,
    WriteSecret,
    ManageTokens,
    ManagePermissions,
}

/// Resolved caller identity, one per request.
///
/// The two authentication paths (stateless session assertion vs. stored
/// access token) collapse into this union before any business logic runs.
/// A `ProjectToken` is the capability itself: read-only secret retrieval on
/// exactly one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Session { user_id: i32 },
    ProjectToken { project_id: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        use Action::{ManagePermissions, ManageTokens, ReadSecret, WriteSecret};

        assert!(Role::Admin.allows(ReadSecret));
        assert!(Role::Admin.allows(WriteSecret));
        assert!(Role::Admin.allows(ManageTokens));
        assert!(Role::Admin.allows(ManagePermissions));

        assert!(Role::Write.allows(ReadSecret));
        assert!(Role::Write.allows(WriteSecret));
        assert!(!Role::Write.allows(ManageTokens));
        assert!(!Role::Write.allows(ManagePermissions));

        assert!(Role::Read.allows(ReadSecret));
        assert!(!Role::Read.allows(WriteSecret));
        assert!(!Role::Read.allows(ManageTokens));
        assert!(!Role::Read.allows(ManagePermissions));
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Write, Role::Read] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("ADMIN"), None);
    }
}
