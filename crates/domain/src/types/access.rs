//! Actor access context and row-level visibility
//!
//! The authorization collaborator is consumed here only as a gating
//! predicate plus a typed visibility tier. Visibility is a small sum type
//! compiled to a parameterized predicate by the storage layer, never
//! string-concatenated values.

use serde::{Deserialize, Serialize};

/// Resolved access context for an acting user within one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccess {
    /// Acting user
    pub user_id: i64,
    /// Tenant scope
    pub company_id: i64,
    /// Role label as stored, e.g. `Administrador`
    pub role: String,
    /// Linked seller code, when the user is a seller or manager
    pub seller_code: Option<i64>,
    /// Whether the role grants unrestricted access
    pub is_admin: bool,
    /// User ids whose records a manager may see (includes the manager)
    pub team_user_ids: Vec<i64>,
}

impl UserAccess {
    /// Gate checked before any submission is accepted: admins always pass,
    /// everyone else needs a seller linkage.
    pub fn can_create_or_edit(&self) -> bool {
        self.is_admin || self.seller_code.is_some()
    }

    /// Visibility tier for read paths.
    pub fn visibility(&self) -> Visibility {
        if self.is_admin {
            return Visibility::Unrestricted;
        }
        if self.team_user_ids.len() > 1 {
            return Visibility::TeamOf(self.team_user_ids.clone());
        }
        Visibility::OwnedBy(self.user_id)
    }
}

/// The three row-level visibility tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Admin: no restriction
    Unrestricted,
    /// Plain seller: only records the actor created
    OwnedBy(i64),
    /// Manager: records created by anyone on the team
    TeamOf(Vec<i64>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(is_admin: bool, seller_code: Option<i64>, team: Vec<i64>) -> UserAccess {
        UserAccess {
            user_id: 7,
            company_id: 1,
            role: if is_admin { "Administrador".into() } else { "Vendedor".into() },
            seller_code,
            is_admin,
            team_user_ids: team,
        }
    }

    #[test]
    fn admin_can_always_create() {
        assert!(access(true, None, vec![]).can_create_or_edit());
    }

    #[test]
    fn unlinked_user_cannot_create() {
        assert!(!access(false, None, vec![]).can_create_or_edit());
    }

    #[test]
    fn linked_seller_can_create() {
        assert!(access(false, Some(12), vec![7]).can_create_or_edit());
    }

    #[test]
    fn visibility_tiers() {
        assert_eq!(access(true, None, vec![]).visibility(), Visibility::Unrestricted);
        assert_eq!(access(false, Some(12), vec![7]).visibility(), Visibility::OwnedBy(7));
        assert_eq!(
            access(false, Some(12), vec![7, 9, 11]).visibility(),
            Visibility::TeamOf(vec![7, 9, 11])
        );
    }
}
