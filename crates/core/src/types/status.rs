//! Status and role enums for admin entities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Publication status shared by categories and banners.
///
/// Inactive entities stay editable in the back office but are hidden from
/// public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[default]
    Active,
    Inactive,
}

impl EntityStatus {
    /// Returns the wire representation (`"active"` / `"inactive"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a back-office account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Returns the wire representation (`"user"` / `"admin"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction accepted by every list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Returns the wire representation (`"asc"` / `"desc"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_status_serde() {
        assert_eq!(
            serde_json::to_string(&EntityStatus::Active).expect("serialize"),
            "\"active\""
        );
        let status: EntityStatus = serde_json::from_str("\"inactive\"").expect("deserialize");
        assert_eq!(status, EntityStatus::Inactive);
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(
            serde_json::to_string(&UserRole::Admin).expect("serialize"),
            "\"admin\""
        );
        let role: UserRole = serde_json::from_str("\"user\"").expect("deserialize");
        assert_eq!(role, UserRole::User);
    }

    #[test]
    fn test_display_matches_wire_form() {
        assert_eq!(EntityStatus::Inactive.to_string(), "inactive");
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(SortDirection::Desc.to_string(), "desc");
    }
}
