//! User model and role normalization

use super::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// User role, canonicalized to uppercase.
///
/// The backend sends role values in whatever case it pleases ("admin",
/// "Admin", "ADMIN"); deserialization accepts any casing and the internal
/// representation is always the canonical uppercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Author,
    Operator,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Author => "AUTHOR",
            Role::Operator => "OPERATOR",
            Role::User => "USER",
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "AUTHOR" => Ok(Role::Author),
            "OPERATOR" => Ok(Role::Operator),
            "USER" => Ok(Role::User),
            other => Err(serde::de::Error::custom(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

/// The authenticated (or synthetic offline) user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    /// The backend calls this `name`; internally it is the display name.
    #[serde(rename = "displayName", alias = "name")]
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Merge a profile patch locally (offline path), bumping `updated_at`.
    pub fn merge_patch(&mut self, patch: &UserPatch, now: DateTime<Utc>) {
        if let Some(display_name) = &patch.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        self.updated_at = now;
    }
}

/// Draft for creating a user through the generic gateway
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    /// Sent to the backend under its field name `name`.
    #[serde(rename = "name")]
    pub display_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Partial user update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_deserializes_case_insensitively() {
        for raw in ["\"admin\"", "\"Admin\"", "\"ADMIN\""] {
            let role: Role = serde_json::from_str(raw).unwrap();
            assert_eq!(role, Role::Admin);
        }
        let role: Role = serde_json::from_str("\"operator\"").unwrap();
        assert_eq!(role, Role::Operator);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn role_serializes_to_canonical_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Author).unwrap(), "\"AUTHOR\"");
    }

    #[test]
    fn user_accepts_backend_name_field() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "name": "Siti",
            "email": "siti@example.com",
            "role": "author",
            "createdAt": "2024-01-10T08:00:00Z",
            "updatedAt": "2024-01-12T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(user.display_name, "Siti");
        assert_eq!(user.role, Role::Author);
        assert_eq!(user.id, RecordId::Int(3));
    }

    #[test]
    fn merge_patch_leaves_absent_fields_alone() {
        let mut user: User = serde_json::from_value(json!({
            "id": "u1",
            "displayName": "Admin",
            "email": "admin@example.com",
            "role": "ADMIN",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let before = user.updated_at;
        let patch = UserPatch {
            email: Some("ops@example.com".into()),
            ..Default::default()
        };
        user.merge_patch(&patch, Utc::now());

        assert_eq!(user.display_name, "Admin");
        assert_eq!(user.email, "ops@example.com");
        assert_eq!(user.role, Role::Admin);
        assert!(user.updated_at >= before);
    }

    #[test]
    fn patch_serialization_uses_backend_field_names() {
        let patch = UserPatch {
            display_name: Some("Budi".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"name": "Budi"}));
    }
}
