use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
    Viewer,
}

impl Role {
    /// Fixed hierarchy: admin(3) > member(2) > viewer(1).
    pub const fn level(self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Member => 2,
            Role::Viewer => 1,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Opaque hash owned by the authentication layer. Stored with the user
    /// record; responses expose [`UserSummary`] instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email: normalize_email(&email),
            role,
            password_hash: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_role_level(&self, required: Role) -> bool {
        self.role.level() >= required.level()
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// The public face of a user, used in every response that shows one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accepts `local@domain.tld` with no whitespace anywhere.
pub fn validate_email(email: &str) -> TaskboardResult<String> {
    let email = normalize_email(email);
    let invalid = || TaskboardError::validation("email", "Invalid email format");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(email),
        _ => Err(invalid()),
    }
}
