use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::role::Role;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String, // ! unique
    pub email: String,    // ! unique
    pub password_hash: String,
    pub role: Role,
    pub organization_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Organization name when one was given, username otherwise.
    pub fn display_name(&self) -> &str {
        self.organization_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub organization_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Default)]
pub struct ProfileChanges {
    pub organization_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

/// Returned by login alongside the access token.
#[derive(Serialize, Debug, Clone)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub organization_name: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub organization_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            organization_name: user.organization_name.clone(),
        }
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            organization_name: user.organization_name.clone(),
            contact_number: user.contact_number.clone(),
            address: user.address.clone(),
            is_approved: user.is_approved,
            created_at: user.created_at,
        }
    }
}
