//! Users and their billing profiles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::UserId;

/// A registered account
///
/// Only the password hash is ever held; hashing happens at the API edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new_v7(),
            email: normalize_email(&email.into()),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Emails are compared trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Personal and billing details printed on a user's invoices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

/// A partial profile update; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.company_name.is_none()
            && self.address.is_none()
            && self.tax_id.is_none()
    }

    /// Overwrites the fields present in this update
    pub fn apply_to(self, profile: &mut UserProfile) {
        if let Some(v) = self.first_name {
            profile.first_name = Some(v);
        }
        if let Some(v) = self.last_name {
            profile.last_name = Some(v);
        }
        if let Some(v) = self.company_name {
            profile.company_name = Some(v);
        }
        if let Some(v) = self.address {
            profile.address = Some(v);
        }
        if let Some(v) = self.tax_id {
            profile.tax_id = Some(v);
        }
    }
}
