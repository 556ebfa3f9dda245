use crate::domain::member::{Member, NewMember};
use crate::infrastructure::auth::TokenError;
use crate::infrastructure::repository::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub email: String,
    // Compared by plain equality on login.
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub member: Member,
}

/// Inbound account creation payload.
///
/// Every field is optional so that a partially filled request body still
/// decodes and is rejected by the service with a typed error instead of a
/// deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Ignored: the service always stamps the creation time itself.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub member: Option<NewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Result of a successful login. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub member_id: Uuid,
    pub first_name: String,
    pub token: String,
}

/// Everything `AccountStore::create` must persist as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountGraph {
    pub account: Account,
    /// `(department_number, member_id)` pairs.
    pub department_memberships: BTreeSet<(i32, Uuid)>,
    /// `(profession_id, member_id)` pairs.
    pub profession_memberships: BTreeSet<(i64, Uuid)>,
}

impl AccountGraph {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            department_memberships: BTreeSet::new(),
            profession_memberships: BTreeSet::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid account: {0}")]
    AccountInvalid(String),
    #[error("Invalid email: {0}")]
    EmailInvalid(String),
    #[error("An account already exists for email '{0}'")]
    AccountAlreadyExists(String),
    #[error("Invalid member: {0}")]
    MemberInvalid(String),
    #[error("Department {0} not found")]
    DepartmentNotFound(i32),
    #[error("Profession {0} not found")]
    ProfessionNotFound(i64),
    #[error("No account found for email '{0}'")]
    AccountNotFound(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}
