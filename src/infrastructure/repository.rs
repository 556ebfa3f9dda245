use crate::domain::{Account, AccountGraph, Department, Profession};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email '{0}' already exists")]
    EmailTaken(String),
    #[error("Member {0} already belongs to an account")]
    MemberTaken(Uuid),
    #[error("Referenced {kind} {id} does not exist")]
    MissingReference { kind: &'static str, id: i64 },
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// Persistence for accounts and the member they own.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    async fn exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Persists the account, its member and every membership pair in the
    /// graph. Implementations must commit all of it or nothing.
    async fn create(&self, graph: &AccountGraph) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
}

#[async_trait]
pub trait DepartmentStore: Send + Sync + 'static {
    async fn find_by_number(&self, number: i32) -> Result<Option<Department>, StoreError>;
}

#[async_trait]
pub trait ProfessionStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: i64) -> Result<Option<Profession>, StoreError>;
}
