use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgDatabaseError, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Account, AccountGraph, Department, Member, Profession};
use crate::infrastructure::repository::{
    AccountStore, DepartmentStore, ProfessionStore, StoreError,
};

#[derive(Debug, FromRow)]
struct AccountRow {
    email: String,
    password: String,
    created_at: DateTime<Utc>,
    member_id: Uuid,
    first_name: String,
}

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    fn map_insert_error(e: sqlx::Error, account: &Account) -> StoreError {
        if let Some(db_err) = e.as_database_error() {
            if let Some(pg_err) = db_err.try_downcast_ref::<PgDatabaseError>() {
                // unique_violation
                if pg_err.code() == "23505" {
                    match pg_err.constraint() {
                        Some("accounts_email_key") => {
                            return StoreError::EmailTaken(account.email.clone());
                        }
                        Some("members_pkey") | Some("accounts_member_id_key") => {
                            return StoreError::MemberTaken(account.member.id);
                        }
                        _ => {}
                    }
                }
            }
        }
        StoreError::DatabaseError(e)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create(&self, graph: &AccountGraph) -> Result<(), StoreError> {
        let account = &graph.account;
        let member = &account.member;
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO members (id, first_name) VALUES ($1, $2)")
            .bind(member.id)
            .bind(&member.first_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::map_insert_error(e, account))?;

        sqlx::query(
            r#"
            INSERT INTO accounts (email, password, created_at, member_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&account.email)
        .bind(&account.password)
        .bind(account.created_at)
        .bind(member.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_insert_error(e, account))?;

        for (number, member_id) in &graph.department_memberships {
            sqlx::query(
                r#"
                INSERT INTO department_members (department_number, member_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(number)
            .bind(member_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::map_insert_error(e, account))?;
        }

        for (profession_id, member_id) in &graph.profession_memberships {
            sqlx::query(
                r#"
                INSERT INTO profession_members (profession_id, member_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(profession_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::map_insert_error(e, account))?;
        }

        tx.commit().await?;
        debug!("Persisted account {} with member {}", account.email, member.id);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT a.email, a.password, a.created_at, m.id AS member_id, m.first_name
            FROM accounts a
            JOIN members m ON m.id = a.member_id
            WHERE a.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let department_numbers: Vec<i32> = sqlx::query_scalar(
            "SELECT department_number FROM department_members WHERE member_id = $1 ORDER BY department_number",
        )
        .bind(row.member_id)
        .fetch_all(&self.pool)
        .await?;

        let profession_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT profession_id FROM profession_members WHERE member_id = $1 ORDER BY profession_id",
        )
        .bind(row.member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Account {
            email: row.email,
            password: row.password,
            created_at: row.created_at,
            member: Member {
                id: row.member_id,
                first_name: row.first_name,
                department_numbers,
                profession_ids,
            },
        }))
    }
}

#[async_trait]
impl DepartmentStore for PgStore {
    async fn find_by_number(&self, number: i32) -> Result<Option<Department>, StoreError> {
        let department =
            sqlx::query_as::<_, Department>("SELECT number, name FROM departments WHERE number = $1")
                .bind(number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(department)
    }
}

#[async_trait]
impl ProfessionStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Profession>, StoreError> {
        let profession =
            sqlx::query_as::<_, Profession>("SELECT id, name FROM professions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(profession)
    }
}
