use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use lumo_accounts::domain::{Account, AccountGraph, Member};
use lumo_accounts::{
    AccountError, AccountService, AccountStore, DepartmentStore, JwtTokenIssuer, NewAccount,
    NewMember, PgStore, StoreError, TokenConfig,
};
use sqlx::PgPool;
use uuid::Uuid;

// Requires a running Postgres; skipped when DATABASE_URL is not set.
async fn setup() -> Option<(PgPool, PgStore)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");
    let store = PgStore::new(pool.clone());
    store.migrate().await.expect("Failed to run migrations");

    for (number, name) in [(75, "Paris"), (13, "Bouches-du-Rhone")] {
        sqlx::query("INSERT INTO departments (number, name) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(number)
            .bind(name)
            .execute(&pool)
            .await
            .expect("Failed to seed departments");
    }
    sqlx::query("INSERT INTO professions (id, name) VALUES (1, 'Photographer') ON CONFLICT DO NOTHING")
        .execute(&pool)
        .await
        .expect("Failed to seed professions");

    Some((pool, store))
}

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4().simple())
}

fn graph(email: &str, departments: &[i32], professions: &[i64]) -> AccountGraph {
    let member = Member {
        id: Uuid::new_v4(),
        first_name: "Jane".to_string(),
        department_numbers: departments.to_vec(),
        profession_ids: professions.to_vec(),
    };
    let mut graph = AccountGraph::new(Account {
        email: email.to_string(),
        password: "s3cret".to_string(),
        created_at: Utc::now().trunc_subsecs(6),
        member: member.clone(),
    });
    graph
        .department_memberships
        .extend(departments.iter().map(|d| (*d, member.id)));
    graph
        .profession_memberships
        .extend(professions.iter().map(|p| (*p, member.id)));
    graph
}

async fn member_exists(pool: &PgPool, member_id: Uuid) -> bool {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
        .bind(member_id)
        .fetch_one(pool)
        .await
        .expect("Failed to query members")
}

#[tokio::test]
async fn test_pg_find_by_email_round_trip() {
    let Some((_pool, store)) = setup().await else {
        return;
    };
    let email = unique_email();
    let graph = graph(&email, &[13, 75], &[1]);

    store.create(&graph).await.unwrap();

    assert!(store.exists(&email).await.unwrap());
    let stored = store.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(stored, graph.account);
}

#[tokio::test]
async fn test_pg_find_by_unknown_email_is_none() {
    let Some((_pool, store)) = setup().await else {
        return;
    };
    assert!(store.find_by_email(&unique_email()).await.unwrap().is_none());
    assert!(!store.exists(&unique_email()).await.unwrap());
}

#[tokio::test]
async fn test_pg_duplicate_email_is_a_write_conflict() {
    let Some((_pool, store)) = setup().await else {
        return;
    };
    let email = unique_email();
    store.create(&graph(&email, &[], &[])).await.unwrap();

    let second = graph(&email, &[75], &[]);
    let err = store.create(&second).await.unwrap_err();

    assert!(matches!(err, StoreError::EmailTaken(e) if e == email));
    let stored = store.find_by_email(&email).await.unwrap().unwrap();
    assert_ne!(stored.member.id, second.account.member.id);
}

#[tokio::test]
async fn test_pg_reused_member_id_is_a_write_conflict() {
    let Some((_pool, store)) = setup().await else {
        return;
    };
    let first = graph(&unique_email(), &[], &[]);
    store.create(&first).await.unwrap();

    let mut second = graph(&unique_email(), &[], &[]);
    second.account.member.id = first.account.member.id;

    let err = store.create(&second).await.unwrap_err();
    assert!(matches!(err, StoreError::MemberTaken(id) if id == first.account.member.id));
    assert!(!store.exists(&second.account.email).await.unwrap());
}

#[tokio::test]
async fn test_pg_create_rolls_back_on_missing_department() {
    let Some((pool, store)) = setup().await else {
        return;
    };
    let missing = -424_242;
    assert!(store.find_by_number(missing).await.unwrap().is_none());

    let email = unique_email();
    let graph = graph(&email, &[75, missing], &[1]);

    let err = store.create(&graph).await.unwrap_err();
    assert!(matches!(err, StoreError::DatabaseError(_)));

    assert!(!store.exists(&email).await.unwrap());
    assert!(!member_exists(&pool, graph.account.member.id).await);
}

#[tokio::test]
async fn test_pg_service_returns_what_was_stored() {
    let Some((_pool, store)) = setup().await else {
        return;
    };
    let store = Arc::new(store);
    let service = AccountService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(JwtTokenIssuer::new(TokenConfig::default())),
    );
    let email = unique_email();

    let created = service
        .create_account(Some(NewAccount {
            email: Some(email.clone()),
            password: Some("s3cret".to_string()),
            created_at: None,
            member: Some(NewMember {
                id: None,
                first_name: "Jane".to_string(),
                department_numbers: vec![13, 75],
                profession_ids: vec![1],
            }),
        }))
        .await
        .unwrap();

    let stored = store.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(stored, created);

    let err = service
        .create_account(Some(NewAccount {
            email: Some(email),
            password: Some("s3cret".to_string()),
            created_at: None,
            member: Some(NewMember::default()),
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::AccountAlreadyExists(_)));
}
