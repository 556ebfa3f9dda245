use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Account, AccountGraph, Department, Profession};
use crate::infrastructure::repository::{
    AccountStore, DepartmentStore, ProfessionStore, StoreError,
};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    departments: HashMap<i32, Department>,
    professions: HashMap<i64, Profession>,
    department_members: BTreeSet<(i32, Uuid)>,
    profession_members: BTreeSet<(i64, Uuid)>,
}

/// In-process store backing all three store traits.
///
/// The whole state sits behind a single lock, so `create` is observed as
/// all-or-nothing by concurrent readers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_department(&self, number: i32, name: impl Into<String>) {
        let mut state = self.state.write().await;
        state.departments.insert(
            number,
            Department {
                number,
                name: name.into(),
            },
        );
    }

    pub async fn insert_profession(&self, id: i64, name: impl Into<String>) {
        let mut state = self.state.write().await;
        state.professions.insert(
            id,
            Profession {
                id,
                name: name.into(),
            },
        );
    }

    pub async fn department_members(&self, number: i32) -> Vec<Uuid> {
        let state = self.state.read().await;
        state
            .department_members
            .iter()
            .filter(|(dept, _)| *dept == number)
            .map(|(_, member)| *member)
            .collect()
    }

    pub async fn profession_members(&self, id: i64) -> Vec<Uuid> {
        let state = self.state.read().await;
        state
            .profession_members
            .iter()
            .filter(|(prof, _)| *prof == id)
            .map(|(_, member)| *member)
            .collect()
    }

    pub async fn account_count(&self) -> usize {
        self.state.read().await.accounts.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.accounts.contains_key(email))
    }

    async fn create(&self, graph: &AccountGraph) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let email = &graph.account.email;
        if state.accounts.contains_key(email) {
            return Err(StoreError::EmailTaken(email.clone()));
        }
        let member_id = graph.account.member.id;
        if state.accounts.values().any(|a| a.member.id == member_id) {
            return Err(StoreError::MemberTaken(member_id));
        }
        if let Some((number, _)) = graph
            .department_memberships
            .iter()
            .find(|(number, _)| !state.departments.contains_key(number))
        {
            return Err(StoreError::MissingReference {
                kind: "department",
                id: i64::from(*number),
            });
        }
        if let Some((id, _)) = graph
            .profession_memberships
            .iter()
            .find(|(id, _)| !state.professions.contains_key(id))
        {
            return Err(StoreError::MissingReference {
                kind: "profession",
                id: *id,
            });
        }

        state
            .department_members
            .extend(graph.department_memberships.iter().copied());
        state
            .profession_members
            .extend(graph.profession_memberships.iter().copied());
        state.accounts.insert(email.clone(), graph.account.clone());

        debug!("Stored account {} in memory", email);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.state.read().await.accounts.get(email).cloned())
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn find_by_number(&self, number: i32) -> Result<Option<Department>, StoreError> {
        Ok(self.state.read().await.departments.get(&number).cloned())
    }
}

#[async_trait]
impl ProfessionStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Profession>, StoreError> {
        Ok(self.state.read().await.professions.get(&id).cloned())
    }
}
