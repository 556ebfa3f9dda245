use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub department_numbers: Vec<i32>,
    pub profession_ids: Vec<i64>,
}

/// Member as sent by a client when creating an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMember {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub department_numbers: Vec<i32>,
    #[serde(default)]
    pub profession_ids: Vec<i64>,
}

impl NewMember {
    pub fn into_member(self) -> Member {
        Member {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            first_name: self.first_name,
            department_numbers: self.department_numbers,
            profession_ids: self.profession_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Department {
    pub number: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Profession {
    pub id: i64,
    pub name: String,
}
