//! Stored record forms of the domain models and the mappings between them.
//!
//! A stored user keeps only the avatar URL out of its file list; other files
//! are not persisted.

use serde::{Deserialize, Serialize};

use crate::models::{StatisticsItem, StatisticsType, User, UserFile, AVATAR_FILE_TYPE};

use super::store::{Record, RecordKind, Table, Tables};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub sex: String,
    pub username: String,
    pub is_online: bool,
    pub age: i32,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            sex: user.sex.code().to_string(),
            username: user.username.clone(),
            is_online: user.is_online,
            age: user.age,
            avatar_url: user.avatar_url().map(str::to_string),
        }
    }
}

impl UserRecord {
    pub fn to_domain(&self) -> User {
        User {
            id: self.id,
            sex: self.sex.clone().into(),
            username: self.username.clone(),
            is_online: self.is_online,
            age: self.age,
            // The file id is not stored; the user id stands in for it
            files: self
                .avatar_url
                .iter()
                .map(|url| UserFile {
                    id: self.id,
                    url: url.clone(),
                    file_type: AVATAR_FILE_TYPE.to_string(),
                })
                .collect(),
        }
    }
}

impl Record for UserRecord {
    type Key = i64;

    const KIND: RecordKind = RecordKind::Users;

    fn key(&self) -> i64 {
        self.id
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.users
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    /// `"{user_id}_{type}"`
    pub id: String,
    pub user_id: i64,
    pub kind: String,
    pub dates: Vec<i64>,
}

impl From<&StatisticsItem> for StatisticsRecord {
    fn from(item: &StatisticsItem) -> Self {
        Self {
            id: item.key(),
            user_id: item.user_id,
            kind: item.kind.as_str().to_string(),
            dates: item.dates.clone(),
        }
    }
}

impl StatisticsRecord {
    /// Unknown stored type strings read back as `view`
    pub fn to_domain(&self) -> StatisticsItem {
        StatisticsItem {
            user_id: self.user_id,
            kind: StatisticsType::parse(&self.kind).unwrap_or(StatisticsType::View),
            dates: self.dates.clone(),
        }
    }
}

impl Record for StatisticsRecord {
    type Key = String;

    const KIND: RecordKind = RecordKind::Statistics;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.statistics
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.statistics
    }
}
