//! Counting fake of the remote source for service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, RemoteSource};
use crate::models::{Sex, StatisticsItem, StatisticsType, User};

#[derive(Default)]
pub(crate) struct FakeRemote {
    users: Mutex<Vec<User>>,
    statistics: Mutex<Vec<StatisticsItem>>,
    pub fail_users: AtomicBool,
    pub fail_statistics: AtomicBool,
    pub hang_users: AtomicBool,
    user_calls: AtomicUsize,
    statistics_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(users: Vec<User>, statistics: Vec<StatisticsItem>) -> Self {
        Self {
            users: Mutex::new(users),
            statistics: Mutex::new(statistics),
            ..Default::default()
        }
    }

    pub fn set_users(&self, users: Vec<User>) {
        *self.users.lock().expect("users lock") = users;
    }

    pub fn set_statistics(&self, statistics: Vec<StatisticsItem>) {
        *self.statistics.lock().expect("statistics lock") = statistics;
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn statistics_calls(&self) -> usize {
        self.statistics_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_users.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_users.load(Ordering::SeqCst) {
            return Err(ApiError::ServerStatus(503));
        }
        Ok(self.users.lock().expect("users lock").clone())
    }

    async fn fetch_statistics(&self) -> Result<Vec<StatisticsItem>, ApiError> {
        self.statistics_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_statistics.load(Ordering::SeqCst) {
            return Err(ApiError::EmptyResponseBody);
        }
        Ok(self.statistics.lock().expect("statistics lock").clone())
    }
}

pub(crate) fn user(id: i64, name: &str) -> User {
    User {
        id,
        sex: if id % 2 == 0 { Sex::Female } else { Sex::Male },
        username: name.to_string(),
        is_online: id % 3 == 0,
        age: 20 + id as i32,
        files: vec![],
    }
}

pub(crate) fn item(user_id: i64, kind: StatisticsType, dates: Vec<i64>) -> StatisticsItem {
    StatisticsItem { user_id, kind, dates }
}
