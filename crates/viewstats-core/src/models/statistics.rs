use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub statistics: Vec<StatisticsItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticsType {
    View,
    Subscription,
    Unsubscription,
}

impl StatisticsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticsType::View => "view",
            StatisticsType::Subscription => "subscription",
            StatisticsType::Unsubscription => "unsubscription",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(StatisticsType::View),
            "subscription" => Some(StatisticsType::Subscription),
            "unsubscription" => Some(StatisticsType::Unsubscription),
            _ => None,
        }
    }
}

impl fmt::Display for StatisticsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All events of one type for one user. Each entry in `dates` is a day
/// encoded as a `ddMMyyyy` integer (leading zero dropped, e.g. `5092024`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsItem {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: StatisticsType,
    pub dates: Vec<i64>,
}

impl StatisticsItem {
    /// Identity key, one record per user per event type
    pub fn key(&self) -> String {
        format!("{}_{}", self.user_id, self.kind.as_str())
    }
}

/// Per-user summary joining statistics counts with the user, if known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatistics {
    pub user_id: i64,
    pub user: Option<User>,
    pub views_count: usize,
    pub subscriptions_count: usize,
    pub unsubscriptions_count: usize,
    pub view_dates: Vec<NaiveDate>,
}

impl UserStatistics {
    pub fn new(user_id: i64, user: Option<User>) -> Self {
        Self {
            user_id,
            user,
            views_count: 0,
            subscriptions_count: 0,
            unsubscriptions_count: 0,
            view_dates: Vec::new(),
        }
    }

    pub fn total_events(&self) -> usize {
        self.views_count + self.subscriptions_count + self.unsubscriptions_count
    }
}
