//! Dashboard summary computed from the per-user aggregates.
//!
//! Everything here is a pure function of a `UserStatistics` list: totals,
//! a short daily view series, the top visitors, and the sex/age make-up of
//! the users that could be joined.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Sex, User, UserStatistics};

/// Number of most recent days kept in the daily view series
pub const DAILY_VIEW_DAYS: usize = 7;

/// Age buckets, youngest first. Ages outside 18..=50 land in the last one.
pub const AGE_GROUPS: [&str; 7] = ["18-21", "22-25", "26-30", "31-35", "36-40", "40-50", ">50"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub total_views: usize,
    pub total_subscriptions: usize,
    pub total_unsubscriptions: usize,
    pub daily_views: Vec<DailyViews>,
    pub top_visitors: Vec<TopVisitor>,
    pub gender_split: GenderSplit,
    pub age_groups: Vec<AgeGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyViews {
    pub date: NaiveDate,
    /// `dd.MM`
    pub label: String,
    pub views: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopVisitor {
    pub user_id: i64,
    pub username: String,
    pub age: i32,
    pub avatar_url: Option<String>,
    pub views: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenderSplit {
    pub male_percent: f64,
    pub female_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeGroup {
    pub label: &'static str,
    pub male_percent: u32,
    pub female_percent: u32,
}

pub fn age_group_label(age: i32) -> &'static str {
    match age {
        18..=21 => AGE_GROUPS[0],
        22..=25 => AGE_GROUPS[1],
        26..=30 => AGE_GROUPS[2],
        31..=35 => AGE_GROUPS[3],
        36..=40 => AGE_GROUPS[4],
        41..=50 => AGE_GROUPS[5],
        _ => AGE_GROUPS[6],
    }
}

impl DashboardReport {
    /// Build the report from aggregates already sorted by views.
    ///
    /// `top_visitors` looks at the first `top_n` aggregates and keeps those
    /// with a joined user, so it may hold fewer than `top_n` entries.
    pub fn build(stats: &[UserStatistics], top_n: usize) -> Self {
        let users: Vec<&User> = stats.iter().filter_map(|s| s.user.as_ref()).collect();

        Self {
            total_views: stats.iter().map(|s| s.views_count).sum(),
            total_subscriptions: stats.iter().map(|s| s.subscriptions_count).sum(),
            total_unsubscriptions: stats.iter().map(|s| s.unsubscriptions_count).sum(),
            daily_views: daily_views(stats),
            top_visitors: top_visitors(stats, top_n),
            gender_split: gender_split(&users),
            age_groups: age_groups(&users),
        }
    }
}

fn daily_views(stats: &[UserStatistics]) -> Vec<DailyViews> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in stats.iter().flat_map(|s| s.view_dates.iter()) {
        *per_day.entry(*date).or_default() += 1;
    }

    let skip = per_day.len().saturating_sub(DAILY_VIEW_DAYS);
    per_day
        .into_iter()
        .skip(skip)
        .map(|(date, views)| DailyViews {
            date,
            label: date.format("%d.%m").to_string(),
            views,
        })
        .collect()
}

fn top_visitors(stats: &[UserStatistics], top_n: usize) -> Vec<TopVisitor> {
    stats
        .iter()
        .take(top_n)
        .filter_map(|s| {
            s.user.as_ref().map(|user| TopVisitor {
                user_id: user.id,
                username: user.username.clone(),
                age: user.age,
                avatar_url: user.avatar_url().map(str::to_string),
                views: s.views_count,
            })
        })
        .collect()
}

fn gender_split(users: &[&User]) -> GenderSplit {
    let male = users.iter().filter(|u| u.sex == Sex::Male).count();
    let female = users.iter().filter(|u| u.sex == Sex::Female).count();
    let total = male + female;

    if total == 0 {
        return GenderSplit {
            male_percent: 50.0,
            female_percent: 50.0,
        };
    }
    GenderSplit {
        male_percent: male as f64 / total as f64 * 100.0,
        female_percent: female as f64 / total as f64 * 100.0,
    }
}

/// Per-bucket share of all joined users, split by sex (anything but `M`
/// counts as female). Percentages are truncated toward zero.
fn age_groups(users: &[&User]) -> Vec<AgeGroup> {
    let total = users.len().max(1);
    let mut counts: BTreeMap<&'static str, (usize, usize)> = BTreeMap::new();
    for user in users {
        let entry = counts.entry(age_group_label(user.age)).or_default();
        if user.sex.is_male() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    AGE_GROUPS
        .iter()
        .map(|label| {
            let (male, female) = counts.get(label).copied().unwrap_or_default();
            AgeGroup {
                label,
                male_percent: (male * 100 / total) as u32,
                female_percent: (female * 100 / total) as u32,
            }
        })
        .collect()
}
