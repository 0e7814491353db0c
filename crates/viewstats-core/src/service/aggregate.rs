//! Join of statistics with users into per-user summaries.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{StatisticsItem, StatisticsType, User, UserStatistics};

/// Parse a `ddMMyyyy` day encoded as an integer.
///
/// The value is zero-padded to eight digits first, so `5092024` reads as
/// 5 September 2024. Anything that is not a real calendar date is `None`.
pub fn parse_view_date(value: i64) -> Option<NaiveDate> {
    if value < 0 {
        return None;
    }
    let text = format!("{:08}", value);
    if text.len() != 8 {
        return None;
    }

    let day: u32 = text[0..2].parse().ok()?;
    let month: u32 = text[2..4].parse().ok()?;
    let year: i32 = text[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Group `items` by user, count events per type, and sort by views descending.
///
/// Groups appear in the order their user id is first seen; the sort is
/// stable, so users with equal view counts keep that order. A user id with
/// no matching user still yields a summary, with `user` left empty.
pub fn aggregate(items: &[StatisticsItem], users: &[User]) -> Vec<UserStatistics> {
    let mut users_by_id: HashMap<i64, &User> = HashMap::with_capacity(users.len());
    for user in users {
        users_by_id.entry(user.id).or_insert(user);
    }

    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, UserStatistics> = HashMap::new();

    for item in items {
        let stats = groups.entry(item.user_id).or_insert_with(|| {
            order.push(item.user_id);
            let user = users_by_id.get(&item.user_id).map(|u| (*u).clone());
            UserStatistics::new(item.user_id, user)
        });

        let count = item.dates.len();
        match item.kind {
            StatisticsType::View => {
                stats.views_count += count;
                let before = stats.view_dates.len();
                stats
                    .view_dates
                    .extend(item.dates.iter().filter_map(|&d| parse_view_date(d)));
                let dropped = count - (stats.view_dates.len() - before);
                if dropped > 0 {
                    debug!(user_id = item.user_id, dropped, "Dropped unparseable view dates");
                }
            }
            StatisticsType::Subscription => stats.subscriptions_count += count,
            StatisticsType::Unsubscription => stats.unsubscriptions_count += count,
        }
    }

    let mut result: Vec<UserStatistics> = order
        .into_iter()
        .filter_map(|id| groups.remove(&id))
        .collect();
    result.sort_by(|a, b| b.views_count.cmp(&a.views_count));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;

    fn user(id: i64) -> User {
        User {
            id,
            sex: Sex::Female,
            username: format!("user{}", id),
            is_online: true,
            age: 25,
            files: vec![],
        }
    }

    fn item(user_id: i64, kind: StatisticsType, dates: Vec<i64>) -> StatisticsItem {
        StatisticsItem { user_id, kind, dates }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_parse_view_date_zero_pads() {
        assert_eq!(parse_view_date(5092024), Some(date(2024, 9, 5)));
        assert_eq!(parse_view_date(31122023), Some(date(2023, 12, 31)));
        assert_eq!(parse_view_date(1012000), Some(date(2000, 1, 1)));
    }

    #[test]
    fn test_parse_view_date_rejects_invalid() {
        assert_eq!(parse_view_date(99999999), None);
        assert_eq!(parse_view_date(30022024), None); // 30 February
        assert_eq!(parse_view_date(1132024), None); // month 13
        assert_eq!(parse_view_date(0), None);
        assert_eq!(parse_view_date(-5092024), None);
        assert_eq!(parse_view_date(105092024), None); // nine digits
    }

    #[test]
    fn test_parse_view_date_leap_day() {
        assert_eq!(parse_view_date(29022024), Some(date(2024, 2, 29)));
        assert_eq!(parse_view_date(29022023), None);
    }

    #[test]
    fn test_counts_and_dropped_dates() {
        let items = vec![
            item(1, StatisticsType::View, vec![5092024, 99999999]),
            item(1, StatisticsType::Subscription, vec![1, 2]),
        ];
        let result = aggregate(&items, &[user(1)]);

        assert_eq!(result.len(), 1);
        let stats = &result[0];
        assert_eq!(stats.user_id, 1);
        assert_eq!(stats.user.as_ref().map(|u| u.id), Some(1));
        assert_eq!(stats.views_count, 2);
        assert_eq!(stats.view_dates, vec![date(2024, 9, 5)]);
        assert_eq!(stats.subscriptions_count, 2);
        assert_eq!(stats.unsubscriptions_count, 0);
    }

    #[test]
    fn test_missing_user_is_not_fabricated() {
        let items = vec![
            item(9, StatisticsType::View, vec![5092024]),
            item(9, StatisticsType::Unsubscription, vec![6092024, 7092024, 8092024]),
        ];
        let result = aggregate(&items, &[user(1)]);

        assert_eq!(result.len(), 1);
        assert!(result[0].user.is_none());
        assert_eq!(result[0].views_count, 1);
        assert_eq!(result[0].unsubscriptions_count, 3);
    }

    #[test]
    fn test_one_summary_per_user_with_stats() {
        let items = vec![
            item(1, StatisticsType::View, vec![]),
            item(2, StatisticsType::View, vec![5092024]),
            item(1, StatisticsType::Subscription, vec![5092024]),
        ];
        // user 3 has no statistics and gets no summary
        let result = aggregate(&items, &[user(1), user(2), user(3)]);
        let mut ids: Vec<i64> = result.iter().map(|s| s.user_id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_sorted_by_views_descending() {
        let items = vec![
            item(1, StatisticsType::View, vec![5092024]),
            item(2, StatisticsType::View, vec![5092024, 6092024, 7092024]),
            item(3, StatisticsType::Subscription, vec![5092024]),
            item(4, StatisticsType::View, vec![5092024, 6092024]),
            item(1, StatisticsType::View, vec![8092024]),
        ];
        let result = aggregate(&items, &[]);

        assert!(result.windows(2).all(|w| w[0].views_count >= w[1].views_count));
        let ids: Vec<i64> = result.iter().map(|s| s.user_id).collect();
        assert_eq!(ids, vec![2, 1, 4, 3]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let items = vec![
            item(5, StatisticsType::View, vec![1]),
            item(3, StatisticsType::View, vec![1]),
            item(8, StatisticsType::View, vec![1]),
        ];
        for _ in 0..5 {
            let ids: Vec<i64> = aggregate(&items, &[]).iter().map(|s| s.user_id).collect();
            assert_eq!(ids, vec![5, 3, 8]);
        }
    }

    #[test]
    fn test_view_dates_keep_input_order() {
        let items = vec![
            item(1, StatisticsType::View, vec![7092024, 5092024]),
            item(1, StatisticsType::View, vec![6092024]),
        ];
        let result = aggregate(&items, &[user(1)]);
        assert_eq!(
            result[0].view_dates,
            vec![date(2024, 9, 7), date(2024, 9, 5), date(2024, 9, 6)]
        );
    }

    #[test]
    fn test_duplicate_user_ids_join_first_match() {
        let mut second = user(1);
        second.username = "shadow".to_string();
        let result = aggregate(&[item(1, StatisticsType::View, vec![1])], &[user(1), second]);
        assert_eq!(result[0].user.as_ref().map(|u| u.username.as_str()), Some("user1"));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], &[user(1)]).is_empty());
    }
}
