//! Terminal rendering of command results, as plain text or JSON.

use anyhow::Result;
use serde_json::json;
use viewstats_core::cache::{StatisticsRecord, UserRecord};
use viewstats_core::models::{StatisticsItem, User, UserStatistics};
use viewstats_core::report::DashboardReport;
use viewstats_core::PersistentStore;

use crate::utils::{format_dates, format_optional, format_percent, truncate_string};

/// Column width for usernames in list output
const NAME_WIDTH: usize = 20;

/// View dates shown per aggregate line
const DATES_SHOWN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn users(users: &[User], format: Format) -> Result<()> {
    if format == Format::Json {
        return print_json(users);
    }
    if users.is_empty() {
        println!("No users");
        return Ok(());
    }
    println!("{:>6}  {:<width$}  {:>3}  {:>3}  {}", "ID", "USERNAME", "SEX", "AGE", "STATUS", width = NAME_WIDTH);
    for user in users {
        println!(
            "{:>6}  {:<width$}  {:>3}  {:>3}  {}",
            user.id,
            truncate_string(&user.username, NAME_WIDTH),
            user.sex.code(),
            user.age,
            if user.is_online { "online" } else { "offline" },
            width = NAME_WIDTH,
        );
    }
    println!("{} users", users.len());
    Ok(())
}

pub fn user(user: &User, format: Format) -> Result<()> {
    if format == Format::Json {
        return print_json(user);
    }
    println!("ID:       {}", user.id);
    println!("Username: {}", user.username);
    println!("Sex:      {}", user.sex);
    println!("Age:      {}", user.age);
    println!("Online:   {}", if user.is_online { "yes" } else { "no" });
    println!("Avatar:   {}", format_optional(user.avatar_url(), "-"));
    Ok(())
}

pub fn statistics(items: &[StatisticsItem], format: Format) -> Result<()> {
    if format == Format::Json {
        return print_json(items);
    }
    if items.is_empty() {
        println!("No statistics");
        return Ok(());
    }
    for item in items {
        println!("{:>6}  {:<14}  {} dates", item.user_id, item.kind.as_str(), item.dates.len());
    }
    println!("{} items", items.len());
    Ok(())
}

pub fn aggregates(summaries: &[UserStatistics], format: Format) -> Result<()> {
    if format == Format::Json {
        return print_json(summaries);
    }
    if summaries.is_empty() {
        println!("No statistics");
        return Ok(());
    }
    println!(
        "{:>6}  {:<width$}  {:>5}  {:>5}  {:>5}  {}",
        "ID", "USERNAME", "VIEWS", "SUBS", "UNSUB", "VIEW DATES",
        width = NAME_WIDTH,
    );
    for s in summaries {
        let name = s.user.as_ref().map(|u| u.username.as_str());
        println!(
            "{:>6}  {:<width$}  {:>5}  {:>5}  {:>5}  {}",
            s.user_id,
            truncate_string(&format_optional(name, "(unknown)"), NAME_WIDTH),
            s.views_count,
            s.subscriptions_count,
            s.unsubscriptions_count,
            format_dates(&s.view_dates, DATES_SHOWN),
            width = NAME_WIDTH,
        );
    }
    Ok(())
}

pub fn report(report: &DashboardReport, format: Format) -> Result<()> {
    if format == Format::Json {
        return print_json(report);
    }
    println!("Views:            {}", report.total_views);
    println!("Subscriptions:    {}", report.total_subscriptions);
    println!("Unsubscriptions:  {}", report.total_unsubscriptions);

    println!();
    println!("Daily views");
    if report.daily_views.is_empty() {
        println!("  -");
    }
    for day in &report.daily_views {
        println!("  {}  {}", day.label, day.views);
    }

    println!();
    println!("Top visitors");
    if report.top_visitors.is_empty() {
        println!("  -");
    }
    for visitor in &report.top_visitors {
        println!(
            "  {:<width$}  {:>3}  {:>5} views",
            truncate_string(&visitor.username, NAME_WIDTH),
            visitor.age,
            visitor.views,
            width = NAME_WIDTH,
        );
    }

    println!();
    println!(
        "Sex split: M {}  W {}",
        format_percent(report.gender_split.male_percent),
        format_percent(report.gender_split.female_percent)
    );
    println!();
    println!("{:<6}  {:>4}  {:>4}", "AGE", "M", "W");
    for group in &report.age_groups {
        println!("{:<6}  {:>3}%  {:>3}%", group.label, group.male_percent, group.female_percent);
    }
    Ok(())
}

pub fn status(store: &PersistentStore, format: Format) -> Result<()> {
    let ages = store.cache_ages();
    let users = store.count::<UserRecord>()?;
    let statistics = store.count::<StatisticsRecord>()?;
    let location = store.dir().map(|d| d.display().to_string());

    if format == Format::Json {
        return print_json(&json!({
            "available": store.is_available(),
            "dir": location,
            "users": { "count": users, "age": ages.users },
            "statistics": { "count": statistics, "age": ages.statistics },
        }));
    }

    if !store.is_available() {
        println!("Local cache unavailable");
        return Ok(());
    }
    println!("Cache:       {}", format_optional(location.as_deref(), "(memory)"));
    println!("Users:       {} ({})", users, ages.users_age());
    println!("Statistics:  {} ({})", statistics, ages.statistics_age());
    Ok(())
}
