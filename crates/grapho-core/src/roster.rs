//! Filtering and sorting for the admin roster views.
//!
//! Matching is case-insensitive substring search; sorting is by a named
//! key with records missing that key ordered last regardless of
//! direction.

use std::cmp::Ordering;

use crate::types::{ActivityRecord, UserAccount};

/// Sort direction for roster tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sortable columns of the user tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortKey {
    Name,
    Email,
    Role,
    CreatedAt,
    LastLogin,
}

/// Sortable columns of the activity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySortKey {
    /// Reaches through the embedded acting user.
    UserName,
    Action,
    Timestamp,
}

/// Users whose name, email, or role contains the query.
#[must_use]
pub fn filter_users<'a>(users: &'a [UserAccount], query: &str) -> Vec<&'a UserAccount> {
    let needle = query.to_lowercase();
    users
        .iter()
        .filter(|user| {
            contains(&user.name, &needle)
                || contains(&user.email, &needle)
                || user.role.as_deref().is_some_and(|r| contains(r, &needle))
        })
        .collect()
}

/// Activities whose acting user, action, or IP address contains the query.
#[must_use]
pub fn filter_activities<'a>(
    activities: &'a [ActivityRecord],
    query: &str,
) -> Vec<&'a ActivityRecord> {
    let needle = query.to_lowercase();
    activities
        .iter()
        .filter(|activity| {
            activity
                .user
                .as_ref()
                .is_some_and(|u| contains(&u.name, &needle))
                || activity
                    .action
                    .as_deref()
                    .is_some_and(|a| contains(a, &needle))
                || activity
                    .ip_address
                    .as_deref()
                    .is_some_and(|ip| contains(ip, &needle))
        })
        .collect()
}

/// Sort users in place by the given key.
pub fn sort_users(users: &mut [UserAccount], key: UserSortKey, direction: SortDirection) {
    users.sort_by(|a, b| match key {
        UserSortKey::Name => cmp_strings(Some(a.name.as_str()), Some(b.name.as_str()), direction),
        UserSortKey::Email => {
            cmp_strings(Some(a.email.as_str()), Some(b.email.as_str()), direction)
        }
        UserSortKey::Role => cmp_strings(a.role.as_deref(), b.role.as_deref(), direction),
        UserSortKey::CreatedAt => cmp_missing_last(a.created_at, b.created_at, direction),
        UserSortKey::LastLogin => cmp_missing_last(a.last_login, b.last_login, direction),
    });
}

/// Sort activities in place by the given key.
pub fn sort_activities(
    activities: &mut [ActivityRecord],
    key: ActivitySortKey,
    direction: SortDirection,
) {
    activities.sort_by(|a, b| match key {
        ActivitySortKey::UserName => cmp_strings(
            a.user.as_ref().map(|u| u.name.as_str()),
            b.user.as_ref().map(|u| u.name.as_str()),
            direction,
        ),
        ActivitySortKey::Action => {
            cmp_strings(a.action.as_deref(), b.action.as_deref(), direction)
        }
        ActivitySortKey::Timestamp => cmp_missing_last(a.timestamp, b.timestamp, direction),
    });
}

fn contains(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

fn cmp_strings(a: Option<&str>, b: Option<&str>, direction: SortDirection) -> Ordering {
    cmp_missing_last(
        a.map(str::to_lowercase),
        b.map(str::to_lowercase),
        direction,
    )
}

/// Missing values order last whatever the direction; present values
/// compare normally and honor the direction.
fn cmp_missing_last<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = a.cmp(&b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user(name: &str, email: &str, role: Option<&str>) -> UserAccount {
        UserAccount {
            id: None,
            name: name.into(),
            email: email.into(),
            role: role.map(Into::into),
            other_role: None,
            mobile: None,
            is_verified: false,
            created_at: None,
            last_login: None,
        }
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let users = vec![
            user("Ada Lovelace", "ada@example.com", Some("Graphologist")),
            user("Grace Hopper", "grace@example.com", Some("Psychiatrist")),
        ];
        assert_eq!(filter_users(&users, "GRAPH").len(), 1);
        assert_eq!(filter_users(&users, "example.com").len(), 2);
        assert_eq!(filter_users(&users, "nobody").len(), 0);
    }

    #[test]
    fn sort_is_case_insensitive() {
        let mut users = vec![
            user("zoe", "z@example.com", None),
            user("Ada", "a@example.com", None),
        ];
        sort_users(&mut users, UserSortKey::Name, SortDirection::Ascending);
        assert_eq!(users[0].name, "Ada");
        sort_users(&mut users, UserSortKey::Name, SortDirection::Descending);
        assert_eq!(users[0].name, "zoe");
    }

    #[test]
    fn missing_values_sort_last_in_both_directions() {
        let mut users = vec![
            user("NoLogin", "n@example.com", None),
            user("HasLogin", "h@example.com", None),
        ];
        users[1].last_login = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        sort_users(&mut users, UserSortKey::LastLogin, SortDirection::Ascending);
        assert_eq!(users[1].name, "NoLogin");
        sort_users(&mut users, UserSortKey::LastLogin, SortDirection::Descending);
        assert_eq!(users[1].name, "NoLogin");
    }

    #[test]
    fn activity_sort_reaches_embedded_user() {
        use crate::types::ActivityUser;
        let mut activities = vec![
            ActivityRecord {
                id: None,
                user: Some(ActivityUser {
                    name: "Zoe".into(),
                    email: String::new(),
                }),
                action: Some("login".into()),
                timestamp: None,
                ip_address: None,
            },
            ActivityRecord {
                id: None,
                user: None,
                action: Some("register".into()),
                timestamp: None,
                ip_address: None,
            },
            ActivityRecord {
                id: None,
                user: Some(ActivityUser {
                    name: "Ada".into(),
                    email: String::new(),
                }),
                action: Some("upload".into()),
                timestamp: None,
                ip_address: None,
            },
        ];
        sort_activities(
            &mut activities,
            ActivitySortKey::UserName,
            SortDirection::Ascending,
        );
        assert_eq!(activities[0].user.as_ref().unwrap().name, "Ada");
        // The system entry with no user lands last.
        assert!(activities[2].user.is_none());
    }
}
