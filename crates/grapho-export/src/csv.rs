//! CSV export of the user list.
//!
//! Fields are quoted only when they contain a comma or a quote; embedded
//! quotes are doubled. Dates render as `YYYY-MM-DD`, and a user who never
//! logged in exports as `Never`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use grapho_core::UserAccount;

use crate::ExportError;

const HEADERS: [&str; 8] = [
    "Name",
    "Email",
    "Role",
    "Status",
    "Registration Date",
    "Last Login",
    "Mobile",
    "Other Role",
];

/// Render the user list as CSV text.
pub fn render_users_csv(users: &[UserAccount]) -> Result<String, ExportError> {
    if users.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut out = String::new();
    out.push_str(&HEADERS.join(","));
    out.push('\n');

    for user in users {
        let status = if user.is_verified { "Verified" } else { "Pending" };
        let fields = [
            user.name.clone(),
            user.email.clone(),
            user.role.clone().unwrap_or_default(),
            status.to_string(),
            format_date(user.created_at, ""),
            format_date(user.last_login, "Never"),
            user.mobile.clone().unwrap_or_default(),
            user.other_role.clone().unwrap_or_default(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// Render and write the user list to `path`.
pub fn write_users_csv(path: &Path, users: &[UserAccount]) -> Result<(), ExportError> {
    let content = render_users_csv(users)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Conventional export file name for a given day.
#[must_use]
pub fn users_csv_file_name(date: NaiveDate) -> String {
    format!("users-data-{}.csv", date.format("%Y-%m-%d"))
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_date(date: Option<DateTime<Utc>>, missing: &str) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| missing.to_string())
}
