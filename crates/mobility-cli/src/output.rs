//! Output formatting helpers for the CLI.
//!
//! Every command ends in one `(success, message)` pair from
//! [`mobility_core::reply`]; records are rendered as tables or, with `--json`,
//! as pretty-printed JSON.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use mobility_core::model::{Backup, LogEntry, RestoreCode, Scooter, Traveller, User};
use mobility_core::reply;
use mobility_core::search::SearchStats;

use crate::app::AppContext;

/// Print the message of a successful reply, or turn a failed one into an error.
pub fn finish(ctx: &AppContext, (success, message): (bool, String)) -> anyhow::Result<()> {
    if !success {
        return Err(anyhow::anyhow!(message));
    }
    if !ctx.quiet() && !message.is_empty() {
        println!("{}", message);
    }
    Ok(())
}

/// Print a single record as JSON, or its success message.
pub fn finish_record<T: Serialize>(
    ctx: &AppContext,
    result: mobility_core::Result<T>,
    message: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if ctx.json() {
        if let Ok(ref value) = result {
            return print_json(value);
        }
    }
    finish(ctx, reply(result, |value| message(&value)))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Print records as JSON or as a table built by `row`.
pub fn print_records<T: Serialize>(
    ctx: &AppContext,
    records: &[T],
    headers: &[&str],
    row: impl Fn(&T) -> Vec<String>,
) -> anyhow::Result<()> {
    if ctx.json() {
        return print_json(records);
    }
    if records.is_empty() {
        if !ctx.quiet() {
            println!("No records.");
        }
        return Ok(());
    }
    println!("{}", render(headers, records.iter().map(row).collect()));
    Ok(())
}

pub fn print_search_stats(ctx: &AppContext, stats: &SearchStats) {
    if ctx.quiet() || ctx.json() {
        return;
    }
    let class = stats
        .class
        .map(|class| class.to_string())
        .unwrap_or_else(|| "field".to_string());
    eprintln!(
        "Searched {} rows as {} ({}): {} decryptions, {} skipped",
        stats.rows_scanned,
        class,
        stats.columns.join(", "),
        stats.decryptions,
        stats.skipped_rows
    );
}

pub const USER_HEADERS: &[&str] = &["ID", "USERNAME", "NAME", "ROLE", "REGISTERED"];

pub fn user_row(user: &User) -> Vec<String> {
    vec![
        user.id.to_string(),
        user.username.clone(),
        format!("{} {}", user.first_name, user.last_name),
        user.role.to_string(),
        user.registered_at.format("%Y-%m-%d").to_string(),
    ]
}

pub const TRAVELLER_HEADERS: &[&str] = &["ID", "NAME", "EMAIL", "PHONE", "CITY", "LICENSE"];

pub fn traveller_row(traveller: &Traveller) -> Vec<String> {
    vec![
        traveller.id.to_string(),
        format!("{} {}", traveller.first_name, traveller.last_name),
        traveller.email.clone(),
        traveller.mobile_phone.clone(),
        traveller.city.clone(),
        traveller.license_number.clone(),
    ]
}

pub const SCOOTER_HEADERS: &[&str] = &["ID", "BRAND", "MODEL", "SERIAL", "SOC", "TARGET", "STATUS"];

pub fn scooter_row(scooter: &Scooter) -> Vec<String> {
    vec![
        scooter.id.to_string(),
        scooter.brand.clone(),
        scooter.model.clone(),
        scooter.serial_number.clone(),
        format!("{}%", scooter.state_of_charge),
        format!("{}-{}%", scooter.target_soc_min, scooter.target_soc_max),
        if scooter.out_of_service {
            "out of service".to_string()
        } else {
            "in service".to_string()
        },
    ]
}

pub const BACKUP_HEADERS: &[&str] = &["ID", "FILE", "CREATED BY", "CREATED"];

pub fn backup_row(backup: &Backup) -> Vec<String> {
    vec![
        backup.id.to_string(),
        backup.file_name.clone(),
        backup
            .created_by
            .map(|id| format!("#{}", id))
            .unwrap_or_else(|| "super administrator".to_string()),
        backup.created_at.to_rfc3339(),
    ]
}

pub const REQUEST_HEADERS: &[&str] = &["ID", "BACKUP", "REQUESTER", "STATE", "REQUESTED"];

pub fn request_row(request: &RestoreCode) -> Vec<String> {
    vec![
        request.id.to_string(),
        request.backup_id.to_string(),
        request.requester_id.to_string(),
        request.state.to_string(),
        request.requested_at.to_rfc3339(),
    ]
}

pub const LOG_HEADERS: &[&str] = &["ID", "WHEN", "USER", "DESCRIPTION", "INFO", "SUSPICIOUS"];

pub fn log_row(entry: &LogEntry) -> Vec<String> {
    vec![
        entry.id.to_string(),
        entry.logged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        entry.username.clone(),
        entry.description.clone(),
        entry.additional_info.clone(),
        if entry.suspicious { "yes" } else { "no" }.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_headers_and_cells() {
        let out = render(&["ID", "NAME"], vec![vec!["7".to_string(), "Anna".to_string()]]);
        assert!(out.contains("NAME"));
        assert!(out.contains("Anna"));
    }
}
