use std::io::IsTerminal;

use mobility_core::RestoreReport;

use crate::app::AppContext;
use crate::cli::BackupCommand;
use crate::output::{backup_row, finish_record, print_records, BACKUP_HEADERS};

pub fn handle_backups(ctx: &AppContext, command: &BackupCommand) -> anyhow::Result<()> {
    let (vault, session) = ctx.login()?;
    let actor = session.actor();

    match command {
        BackupCommand::Create => finish_record(ctx, vault.create_backup(actor), |backup| {
            format!("Created backup #{} ({})", backup.id, backup.file_name)
        }),
        BackupCommand::List => {
            let backups = vault.list_backups(actor)?;
            print_records(ctx, &backups, BACKUP_HEADERS, backup_row)
        }
        BackupCommand::Restore { backup_id } => {
            confirm_restore(ctx, &format!("backup #{}", backup_id))?;
            finish_record(ctx, vault.restore_backup(actor, *backup_id), report_message)
        }
    }
}

/// Ask before replacing the live store when a terminal is attached.
pub(super) fn confirm_restore(ctx: &AppContext, source: &str) -> anyhow::Result<()> {
    if !std::io::stdin().is_terminal() || ctx.cli().no_input || ctx.quiet() {
        return Ok(());
    }
    let proceed = dialoguer::Confirm::new()
        .with_prompt(format!("Replace all current records with {}?", source))
        .default(false)
        .interact()?;
    if !proceed {
        return Err(anyhow::anyhow!("Restore cancelled"));
    }
    Ok(())
}

pub(super) fn report_message(report: &RestoreReport) -> String {
    let mut message = format!(
        "Restored backup #{}. Pre-restore snapshot: {}",
        report.backup_id,
        report.snapshot_path.display()
    );
    if !report.removed_backups.is_empty() {
        let removed: Vec<String> = report
            .removed_backups
            .iter()
            .map(|id| format!("#{}", id))
            .collect();
        message.push_str(&format!("\nRemoved backups: {}", removed.join(", ")));
    }
    if report.failed_artifact_removals > 0 {
        message.push_str(&format!(
            "\nWarning: {} backup files could not be deleted",
            report.failed_artifact_removals
        ));
    }
    message
}
