use mobility_core::reply;

use crate::app::AppContext;
use crate::cli::RestoreCommand;
use crate::output::{finish, finish_record, print_records, request_row, REQUEST_HEADERS};

use super::backups::{confirm_restore, report_message};

pub fn handle_restore(ctx: &AppContext, command: &RestoreCommand) -> anyhow::Result<()> {
    let (vault, session) = ctx.login()?;
    let actor = session.actor();

    match command {
        RestoreCommand::Request { backup_id } => {
            finish_record(ctx, vault.request_restore(actor, *backup_id), |request| {
                format!(
                    "Restore request #{} for backup #{} is waiting for a code",
                    request.id, request.backup_id
                )
            })
        }
        RestoreCommand::Mine => {
            let requests = vault.my_restore_requests(actor)?;
            print_records(ctx, &requests, REQUEST_HEADERS, request_row)
        }
        RestoreCommand::Cancel { id } => finish(
            ctx,
            reply(vault.cancel_request(actor, *id), |_| {
                format!("Cancelled restore request #{}", id)
            }),
        ),
        RestoreCommand::Pending => {
            let requests = vault.pending_requests(actor)?;
            print_records(ctx, &requests, REQUEST_HEADERS, request_row)
        }
        RestoreCommand::Issue { id } => match vault.issue_code(actor, *id) {
            Ok(issued) if ctx.quiet() && !ctx.json() => {
                println!("{}", issued.code);
                Ok(())
            }
            result => finish_record(ctx, result, |issued| {
                format!(
                    "Restore code for request #{} (backup #{}): {}\nHand it to user #{}; it is shown only once.",
                    issued.request.id,
                    issued.request.backup_id,
                    issued.code,
                    issued.request.requester_id
                )
            }),
        },
        RestoreCommand::Revoke { id } => finish(
            ctx,
            reply(vault.revoke_code(actor, *id), |_| {
                format!("Revoked restore request #{}", id)
            }),
        ),
        RestoreCommand::Redeem { code } => {
            confirm_restore(ctx, "the backup this code unlocks")?;
            finish_record(ctx, vault.restore_with_code(actor, code), report_message)
        }
    }
}
