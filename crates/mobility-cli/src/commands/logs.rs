use crate::app::AppContext;
use crate::cli::LogCommand;
use crate::output::{finish, log_row, print_json, print_records, LOG_HEADERS};

pub fn handle_logs(ctx: &AppContext, command: &LogCommand) -> anyhow::Result<()> {
    let (vault, session) = ctx.login()?;
    let actor = session.actor();

    match command {
        LogCommand::List => {
            let entries = vault.list_logs(actor)?;
            print_records(ctx, &entries, LOG_HEADERS, log_row)
        }
        LogCommand::Alerts => {
            let count = vault.unseen_suspicious_count(actor)?;
            if ctx.json() {
                return print_json(&serde_json::json!({ "unseen_suspicious": count }));
            }
            finish(
                ctx,
                (true, format!("{} suspicious log entries not yet seen", count)),
            )
        }
    }
}
