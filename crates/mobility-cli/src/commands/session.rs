use mobility_core::reply;

use crate::app::{prompt_new_password, AppContext};
use crate::output::finish;

pub fn handle_login(ctx: &AppContext) -> anyhow::Result<()> {
    let (vault, session) = ctx.login_allowing_temporary()?;
    let actor = session.actor();
    if session.must_change_password() {
        return finish(
            ctx,
            (
                true,
                format!(
                    "Logged in as {} with a temporary password. Run `mobility passwd` now.",
                    actor.username()
                ),
            ),
        );
    }

    let mut message = format!("Logged in as {} ({})", actor.username(), actor.role());
    if let Ok(count) = vault.unseen_suspicious_count(actor) {
        if count > 0 {
            message.push_str(&format!(
                "\n{} suspicious log entries not yet seen. Run `mobility logs list`.",
                count
            ));
        }
    }
    finish(ctx, (true, message))
}

pub fn handle_passwd(ctx: &AppContext) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let (username, password) = ctx.credentials()?;
    let mut session = vault
        .login(&username, &password)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let new_password = prompt_new_password(ctx.cli().no_input)?;

    let current = (!session.must_change_password()).then_some(password.as_str());
    let result = vault.change_own_password(&mut session, current, &new_password);
    finish(ctx, reply(result, |_| "Password changed".to_string()))
}
