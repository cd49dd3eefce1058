use mobility_core::model::{NewUser, UserUpdate};
use mobility_core::{reply, Role};

use crate::app::{prompt_new_password, AppContext};
use crate::cli::{UserAddArgs, UserCommand, UserUpdateArgs};
use crate::output::{
    finish, finish_record, print_records, print_search_stats, user_row, USER_HEADERS,
};

use super::search_query;

pub fn handle_users(ctx: &AppContext, command: &UserCommand) -> anyhow::Result<()> {
    let (vault, session) = ctx.login()?;
    let actor = session.actor();

    match command {
        UserCommand::Add(args) => {
            let new = new_user(ctx, args)?;
            finish_record(ctx, vault.create_user(actor, &new), |user| {
                format!("Created {} {} (#{})", user.role, user.username, user.id)
            })
        }
        UserCommand::List => {
            let users = vault.list_users(actor)?;
            print_records(ctx, &users, USER_HEADERS, user_row)
        }
        UserCommand::Show { id } => {
            let user = vault.get_user(actor, *id)?;
            print_records(ctx, &[user], USER_HEADERS, user_row)
        }
        UserCommand::Update(args) => {
            let update = user_update(args)?;
            finish_record(ctx, vault.update_user(actor, args.id, &update), |user| {
                format!("Updated {} (#{})", user.username, user.id)
            })
        }
        UserCommand::Delete { id } => finish(
            ctx,
            reply(vault.delete_user(actor, *id), |_| format!("Deleted user #{}", id)),
        ),
        UserCommand::ResetPassword { id } => match vault.reset_password(actor, *id) {
            Ok(code) if ctx.quiet() => {
                println!("{}", code);
                Ok(())
            }
            result => finish(
                ctx,
                reply(result, |code| {
                    format!(
                        "Temporary password for user #{}: {}\nIt works once and must be changed at first login.",
                        id, code
                    )
                }),
            ),
        },
        UserCommand::Search(args) => {
            let results = vault.search_users(actor, &search_query(args))?;
            print_search_stats(ctx, &results.stats);
            print_records(ctx, &results.records, USER_HEADERS, user_row)
        }
    }
}

fn new_user(ctx: &AppContext, args: &UserAddArgs) -> anyhow::Result<NewUser> {
    let role: Role = args.role.parse()?;
    let password = prompt_new_password(ctx.cli().no_input)?;
    Ok(NewUser::new(
        &args.username,
        password,
        &args.first_name,
        &args.last_name,
        role,
    ))
}

fn user_update(args: &UserUpdateArgs) -> anyhow::Result<UserUpdate> {
    let role = args.role.as_deref().map(str::parse::<Role>).transpose()?;
    Ok(UserUpdate {
        username: args.username.clone(),
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        role,
    })
}
