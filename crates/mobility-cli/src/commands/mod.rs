//! Command handlers, one module per command group.

mod backups;
mod init;
mod logs;
mod misc;
mod restore;
mod scooters;
mod session;
mod travellers;
mod users;

pub use backups::handle_backups;
pub use init::handle_init;
pub use logs::handle_logs;
pub use misc::handle_completions;
pub use restore::handle_restore;
pub use scooters::handle_scooters;
pub use session::{handle_login, handle_passwd};
pub use travellers::handle_travellers;
pub use users::handle_users;

use mobility_core::SearchQuery;

use crate::cli::SearchArgs;

fn search_query(args: &SearchArgs) -> SearchQuery {
    let mut query = SearchQuery::new(&args.query);
    if let Some(ref field) = args.field {
        query = query.in_field(field);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    query
}
