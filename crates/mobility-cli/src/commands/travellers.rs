use mobility_core::model::{NewTraveller, TravellerUpdate};
use mobility_core::reply;

use crate::app::AppContext;
use crate::cli::{TravellerAddArgs, TravellerCommand, TravellerUpdateArgs};
use crate::output::{
    finish, finish_record, print_records, print_search_stats, traveller_row, TRAVELLER_HEADERS,
};

use super::search_query;

pub fn handle_travellers(ctx: &AppContext, command: &TravellerCommand) -> anyhow::Result<()> {
    let (vault, session) = ctx.login()?;
    let actor = session.actor();

    match command {
        TravellerCommand::Add(args) => {
            finish_record(ctx, vault.create_traveller(actor, &new_traveller(args)), |t| {
                format!("Registered traveller #{}", t.id)
            })
        }
        TravellerCommand::List => {
            let travellers = vault.list_travellers(actor)?;
            print_records(ctx, &travellers, TRAVELLER_HEADERS, traveller_row)
        }
        TravellerCommand::Show { id } => {
            let traveller = vault.get_traveller(actor, *id)?;
            print_records(ctx, &[traveller], TRAVELLER_HEADERS, traveller_row)
        }
        TravellerCommand::Update(args) => finish_record(
            ctx,
            vault.update_traveller(actor, args.id, &traveller_update(args)),
            |t| format!("Updated traveller #{}", t.id),
        ),
        TravellerCommand::Delete { id } => finish(
            ctx,
            reply(vault.delete_traveller(actor, *id), |_| {
                format!("Deleted traveller #{}", id)
            }),
        ),
        TravellerCommand::Search(args) => {
            let results = vault.search_travellers(actor, &search_query(args))?;
            print_search_stats(ctx, &results.stats);
            print_records(ctx, &results.records, TRAVELLER_HEADERS, traveller_row)
        }
    }
}

fn new_traveller(args: &TravellerAddArgs) -> NewTraveller {
    NewTraveller {
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        birth_date: args.birth_date.clone(),
        gender: args.gender.clone(),
        street_name: args.street_name.clone(),
        house_number: args.house_number.clone(),
        zip_code: args.zip_code.clone(),
        city: args.city.clone(),
        email: args.email.clone(),
        mobile_phone: args.mobile_phone.clone(),
        license_number: args.license_number.clone(),
    }
}

fn traveller_update(args: &TravellerUpdateArgs) -> TravellerUpdate {
    TravellerUpdate {
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        birth_date: args.birth_date.clone(),
        gender: args.gender.clone(),
        street_name: args.street_name.clone(),
        house_number: args.house_number.clone(),
        zip_code: args.zip_code.clone(),
        city: args.city.clone(),
        email: args.email.clone(),
        mobile_phone: args.mobile_phone.clone(),
        license_number: args.license_number.clone(),
    }
}
