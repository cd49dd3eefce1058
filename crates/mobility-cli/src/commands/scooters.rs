use mobility_core::model::{NewScooter, ScooterUpdate};
use mobility_core::reply;

use crate::app::AppContext;
use crate::cli::{ScooterAddArgs, ScooterCommand, ScooterUpdateArgs};
use crate::output::{
    finish, finish_record, print_records, print_search_stats, scooter_row, SCOOTER_HEADERS,
};

use super::search_query;

pub fn handle_scooters(ctx: &AppContext, command: &ScooterCommand) -> anyhow::Result<()> {
    let (vault, session) = ctx.login()?;
    let actor = session.actor();

    match command {
        ScooterCommand::Add(args) => {
            finish_record(ctx, vault.create_scooter(actor, &new_scooter(args)), |s| {
                format!("Put scooter {} into service (#{})", s.serial_number, s.id)
            })
        }
        ScooterCommand::List => {
            let scooters = vault.list_scooters(actor)?;
            print_records(ctx, &scooters, SCOOTER_HEADERS, scooter_row)
        }
        ScooterCommand::Show { id } => {
            let scooter = vault.get_scooter(actor, *id)?;
            print_records(ctx, &[scooter], SCOOTER_HEADERS, scooter_row)
        }
        ScooterCommand::Update(args) => finish_record(
            ctx,
            vault.update_scooter(actor, args.id, &scooter_update(args)),
            |s| format!("Updated scooter #{}", s.id),
        ),
        ScooterCommand::Delete { id } => finish(
            ctx,
            reply(vault.delete_scooter(actor, *id), |_| {
                format!("Deleted scooter #{}", id)
            }),
        ),
        ScooterCommand::Search(args) => {
            let results = vault.search_scooters(actor, &search_query(args))?;
            print_search_stats(ctx, &results.stats);
            print_records(ctx, &results.records, SCOOTER_HEADERS, scooter_row)
        }
    }
}

fn new_scooter(args: &ScooterAddArgs) -> NewScooter {
    NewScooter {
        brand: args.brand.clone(),
        model: args.model.clone(),
        serial_number: args.serial_number.clone(),
        top_speed: args.top_speed,
        battery_capacity: args.battery_capacity,
        state_of_charge: args.state_of_charge,
        target_soc_min: args.target_soc_min,
        target_soc_max: args.target_soc_max,
        latitude: args.latitude,
        longitude: args.longitude,
        out_of_service: args.out_of_service,
        mileage: args.mileage,
        last_maintenance: args.last_maintenance.clone(),
    }
}

fn scooter_update(args: &ScooterUpdateArgs) -> ScooterUpdate {
    ScooterUpdate {
        brand: args.brand.clone(),
        model: args.model.clone(),
        serial_number: args.serial_number.clone(),
        top_speed: args.top_speed,
        battery_capacity: args.battery_capacity,
        state_of_charge: args.state_of_charge,
        target_soc_min: args.target_soc_min,
        target_soc_max: args.target_soc_max,
        latitude: args.latitude,
        longitude: args.longitude,
        out_of_service: args.out_of_service,
        mileage: args.mileage,
        last_maintenance: args.last_maintenance.clone(),
    }
}
