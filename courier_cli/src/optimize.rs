use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Args;
use comfy_table::Table;
use courier_optimizer::{
    json::types::JsonFleet,
    problem::{fleet::Fleet, vehicle::VehicleId},
    solver::{
        assignment::optimize_assignment_with,
        optimized_route::{OptimizedRoute, RoutePlan},
        optimizer_params::{OptimizerParams, Threads},
        route_plan::plan_vehicle_routes_with,
    },
};
use tracing::info;

#[derive(Args)]
pub struct OptimizeArgs {
    /// Fleet file with vehicles, orders and locations
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Threads used to evaluate orders, 0 picks one per core
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Bind the assignments and print the resulting route of every vehicle
    #[arg(long)]
    plan: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

pub fn run(args: OptimizeArgs) -> anyhow::Result<()> {
    let file = File::open(&args.input)?;
    let content: JsonFleet = serde_json::from_reader(BufReader::new(file))?;
    let mut fleet = content.build_fleet();

    info!(
        "Optimizing {:?}: vehicles = {}, orders = {}, locations = {}",
        args.input,
        fleet.vehicles().len(),
        fleet.orders().len(),
        fleet.locations().len()
    );

    let params = OptimizerParams {
        threads: match args.threads {
            0 => Threads::Auto,
            1 => Threads::Single,
            n => Threads::Multi(n),
        },
        ..OptimizerParams::default()
    };

    let routes =
        optimize_assignment_with(&params, fleet.orders(), fleet.vehicles(), fleet.locations());
    let unassigned = fleet.orders().iter().filter(|order| order.is_unassigned()).count();
    info!("Finished: assigned = {}, skipped = {}", routes.len(), unassigned - routes.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
    } else {
        println!("{}", routes_table(&fleet, &routes));
    }

    if args.plan {
        fleet.apply_assignments(&routes)?;
        let plans =
            plan_vehicle_routes_with(&params, fleet.vehicles(), fleet.orders(), fleet.locations());

        if args.json {
            println!("{}", serde_json::to_string_pretty(&plans)?);
        } else {
            println!("{}", plans_table(&fleet, &plans));
        }
    }

    Ok(())
}

fn vehicle_name(fleet: &Fleet, id: VehicleId) -> String {
    fleet
        .vehicle(id)
        .map_or_else(|| id.to_string(), |vehicle| vehicle.name().to_owned())
}

fn routes_table(fleet: &Fleet, routes: &[OptimizedRoute]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Order", "Vehicle", "Waypoints", "Distance", "Time (s)"]);

    for route in routes {
        let waypoints: Vec<&str> = route
            .waypoints
            .iter()
            .map(|point| point.location_name())
            .collect();

        table.add_row(vec![
            route.order_id.to_string(),
            vehicle_name(fleet, route.vehicle_id),
            waypoints.join(" -> "),
            format!("{:.1}", route.distance),
            route.estimated_time.to_string(),
        ]);
    }

    table
}

fn plans_table(fleet: &Fleet, plans: &[RoutePlan]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Vehicle",
        "Stops",
        "Distance",
        "Time (s)",
        "Battery",
        "Feasible",
    ]);

    for plan in plans {
        table.add_row(vec![
            vehicle_name(fleet, plan.vehicle_id),
            plan.route.len().to_string(),
            format!("{:.1}", plan.distance),
            plan.estimated_time.to_string(),
            format!("{}%", plan.battery_consumption),
            if plan.can_complete { "yes" } else { "no" }.to_owned(),
        ]);
    }

    table
}
