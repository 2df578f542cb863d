use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, instrument, warn};

use crate::{
    geometry::distance_between,
    problem::{
        location::{Location, LocationIndex},
        order::Order,
        route_point::RoutePoint,
        vehicle::Vehicle,
    },
    solver::{
        feasibility::estimate_travel_time_at,
        optimized_route::OptimizedRoute,
        optimizer_params::{OptimizerParams, Threads},
    },
};

/// Picks the cheapest vehicle for every unassigned order.
///
/// Orders are evaluated independently: a vehicle chosen for one order is
/// still a candidate for the next one in the same call. Orders whose
/// locations cannot be resolved, or for which no vehicle has enough battery,
/// produce no route.
pub fn optimize_assignment(
    orders: &[Order],
    vehicles: &[Vehicle],
    locations: &[Location],
) -> Vec<OptimizedRoute> {
    optimize_assignment_with(&OptimizerParams::default(), orders, vehicles, locations)
}

#[instrument(skip_all, level = "debug", fields(orders = orders.len(), vehicles = vehicles.len()))]
pub fn optimize_assignment_with(
    params: &OptimizerParams,
    orders: &[Order],
    vehicles: &[Vehicle],
    locations: &[Location],
) -> Vec<OptimizedRoute> {
    let unassigned: Vec<&Order> = orders.iter().filter(|order| order.is_unassigned()).collect();

    let index = LocationIndex::new(locations);
    let assign = |order: &&Order| best_assignment(params, order, vehicles, &index);

    let routes: Vec<OptimizedRoute> = match params.threads {
        Threads::Single => unassigned.iter().filter_map(assign).collect(),
        _ => match rayon::ThreadPoolBuilder::new()
            .num_threads(params.threads.number_of_threads())
            .build()
        {
            // collect keeps the input order
            Ok(pool) => pool.install(|| unassigned.par_iter().filter_map(assign).collect()),
            Err(error) => {
                warn!(%error, "Unable to build thread pool, assigning sequentially");
                unassigned.iter().filter_map(assign).collect()
            }
        },
    };

    debug!(
        assigned = routes.len(),
        unassigned = unassigned.len() - routes.len(),
        "Assignment finished"
    );

    routes
}

/// Cost of serving `order` with `vehicle`: travel time, a battery usage
/// factor and a penalty when the vehicle is already busy.
pub fn assignment_cost(params: &OptimizerParams, vehicle: &Vehicle, total_distance: f64) -> f64 {
    let travel_time = estimate_travel_time_at(total_distance, params.speed) as f64;
    let battery_usage_cost = (total_distance / 100.0) * params.battery_cost_factor;
    let workload_cost = if vehicle.is_moving() {
        params.workload_penalty
    } else {
        0.0
    };

    travel_time + battery_usage_cost + workload_cost
}

fn best_assignment(
    params: &OptimizerParams,
    order: &Order,
    vehicles: &[Vehicle],
    locations: &LocationIndex,
) -> Option<OptimizedRoute> {
    let (Some(from), Some(to)) = (
        locations.get(order.origin()),
        locations.get(order.destination()),
    ) else {
        debug!(order_id = %order.id(), "Skipping order with unknown locations");
        return None;
    };

    let pickup_to_delivery = distance_between(from, to);

    let mut best: Option<(&Vehicle, f64, f64)> = None;

    for vehicle in vehicles
        .iter()
        .filter(|vehicle| vehicle.battery() >= params.min_assignment_battery)
    {
        let to_pickup = distance_between(vehicle, from);
        let total_distance = to_pickup + pickup_to_delivery;
        let cost = assignment_cost(params, vehicle, total_distance);

        match best {
            Some((_, _, lowest_cost)) if cost >= lowest_cost => {}
            _ => best = Some((vehicle, total_distance, cost)),
        }
    }

    let Some((vehicle, distance, _)) = best else {
        debug!(order_id = %order.id(), "No vehicle can take the order");
        return None;
    };

    Some(OptimizedRoute {
        order_id: order.id(),
        vehicle_id: vehicle.id(),
        waypoints: vec![
            RoutePoint::current_position(vehicle.x(), vehicle.y()),
            RoutePoint::from(from),
            RoutePoint::from(to),
        ],
        distance,
        estimated_time: estimate_travel_time_at(distance, params.speed),
        priority: order.id().get(),
    })
}
