use tracing::debug;

use crate::{
    problem::{location::Location, order::Order, vehicle::Vehicle},
    solver::{
        feasibility::{
            can_complete_route_with, estimate_battery_consumption_with, estimate_travel_time_at,
            total_distance,
        },
        optimized_route::RoutePlan,
        optimizer_params::OptimizerParams,
        route_solver::build_vehicle_route,
    },
};

/// Builds a multi-stop route for every vehicle that has orders bound to it.
pub fn plan_vehicle_routes(
    vehicles: &[Vehicle],
    orders: &[Order],
    locations: &[Location],
) -> Vec<RoutePlan> {
    plan_vehicle_routes_with(&OptimizerParams::default(), vehicles, orders, locations)
}

pub fn plan_vehicle_routes_with(
    params: &OptimizerParams,
    vehicles: &[Vehicle],
    orders: &[Order],
    locations: &[Location],
) -> Vec<RoutePlan> {
    vehicles
        .iter()
        .filter_map(|vehicle| plan_vehicle_route(params, vehicle, orders, locations))
        .collect()
}

pub fn plan_vehicle_route(
    params: &OptimizerParams,
    vehicle: &Vehicle,
    orders: &[Order],
    locations: &[Location],
) -> Option<RoutePlan> {
    let bound: Vec<&Order> = orders
        .iter()
        .filter(|order| order.is_bound_to(vehicle.name()))
        .collect();

    if bound.is_empty() {
        return None;
    }

    let route = build_vehicle_route(vehicle.id(), &bound, locations, vehicle.x(), vehicle.y());
    let distance = total_distance(&route);
    let can_complete =
        can_complete_route_with(vehicle.battery(), distance, params.min_battery_reserve);

    if !can_complete {
        debug!(
            vehicle_id = %vehicle.id(),
            distance,
            battery = vehicle.battery(),
            "Route exceeds battery reserve"
        );
    }

    Some(RoutePlan {
        vehicle_id: vehicle.id(),
        distance,
        estimated_time: estimate_travel_time_at(distance, params.speed),
        battery_consumption: estimate_battery_consumption_with(distance, params.battery_efficiency),
        can_complete,
        route,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        problem::{
            order::{OrderId, OrderStatus},
            vehicle::{VehicleId, VehicleStatus},
        },
        test_utils,
    };

    use super::*;

    fn bound_order(id: u32, from: &str, to: &str, vehicle: &str) -> Order {
        Order::new(OrderId::new(id), from, to, Some(vehicle.to_owned()), OrderStatus::Assigned)
    }

    #[test]
    fn test_plan_only_for_vehicles_with_orders() {
        let vehicles = vec![
            test_utils::create_vehicle(1, 0.0, 0.0, 95, VehicleStatus::Idle),
            test_utils::create_vehicle(2, 10.0, 10.0, 95, VehicleStatus::Idle),
        ];
        let locations = test_utils::create_locations(vec![("A", 0.0, 0.0), ("B", 30.0, 40.0)]);
        let orders = vec![bound_order(1, "A", "B", "AGV-001")];

        let plans = plan_vehicle_routes(&vehicles, &orders, &locations);

        assert_eq!(plans.len(), 1);
        let plan = &plans[0];
        assert_eq!(plan.vehicle_id, VehicleId::new(1));
        assert_eq!(plan.route.len(), 3);
        assert_eq!(plan.distance, 50.0);
        assert_eq!(plan.estimated_time, 10);
        assert_eq!(plan.battery_consumption, 3);
        assert!(plan.can_complete);
    }

    #[test]
    fn test_plan_flags_infeasible_route() {
        let vehicles = vec![test_utils::create_vehicle(1, 0.0, 0.0, 12, VehicleStatus::Moving)];
        let locations = test_utils::create_locations(vec![("A", 0.0, 0.0), ("B", 0.0, 100.0)]);
        let orders = vec![bound_order(1, "A", "B", "AGV-001")];

        let plans = plan_vehicle_routes(&vehicles, &orders, &locations);

        assert_eq!(plans[0].battery_consumption, 5);
        assert!(!plans[0].can_complete);
    }

    #[test]
    fn test_plan_orders_multiple_stops() {
        let vehicles = vec![test_utils::create_vehicle(1, 0.0, 0.0, 95, VehicleStatus::Idle)];
        let locations = test_utils::create_locations(vec![
            ("Far", 100.0, 0.0),
            ("Near", 10.0, 0.0),
            ("Mid", 50.0, 0.0),
        ]);
        let orders = vec![
            bound_order(1, "Far", "Near", "AGV-001"),
            bound_order(2, "Mid", "Far", "AGV-001"),
        ];

        let plan = &plan_vehicle_routes(&vehicles, &orders, &locations)[0];

        let names: Vec<_> = plan.route.iter().map(|p| p.location_name()).collect();
        assert_eq!(names, vec!["Current Position", "Near", "Mid", "Far", "Far"]);
        assert_eq!(plan.distance, 100.0);
    }
}
