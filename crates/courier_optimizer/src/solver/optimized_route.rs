use serde::Serialize;

use crate::problem::{order::OrderId, route_point::RoutePoint, vehicle::VehicleId};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    pub order_id: OrderId,
    pub vehicle_id: VehicleId,
    pub waypoints: Vec<RoutePoint>,
    pub distance: f64,
    /// Seconds.
    pub estimated_time: u64,
    /// Stable tie-break and display key, currently the order id.
    pub priority: u32,
}

/// Multi-order route for a single vehicle.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub vehicle_id: VehicleId,
    pub route: Vec<RoutePoint>,
    pub distance: f64,
    pub estimated_time: u64,
    pub battery_consumption: u32,
    pub can_complete: bool,
}
