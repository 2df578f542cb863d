use crate::problem::{
    location::{Location, LocationId, LocationKind},
    route_point::RoutePoint,
    vehicle::{Vehicle, VehicleId, VehicleStatus},
};

pub fn create_locations(locations: Vec<(&str, f64, f64)>) -> Vec<Location> {
    locations
        .iter()
        .enumerate()
        .map(|(index, &(name, x, y))| {
            Location::new(
                LocationId::new(index as u32 + 1),
                name,
                x,
                y,
                LocationKind::Processing,
            )
        })
        .collect()
}

/// Locations named `L0`, `L1`, ... laid out row by row.
pub fn create_location_grid(rows: usize, cols: usize, spacing: f64) -> Vec<Location> {
    let mut locations = Vec::new();

    for y in 0..rows {
        for x in 0..cols {
            let index = locations.len();
            locations.push(Location::new(
                LocationId::new(index as u32 + 1),
                format!("L{index}"),
                x as f64 * spacing,
                y as f64 * spacing,
                LocationKind::Processing,
            ));
        }
    }

    locations
}

pub fn create_vehicle(id: u32, x: f64, y: f64, battery: u8, status: VehicleStatus) -> Vehicle {
    Vehicle::new(VehicleId::new(id), format!("AGV-{id:03}"), status, x, y, battery)
}

pub fn named_point(x: f64, y: f64, id: u32) -> RoutePoint {
    RoutePoint::from(&Location::new(
        LocationId::new(id),
        format!("P{id}"),
        x,
        y,
        LocationKind::Loading,
    ))
}
