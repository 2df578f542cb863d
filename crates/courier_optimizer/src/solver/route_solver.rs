use tracing::trace;

use crate::{
    geometry::{Positioned, distance_between},
    problem::{
        location::{Location, find_by_name},
        order::Order,
        route_point::RoutePoint,
        vehicle::VehicleId,
    },
};

/// Orders `points` with the nearest neighbor heuristic, starting from the
/// first point. Ties go to the point that comes first in the input.
///
/// O(n²) and deterministic; the resulting tour is not guaranteed to be the
/// shortest one.
pub fn solve_sequence<P: Positioned + Clone>(points: &[P]) -> Vec<P> {
    let Some((anchor, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut visited = Vec::with_capacity(points.len());
    visited.push(anchor.clone());

    let mut unvisited: Vec<&P> = rest.iter().collect();
    let mut current = anchor;

    while let Some(index) = nearest_neighbor(current, &unvisited) {
        let next = unvisited.remove(index);
        visited.push(next.clone());
        current = next;
    }

    visited
}

fn nearest_neighbor<P: Positioned>(current: &P, unvisited: &[&P]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, candidate) in unvisited.iter().enumerate() {
        let distance = distance_between(current, *candidate);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }

    best.map(|(index, _)| index)
}

/// Route for a vehicle that already carries `orders`: its current position
/// first, then every pickup and delivery, ordered by [`solve_sequence`].
///
/// Endpoints whose location name is unknown are left out.
pub fn build_vehicle_route(
    vehicle_id: VehicleId,
    orders: &[&Order],
    locations: &[Location],
    start_x: f64,
    start_y: f64,
) -> Vec<RoutePoint> {
    let mut waypoints = Vec::with_capacity(1 + orders.len() * 2);
    waypoints.push(RoutePoint::current_position(start_x, start_y));

    for order in orders {
        for name in [order.origin(), order.destination()] {
            match find_by_name(locations, name) {
                Some(location) => waypoints.push(RoutePoint::from(location)),
                None => trace!(
                    vehicle_id = %vehicle_id,
                    order_id = %order.id(),
                    location = name,
                    "Skipping unknown location"
                ),
            }
        }
    }

    solve_sequence(&waypoints)
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use proptest::prelude::*;

    use crate::{
        problem::{location::LocationId, order::OrderId},
        test_utils,
    };

    use super::*;

    #[test]
    fn test_solve_sequence_degenerate() {
        assert!(solve_sequence::<Point>(&[]).is_empty());

        let single = vec![Point::new(3.0, 4.0)];
        assert_eq!(solve_sequence(&single), single);
    }

    #[test]
    fn test_solve_sequence_nearest_first() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(5.0, 0.0),
        ];

        assert_eq!(
            solve_sequence(&points),
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(10.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_solve_sequence_tie_keeps_input_order() {
        let points = vec![
            test_utils::named_point(0.0, 0.0, 1),
            test_utils::named_point(0.0, 5.0, 2),
            test_utils::named_point(5.0, 0.0, 3),
            test_utils::named_point(-5.0, 0.0, 4),
        ];

        let ids: Vec<_> = solve_sequence(&points)
            .iter()
            .map(|point| point.location_id().get())
            .collect();

        // every candidate is 5 units from the anchor, then (5,0) and (-5,0)
        // tie again from (0,5)
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_build_vehicle_route() {
        let locations = test_utils::create_locations(vec![
            ("Warehouse A", 50.0, 50.0),
            ("Station B", 150.0, 200.0),
            ("Warehouse C", 300.0, 100.0),
        ]);
        let orders = vec![
            Order::unassigned(OrderId::new(1), "Station B", "Warehouse C"),
            Order::unassigned(OrderId::new(2), "Warehouse A", "Nowhere"),
        ];
        let bound: Vec<&Order> = orders.iter().collect();

        let route = build_vehicle_route(VehicleId::new(1), &bound, &locations, 40.0, 40.0);

        let names: Vec<_> = route.iter().map(|point| point.location_name()).collect();
        assert_eq!(
            names,
            vec!["Current Position", "Warehouse A", "Station B", "Warehouse C"]
        );
        assert_eq!(route[1].location_id(), LocationId::new(1));
    }

    #[test]
    fn test_build_vehicle_route_without_orders() {
        let route = build_vehicle_route(VehicleId::new(1), &[], &[], 1.0, 2.0);

        assert_eq!(route, vec![RoutePoint::current_position(1.0, 2.0)]);
    }

    proptest! {
        #[test]
        fn test_solve_sequence_is_permutation(
            coordinates in prop::collection::vec((-500i32..500, -500i32..500), 0..40)
        ) {
            let points: Vec<Point> = coordinates
                .iter()
                .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
                .collect();

            let solved = solve_sequence(&points);

            prop_assert_eq!(solved.len(), points.len());
            prop_assert_eq!(solved.first(), points.first());

            let mut expected = coordinates.clone();
            let mut actual: Vec<(i32, i32)> = solved
                .iter()
                .map(|point| (point.x() as i32, point.y() as i32))
                .collect();
            expected.sort_unstable();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }
    }
}
