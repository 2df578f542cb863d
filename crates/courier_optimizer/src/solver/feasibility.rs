use crate::{
    geometry::{Positioned, distance_between},
    solver::optimizer_params::{
        DEFAULT_BATTERY_EFFICIENCY, DEFAULT_MIN_BATTERY_RESERVE, DEFAULT_SPEED,
    },
};

/// Whole seconds needed to cover `distance` at `speed` units per second.
pub fn estimate_travel_time_at(distance: f64, speed: f64) -> u64 {
    (distance / speed).round() as u64
}

pub fn estimate_travel_time(distance: f64) -> u64 {
    estimate_travel_time_at(distance, DEFAULT_SPEED)
}

/// Battery percentage drained by `distance`: 5% per 100 units, scaled by
/// `efficiency`.
pub fn estimate_battery_consumption_with(distance: f64, efficiency: f64) -> u32 {
    ((distance / 100.0) * 5.0 * efficiency).round() as u32
}

pub fn estimate_battery_consumption(distance: f64) -> u32 {
    estimate_battery_consumption_with(distance, DEFAULT_BATTERY_EFFICIENCY)
}

pub fn can_complete_route_with(current_battery: u8, distance: f64, min_reserve: u8) -> bool {
    let consumption = i64::from(estimate_battery_consumption(distance));
    i64::from(current_battery) - consumption >= i64::from(min_reserve)
}

pub fn can_complete_route(current_battery: u8, distance: f64) -> bool {
    can_complete_route_with(current_battery, distance, DEFAULT_MIN_BATTERY_RESERVE)
}

pub fn total_distance<P: Positioned>(route: &[P]) -> f64 {
    route
        .windows(2)
        .map(|pair| distance_between(&pair[0], &pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;

    #[test]
    fn test_estimate_travel_time() {
        assert_eq!(estimate_travel_time(50.0), 10);
        assert_eq!(estimate_travel_time(0.0), 0);
        assert_eq!(estimate_travel_time(12.4), 2);
        assert_eq!(estimate_travel_time(12.5), 3);
        assert_eq!(estimate_travel_time_at(100.0, 10.0), 10);
    }

    #[test]
    fn test_estimate_battery_consumption() {
        assert_eq!(estimate_battery_consumption(100.0), 5);
        assert_eq!(estimate_battery_consumption(0.0), 0);
        assert_eq!(estimate_battery_consumption(250.0), 13);
        assert_eq!(estimate_battery_consumption_with(100.0, 2.0), 10);
    }

    #[test]
    fn test_can_complete_route() {
        assert!(can_complete_route(20, 100.0));
        assert!(!can_complete_route(14, 100.0));
        // boundary: 15 - 5 == 10
        assert!(can_complete_route(15, 100.0));
        assert!(!can_complete_route(0, 1000.0));
        assert!(can_complete_route_with(5, 100.0, 0));
    }

    #[test]
    fn test_feasibility_matches_consumption() {
        for battery in 0..=100u8 {
            for distance in [0.0, 10.0, 99.0, 100.0, 310.0, 1_000.0, 1_890.0] {
                let consumption = i64::from(estimate_battery_consumption(distance));
                let expected = consumption <= i64::from(battery) - 10;
                assert_eq!(can_complete_route(battery, distance), expected);
            }
        }
    }

    #[test]
    fn test_total_distance() {
        let route = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 40.0),
            Point::new(30.0, 0.0),
        ];

        assert_eq!(total_distance(&route), 90.0);
        assert_eq!(total_distance(&route[..1]), 0.0);
        assert_eq!(total_distance::<Point>(&[]), 0.0);
    }
}
