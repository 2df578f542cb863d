use geo::Point;
use serde::Serialize;

use crate::{
    geometry::Positioned,
    problem::location::{Location, LocationId},
};

pub const CURRENT_POSITION_NAME: &str = "Current Position";

/// Where a waypoint comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Stop {
    /// The vehicle's live position at optimization time.
    CurrentPosition,
    Location { id: LocationId, name: String },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(into = "WireRoutePoint")]
pub struct RoutePoint {
    x: f64,
    y: f64,
    stop: Stop,
}

impl RoutePoint {
    pub fn current_position(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            stop: Stop::CurrentPosition,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn stop(&self) -> &Stop {
        &self.stop
    }

    /// `0` for the current position sentinel.
    pub fn location_id(&self) -> LocationId {
        match &self.stop {
            Stop::CurrentPosition => LocationId::new(0),
            Stop::Location { id, .. } => *id,
        }
    }

    pub fn location_name(&self) -> &str {
        match &self.stop {
            Stop::CurrentPosition => CURRENT_POSITION_NAME,
            Stop::Location { name, .. } => name,
        }
    }

    pub fn is_current_position(&self) -> bool {
        self.stop == Stop::CurrentPosition
    }
}

impl From<&Location> for RoutePoint {
    fn from(location: &Location) -> Self {
        Self {
            x: location.x(),
            y: location.y(),
            stop: Stop::Location {
                id: location.id(),
                name: location.name().to_owned(),
            },
        }
    }
}

impl Positioned for RoutePoint {
    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRoutePoint {
    x: f64,
    y: f64,
    location_id: LocationId,
    location_name: String,
}

impl From<RoutePoint> for WireRoutePoint {
    fn from(point: RoutePoint) -> Self {
        WireRoutePoint {
            x: point.x,
            y: point.y,
            location_id: point.location_id(),
            location_name: point.location_name().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::problem::location::LocationKind;

    use super::*;

    #[test]
    fn test_current_position_sentinel() {
        let point = RoutePoint::current_position(4.0, 2.0);

        assert!(point.is_current_position());
        assert_eq!(point.location_id(), LocationId::new(0));
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            serde_json::json!({"x": 4.0, "y": 2.0, "locationId": 0, "locationName": "Current Position"})
        );
    }

    #[test]
    fn test_from_location() {
        let location = Location::new(
            LocationId::new(3),
            "Warehouse C",
            300.0,
            100.0,
            LocationKind::Unloading,
        );
        let point = RoutePoint::from(&location);

        assert_eq!(point.location_id(), LocationId::new(3));
        assert_eq!(point.location_name(), "Warehouse C");
        assert_eq!((point.x(), point.y()), (300.0, 100.0));
    }
}
