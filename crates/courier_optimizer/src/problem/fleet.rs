use thiserror::Error;
use tracing::debug;

use crate::{
    problem::{
        location::{Location, LocationId, LocationKind, find_by_name},
        order::{Order, OrderId, OrderStatus},
        vehicle::{Vehicle, VehicleId, VehicleStatus},
    },
    solver::optimized_route::OptimizedRoute,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FleetError {
    #[error("Orders need both a pickup and a delivery location")]
    MissingEndpoint,

    #[error("Unknown vehicle {0}")]
    UnknownVehicle(VehicleId),

    #[error("Unknown order {0}")]
    UnknownOrder(OrderId),

    #[error("No identifier left above {0}")]
    IdsExhausted(u32),
}

/// The canonical vehicle, order and location collections of a plant.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
    orders: Vec<Order>,
    locations: Vec<Location>,
}

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>, orders: Vec<Order>, locations: Vec<Location>) -> Self {
        Self {
            vehicles,
            orders,
            locations,
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id() == id)
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == id)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|location| location.id() == id)
    }

    pub fn vehicle_by_name(&self, name: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.name() == name)
    }

    pub fn location_by_name(&self, name: &str) -> Option<&Location> {
        find_by_name(&self.locations, name)
    }

    pub fn add_location(
        &mut self,
        name: impl Into<String>,
        x: f64,
        y: f64,
        kind: LocationKind,
    ) -> Result<LocationId, FleetError> {
        let id = next_id(self.locations.iter().map(|location| location.id().get()))?;
        let id = LocationId::new(id);
        self.locations.push(Location::new(id, name, x, y, kind));
        Ok(id)
    }

    /// Inserts `location`, replacing any location with the same id.
    pub fn upsert_location(&mut self, location: Location) {
        match self
            .locations
            .iter_mut()
            .find(|existing| existing.id() == location.id())
        {
            Some(existing) => *existing = location,
            None => self.locations.push(location),
        }
    }

    pub fn remove_location(&mut self, id: LocationId) -> bool {
        let before = self.locations.len();
        self.locations.retain(|location| location.id() != id);
        self.locations.len() != before
    }

    /// Creates a new order, pending when a vehicle is given and unassigned
    /// otherwise.
    pub fn create_order(
        &mut self,
        from: &str,
        to: &str,
        vehicle_id: Option<VehicleId>,
    ) -> Result<OrderId, FleetError> {
        if from.is_empty() || to.is_empty() {
            return Err(FleetError::MissingEndpoint);
        }

        let vehicle_name = match vehicle_id {
            Some(vehicle_id) => Some(
                self.vehicle(vehicle_id)
                    .ok_or(FleetError::UnknownVehicle(vehicle_id))?
                    .name()
                    .to_owned(),
            ),
            None => None,
        };

        let status = if vehicle_name.is_some() {
            OrderStatus::Pending
        } else {
            OrderStatus::Unassigned
        };

        let id = OrderId::new(next_id(self.orders.iter().map(|order| order.id().get()))?);
        self.orders.push(Order::new(id, from, to, vehicle_name, status));

        debug!(order_id = %id, from, to, "Order created");

        Ok(id)
    }

    pub fn assign_order(
        &mut self,
        order_id: OrderId,
        vehicle_id: VehicleId,
    ) -> Result<(), FleetError> {
        let vehicle_name = self
            .vehicle(vehicle_id)
            .ok_or(FleetError::UnknownVehicle(vehicle_id))?
            .name()
            .to_owned();

        self.order_mut(order_id)?
            .bind(vehicle_name, OrderStatus::Assigned);

        Ok(())
    }

    /// Binds every routed order to the vehicle chosen for it.
    pub fn apply_assignments(&mut self, routes: &[OptimizedRoute]) -> Result<(), FleetError> {
        for route in routes {
            self.assign_order(route.order_id, route.vehicle_id)?;
        }

        Ok(())
    }

    pub fn remove_order(&mut self, id: OrderId) -> bool {
        let before = self.orders.len();
        self.orders.retain(|order| order.id() != id);
        self.orders.len() != before
    }

    pub fn set_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), FleetError> {
        self.order_mut(id)?.set_status(status);
        Ok(())
    }

    pub fn set_vehicle_status(
        &mut self,
        id: VehicleId,
        status: VehicleStatus,
    ) -> Result<(), FleetError> {
        self.vehicle_mut(id)?.set_status(status);
        Ok(())
    }

    pub fn toggle_vehicle_status(&mut self, id: VehicleId) -> Result<VehicleStatus, FleetError> {
        let vehicle = self.vehicle_mut(id)?;
        let status = vehicle.status().toggled();
        vehicle.set_status(status);
        Ok(status)
    }

    /// Applies a live vehicle update. Returns `false` for unknown vehicles.
    pub fn update_vehicle(
        &mut self,
        id: VehicleId,
        x: f64,
        y: f64,
        status: VehicleStatus,
        battery: u8,
    ) -> bool {
        let Ok(vehicle) = self.vehicle_mut(id) else {
            return false;
        };

        vehicle.set_position(x, y);
        vehicle.set_status(status);
        vehicle.set_battery(battery);
        true
    }

    /// Applies a live order update. Returns `false` when the order or the
    /// referenced vehicle is unknown.
    pub fn update_order(
        &mut self,
        id: OrderId,
        status: OrderStatus,
        vehicle_id: Option<VehicleId>,
    ) -> bool {
        let vehicle_name = match vehicle_id {
            Some(vehicle_id) => match self.vehicle(vehicle_id) {
                Some(vehicle) => Some(vehicle.name().to_owned()),
                None => return false,
            },
            None => None,
        };

        let Ok(order) = self.order_mut(id) else {
            return false;
        };

        match vehicle_name {
            Some(name) => order.bind(name, status),
            None => order.set_status(status),
        }
        true
    }

    fn vehicle_mut(&mut self, id: VehicleId) -> Result<&mut Vehicle, FleetError> {
        self.vehicles
            .iter_mut()
            .find(|vehicle| vehicle.id() == id)
            .ok_or(FleetError::UnknownVehicle(id))
    }

    fn order_mut(&mut self, id: OrderId) -> Result<&mut Order, FleetError> {
        self.orders
            .iter_mut()
            .find(|order| order.id() == id)
            .ok_or(FleetError::UnknownOrder(id))
    }
}

fn next_id(ids: impl Iterator<Item = u32>) -> Result<u32, FleetError> {
    let max = ids.max().unwrap_or(0);
    max.checked_add(1).ok_or(FleetError::IdsExhausted(max))
}
