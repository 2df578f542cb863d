use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::define_id_newtype;

define_id_newtype!(OrderId);

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Unassigned,
    Pending,
    Assigned,
    Completed,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    from: String,
    to: String,
    /// Name of the vehicle the order is bound to.
    #[serde(default)]
    vehicle: Option<String>,
    status: OrderStatus,
}

impl Order {
    pub fn new(
        id: OrderId,
        from: impl Into<String>,
        to: impl Into<String>,
        vehicle: Option<String>,
        status: OrderStatus,
    ) -> Self {
        Self {
            id,
            from: from.into(),
            to: to.into(),
            vehicle,
            status,
        }
    }

    pub fn unassigned(id: OrderId, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(id, from, to, None, OrderStatus::Unassigned)
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Name of the pickup location.
    pub fn origin(&self) -> &str {
        &self.from
    }

    /// Name of the delivery location.
    pub fn destination(&self) -> &str {
        &self.to
    }

    pub fn vehicle(&self) -> Option<&str> {
        self.vehicle.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_unassigned(&self) -> bool {
        self.status == OrderStatus::Unassigned
    }

    pub fn is_bound_to(&self, vehicle_name: &str) -> bool {
        self.vehicle.as_deref() == Some(vehicle_name)
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub fn bind(&mut self, vehicle_name: impl Into<String>, status: OrderStatus) {
        self.vehicle = Some(vehicle_name.into());
        self.status = status;
    }
}
