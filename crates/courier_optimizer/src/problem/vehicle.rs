use geo::Point;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{define_id_newtype, geometry::Positioned};

define_id_newtype!(VehicleId);

pub const MAX_BATTERY: u8 = 100;

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Idle,
    Moving,
    Charging,
    Maintenance,
}

impl VehicleStatus {
    /// Idle and moving swap, everything else is brought back to idle.
    pub fn toggled(self) -> Self {
        match self {
            VehicleStatus::Idle => VehicleStatus::Moving,
            _ => VehicleStatus::Idle,
        }
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: VehicleId,
    name: String,
    status: VehicleStatus,
    x: f64,
    y: f64,
    #[serde(deserialize_with = "deserialize_battery")]
    #[schemars(with = "u8")]
    battery: u8,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        name: impl Into<String>,
        status: VehicleStatus,
        x: f64,
        y: f64,
        battery: u8,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            x,
            y,
            battery: battery.min(MAX_BATTERY),
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn battery(&self) -> u8 {
        self.battery
    }

    pub fn is_moving(&self) -> bool {
        self.status == VehicleStatus::Moving
    }

    pub fn set_status(&mut self, status: VehicleStatus) {
        self.status = status;
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_battery(&mut self, battery: u8) {
        self.battery = battery.min(MAX_BATTERY);
    }
}

impl Positioned for Vehicle {
    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

fn deserialize_battery<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let battery = u8::deserialize(deserializer)?;
    Ok(battery.min(MAX_BATTERY))
}
