use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::{fleet::Fleet, location::Location, order::Order, vehicle::Vehicle};

#[derive(Deserialize, Serialize, JsonSchema, Default)]
#[serde(rename = "Fleet", deny_unknown_fields)]
pub struct JsonFleet {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl JsonFleet {
    pub fn build_fleet(self) -> Fleet {
        Fleet::new(self.vehicles, self.orders, self.locations)
    }
}

impl From<&Fleet> for JsonFleet {
    fn from(fleet: &Fleet) -> Self {
        JsonFleet {
            vehicles: fleet.vehicles().to_vec(),
            orders: fleet.orders().to_vec(),
            locations: fleet.locations().to_vec(),
        }
    }
}
