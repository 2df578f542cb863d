use std::fmt::Display;

use courier_optimizer::{
    problem::{
        location::Location,
        order::{OrderId, OrderStatus},
        vehicle::{VehicleId, VehicleStatus},
    },
    solver::optimized_route::OptimizedRoute,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MessageError;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    VehicleUpdate,
    OrderUpdate,
    LocationUpdate,
    RouteOptimized,
    Alert,
    Heartbeat,
    Connect,
    Disconnect,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::VehicleUpdate => "VEHICLE_UPDATE",
            MessageType::OrderUpdate => "ORDER_UPDATE",
            MessageType::LocationUpdate => "LOCATION_UPDATE",
            MessageType::RouteOptimized => "ROUTE_OPTIMIZED",
            MessageType::Alert => "ALERT",
            MessageType::Heartbeat => "HEARTBEAT",
            MessageType::Connect => "CONNECT",
            MessageType::Disconnect => "DISCONNECT",
        }
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdate {
    pub vehicle_id: VehicleId,
    pub x: f64,
    pub y: f64,
    pub status: VehicleStatus,
    pub battery: u8,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub order_id: OrderId,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<VehicleId>,
    /// Completion percentage, 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptimized {
    pub order_id: OrderId,
    pub vehicle_id: VehicleId,
    pub distance: f64,
    pub estimated_time: u64,
    pub waypoints: Vec<Waypoint>,
}

impl From<&OptimizedRoute> for RouteOptimized {
    fn from(route: &OptimizedRoute) -> Self {
        RouteOptimized {
            order_id: route.order_id,
            vehicle_id: route.vehicle_id,
            distance: route.distance,
            estimated_time: route.estimated_time,
            waypoints: route
                .waypoints
                .iter()
                .map(|point| Waypoint {
                    x: point.x(),
                    y: point.y(),
                    name: point.location_name().to_owned(),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<VehicleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Heartbeat {
    pub timestamp: i64,
}

/// Payload of a [`Message`], one variant per [`MessageType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    VehicleUpdate(VehicleUpdate),
    OrderUpdate(OrderUpdate),
    LocationUpdate(Location),
    RouteOptimized(RouteOptimized),
    Alert(Alert),
    Heartbeat(Heartbeat),
    /// Session payloads are not interpreted by the client.
    Connect(Value),
    Disconnect(Value),
}

impl Payload {
    pub fn kind(&self) -> MessageType {
        match self {
            Payload::VehicleUpdate(_) => MessageType::VehicleUpdate,
            Payload::OrderUpdate(_) => MessageType::OrderUpdate,
            Payload::LocationUpdate(_) => MessageType::LocationUpdate,
            Payload::RouteOptimized(_) => MessageType::RouteOptimized,
            Payload::Alert(_) => MessageType::Alert,
            Payload::Heartbeat(_) => MessageType::Heartbeat,
            Payload::Connect(_) => MessageType::Connect,
            Payload::Disconnect(_) => MessageType::Disconnect,
        }
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Payload::VehicleUpdate(data) => serde_json::to_value(data),
            Payload::OrderUpdate(data) => serde_json::to_value(data),
            Payload::LocationUpdate(data) => serde_json::to_value(data),
            Payload::RouteOptimized(data) => serde_json::to_value(data),
            Payload::Alert(data) => serde_json::to_value(data),
            Payload::Heartbeat(data) => serde_json::to_value(data),
            Payload::Connect(data) | Payload::Disconnect(data) => Ok(data.clone()),
        }
    }

    fn from_value(kind: MessageType, data: Value) -> Result<Self, MessageError> {
        let payload = match kind {
            MessageType::VehicleUpdate => serde_json::from_value(data).map(Payload::VehicleUpdate),
            MessageType::OrderUpdate => serde_json::from_value(data).map(Payload::OrderUpdate),
            MessageType::LocationUpdate => {
                serde_json::from_value(data).map(Payload::LocationUpdate)
            }
            MessageType::RouteOptimized => {
                serde_json::from_value(data).map(Payload::RouteOptimized)
            }
            MessageType::Alert => serde_json::from_value(data).map(Payload::Alert),
            MessageType::Heartbeat => serde_json::from_value(data).map(Payload::Heartbeat),
            MessageType::Connect => Ok(Payload::Connect(data)),
            MessageType::Disconnect => Ok(Payload::Disconnect(data)),
        };

        payload.map_err(|source| MessageError::Payload { kind, source })
    }
}

/// Payload types that handlers can subscribe to directly.
pub trait PayloadData: Send + Sync + 'static {
    const KIND: MessageType;

    fn from_payload(payload: &Payload) -> Option<&Self>;
}

macro_rules! impl_payload_data {
    ($data:ty, $variant:ident) => {
        impl PayloadData for $data {
            const KIND: MessageType = MessageType::$variant;

            fn from_payload(payload: &Payload) -> Option<&Self> {
                match payload {
                    Payload::$variant(data) => Some(data),
                    _ => None,
                }
            }
        }
    };
}

impl_payload_data!(VehicleUpdate, VehicleUpdate);
impl_payload_data!(OrderUpdate, OrderUpdate);
impl_payload_data!(Location, LocationUpdate);
impl_payload_data!(RouteOptimized, RouteOptimized);
impl_payload_data!(Alert, Alert);
impl_payload_data!(Heartbeat, Heartbeat);

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    payload: Payload,
    /// Epoch milliseconds.
    timestamp: i64,
    id: Option<String>,
}

impl Message {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            timestamp: now_millis(),
            id: None,
        }
    }

    pub fn heartbeat() -> Self {
        let timestamp = now_millis();
        Self {
            payload: Payload::Heartbeat(Heartbeat { timestamp }),
            timestamp,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> MessageType {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn from_json(frame: &str) -> Result<Self, MessageError> {
        let wire: WireMessage = serde_json::from_str(frame)?;
        Ok(Message {
            payload: Payload::from_value(wire.kind, wire.data)?,
            timestamp: wire.timestamp,
            id: wire.id,
        })
    }

    pub fn to_json(&self) -> Result<String, MessageError> {
        let wire = WireMessage {
            kind: self.kind(),
            data: self
                .payload
                .to_value()
                .map_err(|source| MessageError::Payload {
                    kind: self.kind(),
                    source,
                })?,
            timestamp: self.timestamp,
            id: self.id.clone(),
        };

        Ok(serde_json::to_string(&wire)?)
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        Message::new(payload)
    }
}

#[derive(Deserialize, Serialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: MessageType,
    #[serde(default)]
    data: Value,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}

#[cfg(test)]
mod tests {
    use courier_optimizer::{
        problem::{location::LocationKind, route_point::RoutePoint},
        solver::optimized_route::OptimizedRoute,
    };
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_vehicle_update() {
        let frame = json!({
            "type": "VEHICLE_UPDATE",
            "data": {"vehicleId": 2, "x": 151.5, "y": 99.0, "status": "moving", "battery": 87},
            "timestamp": 1_700_000_000_000i64,
        })
        .to_string();

        let message = Message::from_json(&frame).unwrap();

        assert_eq!(message.kind(), MessageType::VehicleUpdate);
        assert_eq!(message.timestamp(), 1_700_000_000_000);
        assert_eq!(message.id(), None);
        assert_eq!(
            message.payload(),
            &Payload::VehicleUpdate(VehicleUpdate {
                vehicle_id: VehicleId::new(2),
                x: 151.5,
                y: 99.0,
                status: VehicleStatus::Moving,
                battery: 87,
            })
        );
    }

    #[test]
    fn test_parse_optional_fields() {
        let frame = r#"{"type":"ORDER_UPDATE","data":{"orderId":3,"status":"assigned"},"timestamp":5,"id":"abc"}"#;

        let message = Message::from_json(frame).unwrap();

        assert_eq!(message.id(), Some("abc"));
        let Payload::OrderUpdate(update) = message.payload() else {
            panic!("expected an order update");
        };
        assert_eq!(update.vehicle_id, None);
        assert_eq!(update.progress, None);
        assert_eq!(update.status, OrderStatus::Assigned);
    }

    #[test]
    fn test_parse_location_and_alert() {
        let location = Message::from_json(
            r#"{"type":"LOCATION_UPDATE","data":{"id":4,"name":"Dock","x":1,"y":2,"type":"unloading"},"timestamp":1}"#,
        )
        .unwrap();
        let Payload::LocationUpdate(location) = location.payload() else {
            panic!("expected a location update");
        };
        assert_eq!(location.kind(), LocationKind::Unloading);

        let alert = Message::from_json(
            r#"{"type":"ALERT","data":{"severity":"warning","message":"Low battery","vehicleId":1},"timestamp":1}"#,
        )
        .unwrap();
        let Payload::Alert(alert) = alert.payload() else {
            panic!("expected an alert");
        };
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.vehicle_id, Some(VehicleId::new(1)));
    }

    #[test]
    fn test_session_messages_are_opaque() {
        let message =
            Message::from_json(r#"{"type":"CONNECT","data":{"client":"x"},"timestamp":1}"#).unwrap();
        assert_eq!(message.payload(), &Payload::Connect(json!({"client": "x"})));

        let message = Message::from_json(r#"{"type":"DISCONNECT","timestamp":1}"#).unwrap();
        assert_eq!(message.payload(), &Payload::Disconnect(Value::Null));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Message::from_json("not json"), Err(MessageError::Json(_))));
        assert!(matches!(
            Message::from_json(r#"{"type":"TELEPORT","data":{},"timestamp":1}"#),
            Err(MessageError::Json(_))
        ));
        assert!(matches!(
            Message::from_json(r#"{"type":"HEARTBEAT","data":{"vehicleId":1},"timestamp":1}"#),
            Err(MessageError::Payload {
                kind: MessageType::Heartbeat,
                ..
            })
        ));
    }

    #[test]
    fn test_heartbeat_wire_format() {
        let message = Message::heartbeat().with_id("hb-1");

        let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "HEARTBEAT");
        assert_eq!(value["id"], "hb-1");
        assert_eq!(value["data"]["timestamp"], value["timestamp"]);
    }

    #[test]
    fn test_route_optimized_from_route() {
        let route = OptimizedRoute {
            order_id: OrderId::new(1),
            vehicle_id: VehicleId::new(2),
            waypoints: vec![
                RoutePoint::current_position(0.0, 0.0),
                RoutePoint::from(&Location::new(
                    1.into(),
                    "A",
                    30.0,
                    40.0,
                    LocationKind::Loading,
                )),
            ],
            distance: 50.0,
            estimated_time: 10,
            priority: 1,
        };

        let message = Message::new(Payload::RouteOptimized(RouteOptimized::from(&route)));
        let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "ROUTE_OPTIMIZED");
        assert_eq!(
            value["data"],
            json!({
                "orderId": 1,
                "vehicleId": 2,
                "distance": 50.0,
                "estimatedTime": 10,
                "waypoints": [
                    {"x": 0.0, "y": 0.0, "name": "Current Position"},
                    {"x": 30.0, "y": 40.0, "name": "A"}
                ]
            })
        );
    }
}
