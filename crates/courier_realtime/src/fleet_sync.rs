use std::sync::Arc;

use courier_optimizer::problem::{fleet::Fleet, location::Location};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    connection::connection_manager::ConnectionManager,
    handler_registry::Subscription,
    message::{Alert, OrderUpdate, RouteOptimized, Severity, VehicleUpdate},
};

/// Keeps a shared [`Fleet`] in sync with the updates received by a
/// [`ConnectionManager`].
pub struct FleetSync {
    subscriptions: Vec<Subscription>,
}

impl FleetSync {
    pub fn attach(manager: &ConnectionManager, fleet: Arc<Mutex<Fleet>>) -> Self {
        let mut subscriptions = Vec::with_capacity(5);

        let shared = Arc::clone(&fleet);
        subscriptions.push(manager.subscribe::<VehicleUpdate, _>(move |update| {
            let applied = shared.lock().update_vehicle(
                update.vehicle_id,
                update.x,
                update.y,
                update.status,
                update.battery,
            );
            if !applied {
                debug!(vehicle_id = %update.vehicle_id, "Update for unknown vehicle ignored");
            }
        }));

        let shared = Arc::clone(&fleet);
        subscriptions.push(manager.subscribe::<OrderUpdate, _>(move |update| {
            if !shared
                .lock()
                .update_order(update.order_id, update.status, update.vehicle_id)
            {
                debug!(order_id = %update.order_id, "Update for unknown order ignored");
            }
        }));

        let shared = Arc::clone(&fleet);
        subscriptions.push(manager.subscribe::<Location, _>(move |location| {
            shared.lock().upsert_location(location.clone());
        }));

        let shared = fleet;
        subscriptions.push(manager.subscribe::<RouteOptimized, _>(move |route| {
            if let Err(error) = shared.lock().assign_order(route.order_id, route.vehicle_id) {
                debug!(%error, "Optimized route not applied");
            }
        }));

        subscriptions.push(manager.subscribe::<Alert, _>(log_alert));

        Self { subscriptions }
    }

    pub fn detach(self, manager: &ConnectionManager) {
        for subscription in &self.subscriptions {
            manager.off(subscription);
        }
    }
}

fn log_alert(alert: &Alert) {
    let vehicle_id = alert.vehicle_id.map(|id| id.get());
    let order_id = alert.order_id.map(|id| id.get());

    match alert.severity {
        Severity::Info => info!(?vehicle_id, ?order_id, "{}", alert.message),
        Severity::Warning => warn!(?vehicle_id, ?order_id, "{}", alert.message),
        Severity::Error => error!(?vehicle_id, ?order_id, "{}", alert.message),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use courier_optimizer::problem::{
        location::{LocationId, LocationKind},
        order::{Order, OrderId, OrderStatus},
        vehicle::{Vehicle, VehicleId, VehicleStatus},
    };
    use serde_json::json;

    use super::*;
    use crate::test_utils::{memory_manager, wait_until};

    fn fleet() -> Arc<Mutex<Fleet>> {
        Arc::new(Mutex::new(Fleet::new(
            vec![Vehicle::new(
                VehicleId::new(1),
                "AGV-001",
                VehicleStatus::Idle,
                0.0,
                0.0,
                90,
            )],
            vec![Order::unassigned(OrderId::new(1), "A", "B")],
            vec![Location::new(
                LocationId::new(1),
                "A",
                0.0,
                0.0,
                LocationKind::Loading,
            )],
        )))
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_are_applied() {
        let (manager, connector) = memory_manager();
        let fleet = fleet();
        let _sync = FleetSync::attach(&manager, Arc::clone(&fleet));
        manager.connect().await.unwrap();

        let frames = [
            json!({"type": "VEHICLE_UPDATE", "data": {"vehicleId": 1, "x": 5, "y": 6, "status": "moving", "battery": 70}, "timestamp": 1}),
            json!({"type": "ORDER_UPDATE", "data": {"orderId": 1, "status": "pending", "vehicleId": 1, "progress": 10}, "timestamp": 2}),
            json!({"type": "LOCATION_UPDATE", "data": {"id": 2, "name": "B", "x": 30, "y": 40, "type": "unloading"}, "timestamp": 3}),
            json!({"type": "ALERT", "data": {"severity": "error", "message": "Obstacle", "vehicleId": 1}, "timestamp": 4}),
        ];
        for frame in frames {
            connector.push_frame(frame.to_string());
        }

        wait_until(|| fleet.lock().locations().len() == 2).await;

        let fleet = fleet.lock();
        let vehicle = fleet.vehicle(VehicleId::new(1)).unwrap();
        assert_eq!((vehicle.x(), vehicle.y()), (5.0, 6.0));
        assert_eq!(vehicle.status(), VehicleStatus::Moving);
        assert_eq!(vehicle.battery(), 70);

        let order = fleet.order(OrderId::new(1)).unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.vehicle(), Some("AGV-001"));

        assert_eq!(fleet.location(LocationId::new(2)).unwrap().name(), "B");
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_stops_updates() {
        let (manager, connector) = memory_manager();
        let fleet = fleet();
        let sync = FleetSync::attach(&manager, Arc::clone(&fleet));
        manager.connect().await.unwrap();

        sync.detach(&manager);

        connector.push_frame(
            json!({"type": "LOCATION_UPDATE", "data": {"id": 2, "name": "B", "x": 1, "y": 1, "type": "loading"}, "timestamp": 1})
                .to_string(),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(fleet.lock().locations().len(), 1);
    }
}
