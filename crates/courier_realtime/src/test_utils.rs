use std::time::Duration;

use serde_json::json;

use crate::{
    config::ConnectionConfig, connection::connection_manager::ConnectionManager,
    transport::memory::MemoryConnector,
};

pub fn memory_manager() -> (ConnectionManager, MemoryConnector) {
    let connector = MemoryConnector::new();
    let manager = ConnectionManager::new(connector.clone(), &ConnectionConfig::default())
        .expect("default config is valid");
    (manager, connector)
}

pub fn alert_frame(message: &str) -> String {
    json!({
        "type": "ALERT",
        "data": {"severity": "info", "message": message},
        "timestamp": 1,
    })
    .to_string()
}

/// Polls `condition` every 10ms of (usually paused) tokio time, giving up
/// after ten virtual minutes.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..60_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("condition not met in time");
}
