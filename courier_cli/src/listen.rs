use std::{fs::File, io::BufReader, path::PathBuf, sync::Arc, time::Duration};

use clap::Args;
use courier_optimizer::{json::types::JsonFleet, problem::fleet::Fleet};
use courier_realtime::{
    config::ConnectionConfig,
    connection::{
        ConnectionNotice, connection_manager::ConnectionManager, connection_state::ConnectionState,
    },
    fleet_sync::FleetSync,
};
use parking_lot::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::parsers;

#[derive(Args)]
pub struct ListenArgs {
    /// WebSocket endpoint, defaults to COURIER_WS_URL
    #[arg(long)]
    url: Option<String>,

    /// Fleet file used as the initial state
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    #[arg(long)]
    max_reconnect_attempts: Option<u32>,

    /// Delay between reconnect attempts (e.g., "3s", "PT5S")
    #[arg(long, value_parser = parsers::parse_duration)]
    reconnect_delay: Option<Duration>,

    #[arg(long, value_parser = parsers::parse_duration)]
    heartbeat: Option<Duration>,
}

pub async fn run(args: ListenArgs) -> anyhow::Result<()> {
    let mut config = ConnectionConfig::from_env()?;
    if let Some(url) = args.url {
        config.url = url;
    }
    if let Some(attempts) = args.max_reconnect_attempts {
        config.max_reconnect_attempts = attempts;
    }
    if let Some(delay) = args.reconnect_delay {
        config.reconnect_delay = delay;
    }
    if let Some(heartbeat) = args.heartbeat {
        config.heartbeat_interval = heartbeat;
    }

    let fleet = match args.input {
        Some(path) => {
            let content: JsonFleet = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            content.build_fleet()
        }
        None => Fleet::default(),
    };
    let fleet = Arc::new(Mutex::new(fleet));

    let manager = ConnectionManager::websocket(&config)?;
    let sync = FleetSync::attach(&manager, Arc::clone(&fleet));

    let mut notices = manager.notices();
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(ConnectionNotice::StateChanged(state)) => info!("Connection {}", state),
                Ok(ConnectionNotice::TransportError(error)) => warn!("Transport: {}", error),
                Ok(ConnectionNotice::ReconnectsExhausted { attempts }) => {
                    warn!("Gave up after {} reconnect attempts", attempts)
                }
                Ok(ConnectionNotice::SendWhileFailed { kind }) => {
                    warn!("{} queued while the connection is failed", kind)
                }
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} notices", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!("Connecting to {}", config.url);
    manager.connect().await?;

    let mut state = manager.watch_state();
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = state.wait_for(|state| *state == ConnectionState::Failed) => {}
    }

    sync.detach(&manager);
    manager.disconnect().await?;

    let fleet = fleet.lock();
    info!(
        "Stopped: vehicles = {}, orders = {}, locations = {}",
        fleet.vehicles().len(),
        fleet.orders().len(),
        fleet.locations().len()
    );

    Ok(())
}
