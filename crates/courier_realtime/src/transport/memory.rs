use std::{sync::Arc, time::Duration};

use futures::{
    FutureExt,
    channel::mpsc::{UnboundedSender, unbounded},
    future::BoxFuture,
    sink,
};
use parking_lot::Mutex;

use crate::{
    error::TransportError,
    message::Message,
    transport::connector::{Connector, Link},
};

/// In-process transport. The handle is shared with the manager so a test can
/// drive the peer side: refuse attempts, push frames, drop the connection.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    shared: Arc<Mutex<Shared>>,
}

#[derive(Default)]
struct Shared {
    refuse: bool,
    connect_delay: Option<Duration>,
    attempts: u32,
    connection: u64,
    inbound: Option<UnboundedSender<Result<String, TransportError>>>,
    sent: Vec<String>,
}

impl Shared {
    fn is_current(&self, connection: u64) -> bool {
        self.connection == connection
            && self
                .inbound
                .as_ref()
                .is_some_and(|inbound| !inbound.is_closed())
    }
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.shared.lock().refuse = refuse;
    }

    pub fn set_connect_delay(&self, delay: Option<Duration>) {
        self.shared.lock().connect_delay = delay;
    }

    /// Number of connection attempts made so far, successful or not.
    pub fn attempts(&self) -> u32 {
        self.shared.lock().attempts
    }

    pub fn sent_frames(&self) -> Vec<String> {
        self.shared.lock().sent.clone()
    }

    /// Sent frames that parse as messages, in send order.
    pub fn sent_messages(&self) -> Vec<Message> {
        self.shared
            .lock()
            .sent
            .iter()
            .filter_map(|frame| Message::from_json(frame).ok())
            .collect()
    }

    /// Delivers a frame to the connected client. Returns false when no
    /// connection is open.
    pub fn push_frame(&self, frame: impl Into<String>) -> bool {
        let shared = self.shared.lock();
        match &shared.inbound {
            Some(inbound) => inbound.unbounded_send(Ok(frame.into())).is_ok(),
            None => false,
        }
    }

    pub fn push_message(&self, message: &Message) -> bool {
        match message.to_json() {
            Ok(frame) => self.push_frame(frame),
            Err(_) => false,
        }
    }

    /// Closes the current connection from the peer side.
    pub fn close_connection(&self) {
        self.shared.lock().inbound = None;
    }

    pub fn is_open(&self) -> bool {
        let shared = self.shared.lock();
        shared.is_current(shared.connection)
    }
}

impl Connector for MemoryConnector {
    fn connect(&self) -> BoxFuture<'static, Result<Link, TransportError>> {
        let shared = Arc::clone(&self.shared);
        let delay = {
            let mut guard = shared.lock();
            guard.attempts += 1;
            guard.connect_delay
        };

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let (sender, receiver) = unbounded();
            let connection = {
                let mut guard = shared.lock();
                if guard.refuse {
                    return Err(TransportError::Refused("connection refused by peer".to_owned()));
                }
                guard.connection += 1;
                guard.inbound = Some(sender);
                guard.connection
            };

            let sink = sink::unfold(shared, move |shared, frame: String| async move {
                {
                    let mut guard = shared.lock();
                    if !guard.is_current(connection) {
                        return Err(TransportError::Closed);
                    }
                    guard.sent.push(frame);
                }
                Ok(shared)
            });

            Ok(Link::new(sink, receiver))
        }
        .boxed()
    }
}
