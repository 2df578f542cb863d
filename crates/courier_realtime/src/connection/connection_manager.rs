use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::{
    config::ConnectionConfig,
    connection::{
        connection_state::ConnectionState,
        worker::{Command, ConnectionNotice, Worker, WorkerChannels},
    },
    error::{ConfigError, ConnectionError},
    handler_registry::{HandlerRegistry, Subscription},
    message::{Message, MessageType, Payload, PayloadData},
    transport::{connector::Connector, websocket::WebSocketConnector},
};

const NOTICE_CAPACITY: usize = 64;

/// Handle over the connection worker task.
///
/// Outbound messages are queued while disconnected and flushed in order once
/// a connection is established. Dropping the manager stops the worker and
/// closes the transport.
///
/// Must be created inside a tokio runtime.
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    notices: broadcast::Sender<ConnectionNotice>,
    handlers: Arc<Mutex<HandlerRegistry>>,
}

impl ConnectionManager {
    /// Spawns the worker. Fails when `config` does not pass
    /// [`ConnectionConfig::validate`].
    pub fn new<C: Connector>(connector: C, config: &ConnectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (commands, command_receiver) = mpsc::unbounded_channel();
        let (state_sender, state) = watch::channel(ConnectionState::Disconnected);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let handlers = Arc::new(Mutex::new(HandlerRegistry::default()));

        let worker = Worker::new(
            Box::new(connector),
            config.reconnect_policy(),
            config.heartbeat_interval,
            WorkerChannels {
                state_sender,
                notices: notices.clone(),
                handlers: Arc::clone(&handlers),
                commands: command_receiver,
            },
        );
        tokio::spawn(worker.run());

        Ok(Self {
            commands,
            state,
            notices,
            handlers,
        })
    }

    pub fn websocket(config: &ConnectionConfig) -> Result<Self, ConfigError> {
        Self::new(WebSocketConnector::new(config.url.clone()), config)
    }

    /// Resolves once connected. Fails with [`ConnectionError::AlreadyConnecting`]
    /// while another attempt is in flight, and with the transport error when
    /// the attempt fails. A failed user attempt is not retried.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        if self.state.borrow().is_connecting() {
            return Err(ConnectionError::AlreadyConnecting);
        }

        let (reply, response) = oneshot::channel();
        self.command(Command::Connect(reply))?;

        response.await.map_err(|_| ConnectionError::Shutdown)?
    }

    /// Cancels pending timers and any attempt in flight, then closes the
    /// transport. Queued messages are kept for the next connection.
    pub async fn disconnect(&self) -> Result<(), ConnectionError> {
        let (reply, response) = oneshot::channel();
        self.command(Command::Disconnect(reply))?;

        response.await.map_err(|_| ConnectionError::Shutdown)
    }

    pub fn send(&self, message: impl Into<Message>) -> Result<(), ConnectionError> {
        self.command(Command::Send(message.into()))
    }

    /// Handlers run on the worker task, in registration order. They must not
    /// panic: a panicking handler stops the worker and every later call fails
    /// with [`ConnectionError::Shutdown`].
    pub fn on<F>(&self, kind: MessageType, handler: F) -> Subscription
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.handlers.lock().insert(kind, Arc::new(handler))
    }

    /// Registers a handler receiving only the payload of type `T`.
    pub fn subscribe<T, F>(&self, handler: F) -> Subscription
    where
        T: PayloadData,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on(T::KIND, move |payload| {
            if let Some(data) = T::from_payload(payload) {
                handler(data);
            }
        })
    }

    pub fn off(&self, subscription: &Subscription) -> bool {
        self.handlers.lock().remove(subscription)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn notices(&self) -> broadcast::Receiver<ConnectionNotice> {
        self.notices.subscribe()
    }

    fn command(&self, command: Command) -> Result<(), ConnectionError> {
        self.commands
            .send(command)
            .map_err(|_| ConnectionError::Shutdown)
    }
}
