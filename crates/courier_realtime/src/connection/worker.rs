use std::{collections::VecDeque, pin::Pin, sync::Arc, time::Duration};

use futures::{SinkExt, StreamExt, future::BoxFuture};
use parking_lot::Mutex;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{Instant, Interval, MissedTickBehavior, Sleep, interval_at, sleep},
};
use tracing::{debug, error, info, trace, warn};

use crate::{
    connection::connection_state::{
        ConnectionState, Effect, ReconnectPolicy, StateEvent, transition,
    },
    error::{ConnectionError, TransportError},
    handler_registry::HandlerRegistry,
    message::{Message, MessageType},
    transport::connector::{Connector, Link},
};

pub(crate) type ConnectReply = oneshot::Sender<Result<(), ConnectionError>>;

pub(crate) enum Command {
    Connect(ConnectReply),
    Disconnect(oneshot::Sender<()>),
    Send(Message),
}

/// Out-of-band events published by the connection worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionNotice {
    StateChanged(ConnectionState),
    TransportError(String),
    ReconnectsExhausted { attempts: u32 },
    /// A message was queued after reconnecting gave up. It is only sent if
    /// `connect` is called again.
    SendWhileFailed { kind: MessageType },
}

pub(crate) struct Worker {
    connector: Box<dyn Connector>,
    policy: ReconnectPolicy,
    heartbeat_interval: Duration,
    state: ConnectionState,
    state_sender: watch::Sender<ConnectionState>,
    notices: broadcast::Sender<ConnectionNotice>,
    handlers: Arc<Mutex<HandlerRegistry>>,
    commands: mpsc::UnboundedReceiver<Command>,
    queue: VecDeque<Message>,
    link: Option<Link>,
    pending_connect: Option<BoxFuture<'static, Result<Link, TransportError>>>,
    heartbeat: Option<Interval>,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
    /// Reply of the connect command being processed.
    incoming: Option<ConnectReply>,
    /// Reply of the user attempt in flight.
    waiter: Option<ConnectReply>,
    last_error: Option<TransportError>,
}

pub(crate) struct WorkerChannels {
    pub state_sender: watch::Sender<ConnectionState>,
    pub notices: broadcast::Sender<ConnectionNotice>,
    pub handlers: Arc<Mutex<HandlerRegistry>>,
    pub commands: mpsc::UnboundedReceiver<Command>,
}

impl Worker {
    pub(crate) fn new(
        connector: Box<dyn Connector>,
        policy: ReconnectPolicy,
        heartbeat_interval: Duration,
        channels: WorkerChannels,
    ) -> Self {
        Self {
            connector,
            policy,
            heartbeat_interval,
            state: ConnectionState::Disconnected,
            state_sender: channels.state_sender,
            notices: channels.notices,
            handlers: channels.handlers,
            commands: channels.commands,
            queue: VecDeque::new(),
            link: None,
            pending_connect: None,
            heartbeat: None,
            reconnect_timer: None,
            incoming: None,
            waiter: None,
            last_error: None,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                result = wait_connect(&mut self.pending_connect) => {
                    self.pending_connect = None;
                    self.handle_connect_result(result).await;
                }
                frame = next_frame(&mut self.link) => self.handle_frame(frame).await,
                _ = next_heartbeat(&mut self.heartbeat) => {
                    self.process(StateEvent::HeartbeatDue).await;
                }
                _ = reconnect_due(&mut self.reconnect_timer) => {
                    self.reconnect_timer = None;
                    self.process(StateEvent::ReconnectDue).await;
                }
            }
        }

        debug!("Connection manager dropped, shutting down worker");
        self.process(StateEvent::DisconnectRequested).await;
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(reply) => {
                self.incoming = Some(reply);
                self.process(StateEvent::ConnectRequested).await;
                // Answered by one of the connect effects.
                self.incoming = None;
            }
            Command::Disconnect(reply) => {
                info!("Disconnecting");
                self.process(StateEvent::DisconnectRequested).await;
                let _ = reply.send(());
            }
            Command::Send(message) => {
                if self.state.is_connected() {
                    if let Some(event) = self.transmit_or_queue(message).await {
                        self.process(event).await;
                    }
                } else {
                    let kind = message.kind();
                    if self.state == ConnectionState::Failed {
                        warn!(
                            %kind,
                            "Reconnect attempts exhausted, message queued until the next connect"
                        );
                        self.notify(ConnectionNotice::SendWhileFailed { kind });
                    } else {
                        debug!(%kind, state = %self.state, "Not connected, message queued");
                    }
                    self.queue.push_back(message);
                }
            }
        }
    }

    async fn handle_connect_result(&mut self, result: Result<Link, TransportError>) {
        match result {
            Ok(link) => {
                self.link = Some(link);
                self.process(StateEvent::ConnectSucceeded).await;
            }
            Err(error) => {
                warn!(%error, state = %self.state, "Connection attempt failed");
                self.notify(ConnectionNotice::TransportError(error.to_string()));
                self.last_error = Some(error);
                self.process(StateEvent::ConnectFailed).await;
                self.last_error = None;
            }
        }
    }

    async fn handle_frame(&mut self, frame: Option<Result<String, TransportError>>) {
        match frame {
            Some(Ok(frame)) => self.dispatch(&frame),
            Some(Err(error)) => {
                warn!(%error, "Transport error");
                self.notify(ConnectionNotice::TransportError(error.to_string()));
                self.process(StateEvent::TransportClosed).await;
            }
            None => {
                info!("Connection closed by peer");
                self.process(StateEvent::TransportClosed).await;
            }
        }
    }

    fn dispatch(&self, frame: &str) {
        let message = match Message::from_json(frame) {
            Ok(message) => message,
            Err(error) => {
                warn!(%error, "Dropping malformed frame");
                return;
            }
        };

        let handlers = self.handlers.lock().handlers_for(message.kind());
        if handlers.is_empty() {
            trace!(kind = %message.kind(), "No handler registered");
            return;
        }

        for handler in handlers {
            handler(message.payload());
        }
    }

    /// Runs `event` and every follow-up event produced while applying effects.
    async fn process(&mut self, event: StateEvent) {
        let mut events = VecDeque::from([event]);

        while let Some(event) = events.pop_front() {
            let (next, effects) = transition(self.state, event, &self.policy);

            if next != self.state {
                debug!(from = %self.state, to = %next, ?event, "Connection state changed");
                if next.is_connected() {
                    info!("Connection established");
                }
                self.state = next;
                self.state_sender.send_replace(next);
                self.notify(ConnectionNotice::StateChanged(next));
            }

            for effect in effects {
                if let Some(follow_up) = self.apply(effect).await {
                    events.push_back(follow_up);
                }
            }
        }
    }

    async fn apply(&mut self, effect: Effect) -> Option<StateEvent> {
        match effect {
            Effect::OpenTransport => {
                if let Some(reply) = self.incoming.take() {
                    self.waiter = Some(reply);
                }
                self.pending_connect = Some(self.connector.connect());
            }
            Effect::AbortConnect => {
                self.pending_connect = None;
                if let Some(waiter) = self.waiter.take() {
                    let _ = waiter.send(Err(ConnectionError::Cancelled));
                }
            }
            Effect::CloseTransport => {
                if let Some(mut link) = self.link.take() {
                    let _ = link.sink.close().await;
                }
            }
            Effect::StartHeartbeat => {
                let mut heartbeat = interval_at(
                    Instant::now() + self.heartbeat_interval,
                    self.heartbeat_interval,
                );
                heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.heartbeat = Some(heartbeat);
            }
            Effect::StopHeartbeat => self.heartbeat = None,
            Effect::SendHeartbeat => {
                if self.transmit(Message::heartbeat()).await.is_err() {
                    return Some(StateEvent::TransportClosed);
                }
            }
            Effect::FlushQueue => return self.flush_queue().await,
            Effect::ScheduleReconnect(delay) => {
                let retries = match self.state {
                    ConnectionState::Reconnecting { retries } => retries,
                    _ => 0,
                };
                warn!(
                    attempt = retries + 1,
                    max_attempts = self.policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Connection lost, scheduling reconnect"
                );
                self.reconnect_timer = Some(Box::pin(sleep(delay)));
            }
            Effect::CancelReconnect => self.reconnect_timer = None,
            Effect::ResolveConnect => {
                for reply in [self.waiter.take(), self.incoming.take()].into_iter().flatten() {
                    let _ = reply.send(Ok(()));
                }
            }
            Effect::RejectConnect => {
                if let Some(reply) = self.incoming.take() {
                    let _ = reply.send(Err(ConnectionError::AlreadyConnecting));
                }
            }
            Effect::ReportConnectFailure => {
                let error = self.last_error.take().unwrap_or(TransportError::Closed);
                if let Some(waiter) = self.waiter.take() {
                    let _ = waiter.send(Err(ConnectionError::Transport(error)));
                }
            }
            Effect::ReportExhausted => {
                error!(
                    attempts = self.policy.max_attempts,
                    "Reconnect attempts exhausted, giving up"
                );
                self.notify(ConnectionNotice::ReconnectsExhausted {
                    attempts: self.policy.max_attempts,
                });
            }
        }

        None
    }

    async fn transmit(&mut self, message: Message) -> Result<(), TransportError> {
        let Some(link) = self.link.as_mut() else {
            return Err(TransportError::Closed);
        };

        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(error) => {
                // Not a transport failure, the message is lost but the link is fine.
                warn!(%error, kind = %message.kind(), "Unable to serialize message");
                return Ok(());
            }
        };

        link.sink.send(frame).await
    }

    async fn transmit_or_queue(&mut self, message: Message) -> Option<StateEvent> {
        let retry = message.clone();
        match self.transmit(message).await {
            Ok(()) => None,
            Err(error) => {
                warn!(%error, "Send failed, message queued");
                self.queue.push_back(retry);
                Some(StateEvent::TransportClosed)
            }
        }
    }

    async fn flush_queue(&mut self) -> Option<StateEvent> {
        if !self.queue.is_empty() {
            debug!(count = self.queue.len(), "Flushing queued messages");
        }

        while let Some(message) = self.queue.pop_front() {
            let retry = message.clone();
            if let Err(error) = self.transmit(message).await {
                warn!(%error, "Flush interrupted, remaining messages stay queued");
                self.queue.push_front(retry);
                return Some(StateEvent::TransportClosed);
            }
        }

        None
    }

    fn notify(&self, notice: ConnectionNotice) {
        // No subscriber is not an error.
        let _ = self.notices.send(notice);
    }
}

async fn wait_connect(
    pending: &mut Option<BoxFuture<'static, Result<Link, TransportError>>>,
) -> Result<Link, TransportError> {
    match pending {
        Some(connect) => connect.await,
        None => std::future::pending().await,
    }
}

async fn next_frame(link: &mut Option<Link>) -> Option<Result<String, TransportError>> {
    match link {
        Some(link) => link.stream.next().await,
        None => std::future::pending().await,
    }
}

async fn next_heartbeat(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(heartbeat) => {
            heartbeat.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn reconnect_due(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => std::future::pending().await,
    }
}
