use std::sync::Arc;

use fxhash::FxHashMap;

use crate::message::{MessageType, Payload};

pub type Handler = Arc<dyn Fn(&Payload) + Send + Sync>;

/// Token returned when registering a handler, used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: MessageType,
    id: u64,
}

impl Subscription {
    pub fn kind(&self) -> MessageType {
        self.kind
    }
}

/// Handlers per message type, kept in registration order.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: FxHashMap<MessageType, Vec<(u64, Handler)>>,
    next_id: u64,
}

impl HandlerRegistry {
    pub fn insert(&mut self, kind: MessageType, handler: Handler) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;

        self.handlers.entry(kind).or_default().push((id, handler));

        Subscription { kind, id }
    }

    pub fn remove(&mut self, subscription: &Subscription) -> bool {
        let Some(handlers) = self.handlers.get_mut(&subscription.kind) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.id);
        let removed = handlers.len() != before;

        if handlers.is_empty() {
            self.handlers.remove(&subscription.kind);
        }

        removed
    }

    /// Snapshot of the handlers for `kind`, so they can run without holding the registry.
    pub fn handlers_for(&self, kind: MessageType) -> Vec<Handler> {
        self.handlers
            .get(&kind)
            .map(|handlers| handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, kind: MessageType) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
