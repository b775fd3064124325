//! Live subscribers of one room and fan-out to them.
//!
//! Sends never block: each subscriber owns an unbounded channel drained by
//! its own writer task, so publishing under the room lock is cheap and keeps
//! every subscriber's stream in mutation order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use ulid::Ulid;

use super::protocol::{RoomEvent, ServerMessage};
use crate::util::id::new_connection_id;

#[derive(Debug, Clone)]
pub enum Push {
    Event(Arc<RoomEvent>),
    Ping,
}

impl Push {
    pub fn render(&self, recipient: &str) -> ServerMessage {
        match self {
            Push::Event(event) => event.render(recipient),
            Push::Ping => ServerMessage::Ping,
        }
    }
}

pub type PushSender = mpsc::UnboundedSender<Push>;
pub type PushReceiver = mpsc::UnboundedReceiver<Push>;

/// Returned from [`Hub::attach`]. `cancel` fires when a newer connection
/// takes over the name or the room is evicted.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub conn_id: Ulid,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct Subscriber {
    conn_id: Ulid,
    tx: PushSender,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub struct Hub {
    subscribers: Mutex<HashMap<String, Subscriber>>,
}

impl Hub {
    pub fn new() -> Self { Self::default() }

    /// Register `tx` as the one live subscriber for `name`, closing any
    /// previous one.
    pub fn attach(&self, name: &str, tx: PushSender) -> Subscription {
        let conn_id = new_connection_id();
        let cancel = CancellationToken::new();
        let previous = self.subscribers.lock().insert(
            name.to_string(),
            Subscriber { conn_id, tx, cancel: cancel.clone() },
        );
        if let Some(old) = previous {
            debug!(player = %name, old = %old.conn_id, new = %conn_id, "subscriber replaced");
            old.cancel.cancel();
        }
        Subscription { conn_id, cancel }
    }

    /// Remove `name` only while `conn_id` is still its registered connection.
    pub fn detach(&self, name: &str, conn_id: Ulid) -> bool {
        let mut subscribers = self.subscribers.lock();
        match subscribers.get(name) {
            Some(sub) if sub.conn_id == conn_id => {
                subscribers.remove(name);
                true
            }
            _ => false,
        }
    }

    /// Enqueue `event` for every subscriber. Returns how many accepted it.
    pub fn publish(&self, event: &Arc<RoomEvent>) -> usize {
        let subscribers = self.subscribers.lock();
        let mut delivered = 0;
        for (name, sub) in subscribers.iter() {
            if sub.tx.send(Push::Event(Arc::clone(event))).is_ok() {
                delivered += 1;
            } else {
                debug!(player = %name, conn_id = %sub.conn_id, "subscriber channel closed, push dropped");
            }
        }
        delivered
    }

    pub fn send_to(&self, name: &str, push: Push) -> bool {
        self.subscribers.lock().get(name).is_some_and(|sub| sub.tx.send(push).is_ok())
    }

    pub fn len(&self) -> usize { self.subscribers.lock().len() }

    pub fn is_empty(&self) -> bool { self.subscribers.lock().is_empty() }

    /// Drop and cancel every subscriber.
    pub fn close_all(&self) {
        for (_, sub) in self.subscribers.lock().drain() {
            sub.cancel.cancel();
        }
    }
}
