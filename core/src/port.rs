use crate::message::Message;
use crate::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

static NEXT_PORT_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub u32);

impl PortId {
    /// Allocates a process-wide unique id.
    pub fn next() -> Self {
        PortId(NEXT_PORT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port#{}", self.0)
    }
}

/// Returned when a buffer is at capacity. Hands the message back.
#[derive(Debug, Error)]
#[error("port `{port}` is at capacity")]
pub struct SendError {
    pub port: String,
    pub message: Message,
}

/// Bounded FIFO mailbox owned by one component.
///
/// `incoming` holds delivered messages waiting for the owner, `outgoing`
/// holds messages the owner sent that the engine has not yet moved across
/// the connection. Both are bounded by `capacity`.
#[derive(Debug, Clone)]
pub struct Port {
    id: PortId,
    name: String,
    capacity: usize,
    incoming: VecDeque<Message>,
    outgoing: VecDeque<Message>,
}

impl Port {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: PortId::next(),
            name: name.into(),
            capacity,
            incoming: VecDeque::with_capacity(capacity),
            outgoing: VecDeque::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn peek(&self) -> Option<&Message> {
        self.incoming.front()
    }

    pub fn retrieve(&mut self, now: SimTime) -> Option<Message> {
        let mut msg = self.incoming.pop_front()?;
        msg.meta.recv_time = Some(now);
        Some(msg)
    }

    pub fn len(&self) -> usize {
        self.incoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.incoming.len() >= self.capacity
    }

    /// Queues a message for the connection.
    pub fn send(&mut self, msg: Message) -> Result<(), SendError> {
        if self.outgoing.len() >= self.capacity {
            return Err(SendError {
                port: self.name.clone(),
                message: msg,
            });
        }
        self.outgoing.push_back(msg);
        Ok(())
    }

    /// Accepts a delivered message.
    pub fn recv(&mut self, msg: Message) -> Result<(), SendError> {
        if self.is_full() {
            return Err(SendError {
                port: self.name.clone(),
                message: msg,
            });
        }
        self.incoming.push_back(msg);
        Ok(())
    }

    pub fn outgoing_len(&self) -> usize {
        self.outgoing.len()
    }

    pub(crate) fn outgoing_full(&self) -> bool {
        self.outgoing.len() >= self.capacity
    }

    pub(crate) fn peek_outgoing(&self) -> Option<&Message> {
        self.outgoing.front()
    }

    pub(crate) fn take_outgoing(&mut self) -> Option<Message> {
        self.outgoing.pop_front()
    }

    pub(crate) fn restore_outgoing(&mut self, msg: Message) {
        self.outgoing.push_front(msg);
    }
}
