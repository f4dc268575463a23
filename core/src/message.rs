use crate::port::PortId;
use crate::SimTime;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub type MessageId = u64;

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_message_id() -> MessageId {
    NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Per-hop envelope data. Rewritten on every hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgMeta {
    pub id: MessageId,
    pub src: Option<PortId>,
    pub dst: Option<PortId>,
    pub send_time: SimTime,
    pub recv_time: Option<SimTime>,
}

impl MsgMeta {
    fn fresh(src: Option<PortId>, dst: Option<PortId>, send_time: SimTime) -> Self {
        Self {
            id: next_message_id(),
            src,
            dst,
            send_time,
            recv_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoMessage {
    pub content: String,
    pub destination: String,
    /// Final-hop port, resolved by the producer.
    pub remote_port: Option<PortId>,
    pub generated_at: SimTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Demo(DemoMessage),
    /// Anything the demo components do not understand.
    Opaque(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub meta: MsgMeta,
    pub body: Body,
}

impl Message {
    pub fn new(body: Body) -> Self {
        Self {
            meta: MsgMeta::fresh(None, None, 0),
            body,
        }
    }

    pub fn demo(
        content: impl Into<String>,
        destination: impl Into<String>,
        remote_port: Option<PortId>,
        now: SimTime,
    ) -> Self {
        let mut msg = Self::new(Body::Demo(DemoMessage {
            content: content.into(),
            destination: destination.into(),
            remote_port,
            generated_at: now,
        }));
        msg.meta.send_time = now;
        msg
    }

    pub fn opaque(value: serde_json::Value) -> Self {
        Self::new(Body::Opaque(value))
    }

    pub fn with_route(mut self, src: Option<PortId>, dst: Option<PortId>) -> Self {
        self.meta.src = src;
        self.meta.dst = dst;
        self
    }

    pub fn as_demo(&self) -> Option<&DemoMessage> {
        match &self.body {
            Body::Demo(demo) => Some(demo),
            Body::Opaque(_) => None,
        }
    }

    /// A new envelope for the next hop carrying an identical payload.
    pub fn forward(&self, src: PortId, dst: Option<PortId>, now: SimTime) -> Self {
        Self {
            meta: MsgMeta::fresh(Some(src), dst, now),
            body: self.body.clone(),
        }
    }
}
