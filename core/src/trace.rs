use crate::{secs, SimTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DropReason {
    UnknownType,
    MissingRemotePort { destination: String },
    UnknownDestination { destination: String },
    /// The engine found a message addressed to a port its connection does not reach.
    Misrouted { port: String },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::UnknownType => write!(f, "unrecognized message type"),
            DropReason::MissingRemotePort { destination } => {
                write!(f, "RemotePort not set for message to {destination}")
            }
            DropReason::UnknownDestination { destination } => {
                write!(f, "Unknown destination {destination}")
            }
            DropReason::Misrouted { port } => {
                write!(f, "message on {port} addressed outside its connection")
            }
        }
    }
}

/// Observable things that happen during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    Generated { destination: String },
    UnresolvedDestination { destination: String },
    Backpressure { port: String },
    Routed { destination: String },
    Consumed { content: String, latency: SimTime },
    Dropped { reason: DropReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub time: SimTime,
    pub component: String,
    pub event: TraceEvent,
}

impl TraceRecord {
    pub fn new(time: SimTime, component: &str, event: TraceEvent) -> Self {
        Self {
            time,
            component: component.to_string(),
            event,
        }
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}] ", secs(self.time))?;
        match &self.event {
            TraceEvent::Generated { destination } => {
                write!(f, "{}: Generated message for {destination}", self.component)
            }
            TraceEvent::UnresolvedDestination { destination } => {
                write!(f, "{}: Consumer port not found for {destination}", self.component)
            }
            TraceEvent::Backpressure { port } => {
                write!(f, "{}: Output port {port} is full", self.component)
            }
            TraceEvent::Routed { destination } => {
                write!(f, "{}: Routed message to {destination}", self.component)
            }
            TraceEvent::Consumed { content, .. } => {
                write!(f, "Consumer {}: Consumed message: {content}", self.component)
            }
            TraceEvent::Dropped { reason } => write!(f, "{}: {reason}", self.component),
        }
    }
}
