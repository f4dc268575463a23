pub mod analytics;
pub mod components;
pub mod config;
pub mod engine;
pub mod message;
pub mod network;
pub mod port;
pub mod scenario;
pub mod trace;
pub mod traits;

pub use analytics::Analytics;
pub use components::consumer::Consumer;
pub use components::distributor::Distributor;
pub use components::producer::Producer;
pub use config::{ConfigError, DemoConfig};
pub use engine::{Event, SimError, Simulation};
pub use message::{Body, DemoMessage, Message, MessageId, MsgMeta};
pub use network::Connection;
pub use port::{Port, PortId, SendError};
pub use trace::{DropReason, TraceEvent, TraceRecord};
pub use traits::{Component, NodeId, TickOutcome};

/// Virtual time in microseconds.
pub type SimTime = u64;

pub const US_PER_SEC: u64 = 1_000_000;
/// Default tick period of every component (1 Hz).
pub const TICK_PERIOD_US: SimTime = US_PER_SEC;

pub fn secs(t: SimTime) -> f64 {
    t as f64 / US_PER_SEC as f64
}

/// Converts seconds to virtual time. Non-positive input maps to 0, any
/// positive input to at least 1 µs; values past `SimTime::MAX` saturate.
pub fn from_secs(s: f64) -> SimTime {
    if s.is_nan() || s <= 0.0 {
        return 0;
    }
    ((s * US_PER_SEC as f64).round() as SimTime).max(1)
}

/// Like [`from_secs`], but `None` when `s` is not a positive, finite
/// duration that fits in `SimTime`.
pub fn checked_from_secs(s: f64) -> Option<SimTime> {
    let us = s * US_PER_SEC as f64;
    (us.is_finite() && us > 0.0 && us < SimTime::MAX as f64).then(|| from_secs(s))
}
