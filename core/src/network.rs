use serde::{Deserialize, Serialize};

use crate::PortId;

/// A zero-latency direct link between exactly two ports.
/// Ends are stored by canonical key (min_id, max_id).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Connection {
    pub name: String,
    ends: (PortId, PortId),
}

impl Connection {
    pub fn new(name: impl Into<String>, a: PortId, b: PortId) -> Self {
        Self {
            name: name.into(),
            ends: canonical_key(a, b),
        }
    }

    pub fn ends(&self) -> [PortId; 2] {
        [self.ends.0, self.ends.1]
    }

    pub fn other_end(&self, port: PortId) -> Option<PortId> {
        if port == self.ends.0 {
            Some(self.ends.1)
        } else if port == self.ends.1 {
            Some(self.ends.0)
        } else {
            None
        }
    }
}

pub fn canonical_key(a: PortId, b: PortId) -> (PortId, PortId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
