use crate::port::{Port, PortId};
use crate::trace::TraceRecord;
use crate::SimTime;

pub type NodeId = u32;

/// What a component asks of the engine after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick again at the next boundary.
    Continue,
    /// Sleep until a message arrives, an output port frees up, or `until` passes.
    Suspend { until: Option<SimTime> },
    /// Never tick again.
    Terminate,
}

impl TickOutcome {
    pub fn suspend() -> Self {
        TickOutcome::Suspend { until: None }
    }

    /// `Continue` while work is queued, plain `Suspend` otherwise.
    pub fn while_pending(pending: bool) -> Self {
        if pending {
            TickOutcome::Continue
        } else {
            TickOutcome::suspend()
        }
    }

    pub fn keeps_ticking(&self) -> bool {
        matches!(self, TickOutcome::Continue)
    }
}

pub trait Component {
    fn tick(&mut self, now: SimTime) -> TickOutcome;
    fn name(&self) -> &str;
    fn kind(&self) -> &str;

    fn ports(&self) -> Vec<&Port>;
    fn ports_mut(&mut self) -> Vec<&mut Port>;

    fn port(&self, id: PortId) -> Option<&Port> {
        self.ports().into_iter().find(|p| p.id() == id)
    }
    fn port_mut(&mut self, id: PortId) -> Option<&mut Port> {
        self.ports_mut().into_iter().find(|p| p.id() == id)
    }

    /// Hands over the trace records produced since the last call.
    fn drain_trace(&mut self) -> Vec<TraceRecord>;
}
