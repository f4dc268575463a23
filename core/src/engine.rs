use crate::analytics::Analytics;
use crate::network::Connection;
use crate::port::{Port, PortId, SendError};
use crate::trace::{DropReason, TraceEvent, TraceRecord};
use crate::traits::{Component, NodeId, TickOutcome};
use crate::{secs, SimTime, TICK_PERIOD_US};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("node {0} is already registered")]
    DuplicateNode(NodeId),
    #[error("{port} of node {node} is already owned by node {owner}")]
    DuplicatePort {
        port: PortId,
        node: NodeId,
        owner: NodeId,
    },
    #[error("{0} does not belong to any registered component")]
    UnknownPort(PortId),
    #[error("{port} is already plugged into connection `{connection}`")]
    AlreadyConnected { port: PortId, connection: String },
    #[error("connection `{0}` cannot link {1} to itself")]
    SelfConnection(String, PortId),
}

/// A scheduled tick. Ordered by time, then by scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Event {
    pub time: SimTime,
    pub seq: u64,
    pub node_id: NodeId,
}

pub type TraceObserver = Box<dyn FnMut(&TraceRecord)>;

/// Serial engine: one tick at a time, in virtual-time order.
pub struct Simulation {
    pub time: SimTime,
    pub tick_period: SimTime,
    pub components: HashMap<NodeId, Box<dyn Component>>,
    pub events: BinaryHeap<Reverse<Event>>,
    pub connections: Vec<Connection>,
    pub trace: Vec<TraceRecord>,
    pub analytics: Analytics,
    port_owner: HashMap<PortId, NodeId>,
    port_link: HashMap<PortId, usize>,
    /// Earliest live tick per node; heap entries that disagree are stale.
    pending: HashMap<NodeId, SimTime>,
    terminated: HashSet<NodeId>,
    next_seq: u64,
    observer: Option<TraceObserver>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            time: 0,
            tick_period: TICK_PERIOD_US,
            components: HashMap::new(),
            events: BinaryHeap::new(),
            connections: Vec::new(),
            trace: Vec::new(),
            analytics: Analytics::new(),
            port_owner: HashMap::new(),
            port_link: HashMap::new(),
            pending: HashMap::new(),
            terminated: HashSet::new(),
            next_seq: 0,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: impl FnMut(&TraceRecord) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn add_component(
        &mut self,
        id: NodeId,
        component: Box<dyn Component>,
    ) -> Result<(), SimError> {
        if self.components.contains_key(&id) {
            return Err(SimError::DuplicateNode(id));
        }
        let ports: Vec<PortId> = component.ports().iter().map(|p| p.id()).collect();
        for port in &ports {
            if let Some(&owner) = self.port_owner.get(port) {
                return Err(SimError::DuplicatePort {
                    port: *port,
                    node: id,
                    owner,
                });
            }
        }
        for port in ports {
            self.port_owner.insert(port, id);
        }
        self.components.insert(id, component);
        Ok(())
    }

    pub fn connect(&mut self, name: &str, a: PortId, b: PortId) -> Result<(), SimError> {
        if a == b {
            return Err(SimError::SelfConnection(name.to_string(), a));
        }
        for port in [a, b] {
            if !self.port_owner.contains_key(&port) {
                return Err(SimError::UnknownPort(port));
            }
            if let Some(&idx) = self.port_link.get(&port) {
                return Err(SimError::AlreadyConnected {
                    port,
                    connection: self.connections[idx].name.clone(),
                });
            }
        }
        let idx = self.connections.len();
        self.connections.push(Connection::new(name, a, b));
        self.port_link.insert(a, idx);
        self.port_link.insert(b, idx);
        Ok(())
    }

    pub fn component(&self, id: NodeId) -> Option<&dyn Component> {
        self.components.get(&id).map(|c| &**c)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        let owner = self.port_owner.get(&id)?;
        self.components.get(owner)?.port(id)
    }

    fn port_mut(&mut self, id: PortId) -> Option<&mut Port> {
        let owner = self.port_owner.get(&id)?;
        self.components.get_mut(owner)?.port_mut(id)
    }

    pub fn is_terminated(&self, id: NodeId) -> bool {
        self.terminated.contains(&id)
    }

    pub fn pending_tick(&self, id: NodeId) -> Option<SimTime> {
        self.pending.get(&id).copied()
    }

    /// First tick boundary strictly after `now`; `None` past the end of
    /// representable time.
    pub fn next_tick(&self, now: SimTime) -> Option<SimTime> {
        (now / self.tick_period + 1).checked_mul(self.tick_period)
    }

    fn tick_at_or_after(&self, t: SimTime) -> Option<SimTime> {
        t.div_ceil(self.tick_period).checked_mul(self.tick_period)
    }

    pub fn tick_now(&mut self, node: NodeId) {
        self.schedule_tick(self.time, node);
    }

    pub fn schedule_tick(&mut self, time: SimTime, node: NodeId) {
        if self.terminated.contains(&node) || !self.components.contains_key(&node) {
            return;
        }
        let time = time.max(self.time);
        if matches!(self.pending.get(&node), Some(&at) if at <= time) {
            return;
        }
        self.pending.insert(node, time);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Reverse(Event {
            time,
            seq,
            node_id: node,
        }));
    }

    fn wake(&mut self, node: NodeId) {
        if let Some(at) = self.next_tick(self.time) {
            self.schedule_tick(at, node);
        }
    }

    pub fn step(&mut self) -> bool {
        let Some(Reverse(event)) = self.events.pop() else {
            return false;
        };
        let node = event.node_id;
        if self.pending.get(&node) != Some(&event.time) {
            return true;
        }
        self.pending.remove(&node);
        self.time = event.time;

        let Some(comp) = self.components.get_mut(&node) else {
            return true;
        };
        let outcome = comp.tick(self.time);
        let records = comp.drain_trace();
        log::trace!("[{:.2}] {} -> {:?}", secs(self.time), comp.name(), outcome);

        match outcome {
            TickOutcome::Continue => self.wake(node),
            TickOutcome::Suspend { until: Some(until) } => {
                match (self.tick_at_or_after(until), self.next_tick(self.time)) {
                    (Some(at), Some(next)) => self.schedule_tick(at.max(next), node),
                    // Timer lies beyond representable time; wait for a wake instead.
                    _ => log::debug!("node {node}: timer at {until} never fires"),
                }
            }
            TickOutcome::Suspend { until: None } => {}
            TickOutcome::Terminate => {
                self.terminated.insert(node);
                log::info!("node {node} terminated at {:.2}", secs(self.time));
            }
        }

        self.publish(records);
        self.transfer();
        true
    }

    pub fn run(&mut self) {
        while self.step() {}
        log::info!("simulation drained at {:.2}", secs(self.time));
    }

    pub fn run_until(&mut self, end: SimTime) {
        while let Some(next) = self.events.peek().map(|Reverse(e)| e.time) {
            if next > end {
                break;
            }
            self.step();
        }
        self.time = self.time.max(end);
    }

    fn publish(&mut self, records: Vec<TraceRecord>) {
        for record in records {
            self.analytics.record(&record);
            if let Some(observer) = self.observer.as_mut() {
                observer(&record);
            }
            self.trace.push(record);
        }
    }

    /// Moves outgoing messages across connections until nothing moves.
    fn transfer(&mut self) {
        loop {
            let mut progressed = false;
            for idx in 0..self.connections.len() {
                for src in self.connections[idx].ends() {
                    while self.deliver_one(idx, src) {
                        progressed = true;
                    }
                }
            }
            if !progressed {
                break;
            }
        }
    }

    fn deliver_one(&mut self, conn: usize, src: PortId) -> bool {
        let Some(peer) = self.connections[conn].other_end(src) else {
            return false;
        };
        let (Some(&src_node), Some(&peer_node)) =
            (self.port_owner.get(&src), self.port_owner.get(&peer))
        else {
            return false;
        };
        let Some(dst) = self
            .port(src)
            .and_then(|p| p.peek_outgoing())
            .map(|m| m.meta.dst)
        else {
            return false;
        };
        if dst.is_some_and(|d| d != peer) {
            self.drop_misrouted(src_node, src);
            return true;
        }
        if !self.port(peer).is_some_and(|p| !p.is_full()) {
            return false;
        }

        let Some((mut msg, was_full)) = self.port_mut(src).and_then(|p| {
            let was_full = p.outgoing_full();
            p.take_outgoing().map(|m| (m, was_full))
        }) else {
            return false;
        };
        msg.meta.dst = Some(peer);

        let delivered = match self.port_mut(peer) {
            Some(receiver) => receiver.recv(msg),
            None => Err(SendError {
                port: peer.to_string(),
                message: msg,
            }),
        };
        if let Err(err) = delivered {
            if let Some(sender) = self.port_mut(src) {
                sender.restore_outgoing(err.message);
            }
            return false;
        }

        self.wake(peer_node);
        if was_full {
            self.wake(src_node);
        }
        true
    }

    fn drop_misrouted(&mut self, node: NodeId, src: PortId) {
        let Some(comp) = self.components.get_mut(&node) else {
            return;
        };
        let name = comp.name().to_string();
        let Some(port) = comp.port_mut(src) else {
            return;
        };
        let was_full = port.outgoing_full();
        port.take_outgoing();
        let port_name = port.name().to_string();
        log::warn!("{name}: dropping message on {port_name} addressed outside its connection");
        let record = TraceRecord::new(
            self.time,
            &name,
            TraceEvent::Dropped {
                reason: DropReason::Misrouted { port: port_name },
            },
        );
        self.publish(vec![record]);
        if was_full {
            self.wake(node);
        }
    }
}
