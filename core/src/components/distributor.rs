use crate::message::Message;
use crate::port::Port;
use crate::trace::{DropReason, TraceEvent, TraceRecord};
use crate::traits::{Component, TickOutcome};
use crate::SimTime;
use std::collections::BTreeMap;

/// Routes each inbound message to the output port named by its destination.
pub struct Distributor {
    pub name: String,
    pub input: Port,
    /// One single-slot output port per consumer name.
    pub outputs: BTreeMap<String, Port>,
    trace: Vec<TraceRecord>,
}

impl Distributor {
    pub fn new(name: &str, consumers: &[String]) -> Self {
        Self::with_capacity(name, consumers, 10, 1)
    }

    pub fn with_capacity(
        name: &str,
        consumers: &[String],
        input_capacity: usize,
        output_capacity: usize,
    ) -> Self {
        let outputs = consumers
            .iter()
            .map(|c| (c.clone(), Port::new(format!("{name}.Out.{c}"), output_capacity)))
            .collect();
        Self {
            name: name.to_string(),
            input: Port::new(format!("{name}.In"), input_capacity),
            outputs,
            trace: Vec::new(),
        }
    }

    pub fn output(&self, consumer: &str) -> Option<&Port> {
        self.outputs.get(consumer)
    }

    pub fn output_mut(&mut self, consumer: &str) -> Option<&mut Port> {
        self.outputs.get_mut(consumer)
    }

    fn record(&mut self, now: SimTime, event: TraceEvent) {
        log::debug!("{}", TraceRecord::new(now, &self.name, event.clone()));
        self.trace.push(TraceRecord::new(now, &self.name, event));
    }

    fn drop_head(&mut self, now: SimTime, reason: DropReason) -> TickOutcome {
        log::warn!("{}: dropping message: {reason}", self.name);
        self.input.retrieve(now);
        self.record(now, TraceEvent::Dropped { reason });
        TickOutcome::while_pending(!self.input.is_empty())
    }
}

/// Checks the head message, picks its output port and builds the forwarded copy.
fn plan<'a>(
    outputs: &'a mut BTreeMap<String, Port>,
    head: &Message,
    now: SimTime,
) -> Result<(String, &'a mut Port, Message), DropReason> {
    let demo = head.as_demo().ok_or(DropReason::UnknownType)?;
    let remote = demo.remote_port.ok_or_else(|| DropReason::MissingRemotePort {
        destination: demo.destination.clone(),
    })?;
    let output = outputs
        .get_mut(&demo.destination)
        .ok_or_else(|| DropReason::UnknownDestination {
            destination: demo.destination.clone(),
        })?;
    let forwarded = head.forward(output.id(), Some(remote), now);
    Ok((demo.destination.clone(), output, forwarded))
}

impl Component for Distributor {
    fn tick(&mut self, now: SimTime) -> TickOutcome {
        let Some(head) = self.input.peek() else {
            return TickOutcome::suspend();
        };

        let (destination, output, forwarded) = match plan(&mut self.outputs, head, now) {
            Ok(planned) => planned,
            Err(reason) => return self.drop_head(now, reason),
        };

        if output.send(forwarded).is_err() {
            // Head stays queued; the engine wakes us once the output drains.
            return TickOutcome::suspend();
        }

        self.input.retrieve(now);
        self.record(now, TraceEvent::Routed { destination });
        TickOutcome::while_pending(!self.input.is_empty())
    }

    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &str {
        "Distributor"
    }
    fn ports(&self) -> Vec<&Port> {
        std::iter::once(&self.input)
            .chain(self.outputs.values())
            .collect()
    }
    fn ports_mut(&mut self) -> Vec<&mut Port> {
        std::iter::once(&mut self.input)
            .chain(self.outputs.values_mut())
            .collect()
    }
    fn drain_trace(&mut self) -> Vec<TraceRecord> {
        std::mem::take(&mut self.trace)
    }
}
