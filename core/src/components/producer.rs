use crate::message::Message;
use crate::port::{Port, PortId};
use crate::trace::{TraceEvent, TraceRecord};
use crate::traits::{Component, TickOutcome};
use crate::{secs, SimTime};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Chance of emitting a message on each tick.
    pub probability: f64,
    pub stop_time: SimTime,
    pub output_capacity: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            probability: 0.3,
            stop_time: 20 * crate::US_PER_SEC,
            output_capacity: 1,
        }
    }
}

/// Emits messages at random toward the distributor, addressed to a random consumer.
pub struct Producer<R = StdRng> {
    pub name: String,
    pub config: ProducerConfig,
    pub output: Port,
    /// Distributor input port, the immediate hop.
    pub dst_port: Option<PortId>,
    /// Consumer name to its input port, the final hop.
    pub consumer_ports: HashMap<String, PortId>,
    pub consumers: Vec<String>,
    pub rng: R,
    trace: Vec<TraceRecord>,
}

impl Producer<StdRng> {
    pub fn new(name: &str, consumers: Vec<String>, stop_time: SimTime) -> Self {
        Self::with_rng(name, consumers, stop_time, StdRng::from_entropy())
    }
}

impl<R: Rng> Producer<R> {
    pub fn with_rng(name: &str, consumers: Vec<String>, stop_time: SimTime, rng: R) -> Self {
        let config = ProducerConfig {
            stop_time,
            ..ProducerConfig::default()
        };
        Self::with_config(name, consumers, config, rng)
    }

    pub fn with_config(name: &str, consumers: Vec<String>, config: ProducerConfig, rng: R) -> Self {
        Self {
            name: name.to_string(),
            output: Port::new(format!("{name}.Out"), config.output_capacity),
            config,
            dst_port: None,
            consumer_ports: HashMap::new(),
            consumers,
            rng,
            trace: Vec::new(),
        }
    }

    pub fn register_consumer(&mut self, name: &str, port: PortId) {
        self.consumer_ports.insert(name.to_string(), port);
    }

    fn record(&mut self, now: SimTime, event: TraceEvent) {
        log::debug!("{}", TraceRecord::new(now, &self.name, event.clone()));
        self.trace.push(TraceRecord::new(now, &self.name, event));
    }
}

impl<R: Rng> Component for Producer<R> {
    fn tick(&mut self, now: SimTime) -> TickOutcome {
        if now >= self.config.stop_time {
            return TickOutcome::Terminate;
        }

        if self.rng.gen::<f64>() >= self.config.probability {
            return TickOutcome::Continue;
        }

        let Some(dest) = self.consumers.choose(&mut self.rng).cloned() else {
            return TickOutcome::Continue;
        };
        let Some(&remote_port) = self.consumer_ports.get(&dest) else {
            self.record(now, TraceEvent::UnresolvedDestination { destination: dest });
            return TickOutcome::Continue;
        };

        let msg = Message::demo(
            format!("Message at time {:.2}", secs(now)),
            dest.clone(),
            Some(remote_port),
            now,
        )
        .with_route(Some(self.output.id()), self.dst_port);

        if let Err(err) = self.output.send(msg) {
            log::warn!("{}: {err}, holding generation", self.name);
            self.record(now, TraceEvent::Backpressure { port: err.port });
            return TickOutcome::suspend();
        }
        self.record(now, TraceEvent::Generated { destination: dest });
        TickOutcome::Continue
    }

    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &str {
        "Producer"
    }
    fn ports(&self) -> Vec<&Port> {
        vec![&self.output]
    }
    fn ports_mut(&mut self) -> Vec<&mut Port> {
        vec![&mut self.output]
    }
    fn drain_trace(&mut self) -> Vec<TraceRecord> {
        std::mem::take(&mut self.trace)
    }
}
