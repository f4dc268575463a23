use crate::message::Body;
use crate::port::Port;
use crate::trace::{DropReason, TraceEvent, TraceRecord};
use crate::traits::{Component, TickOutcome};
use crate::SimTime;

/// Drains its input port no faster than once per `interval`.
pub struct Consumer {
    pub name: String,
    pub input: Port,
    pub interval: SimTime,
    /// `None` until the first drain, so the first arrival is always eligible.
    pub last_consumed: Option<SimTime>,
    pub consumed: u64,
    trace: Vec<TraceRecord>,
}

impl Consumer {
    pub fn new(name: &str, interval: SimTime) -> Self {
        Self::with_capacity(name, interval, 10)
    }

    pub fn with_capacity(name: &str, interval: SimTime, input_capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            input: Port::new(format!("{name}.In"), input_capacity),
            interval,
            last_consumed: None,
            consumed: 0,
            trace: Vec::new(),
        }
    }

    /// Earliest time the next drain is allowed.
    pub fn eligible_at(&self) -> SimTime {
        self.last_consumed
            .map_or(0, |last| last.saturating_add(self.interval))
    }

    fn record(&mut self, now: SimTime, event: TraceEvent) {
        log::debug!("{}", TraceRecord::new(now, &self.name, event.clone()));
        self.trace.push(TraceRecord::new(now, &self.name, event));
    }
}

impl Component for Consumer {
    fn tick(&mut self, now: SimTime) -> TickOutcome {
        if let Some(last) = self.last_consumed {
            if now.saturating_sub(last) < self.interval {
                let until = self.input.peek().map(|_| self.eligible_at());
                return TickOutcome::Suspend { until };
            }
        }

        let Some(msg) = self.input.retrieve(now) else {
            return TickOutcome::suspend();
        };

        match msg.body {
            Body::Demo(demo) => {
                self.last_consumed = Some(now);
                self.consumed += 1;
                self.record(
                    now,
                    TraceEvent::Consumed {
                        content: demo.content,
                        latency: now.saturating_sub(demo.generated_at),
                    },
                );
            }
            Body::Opaque(_) => {
                log::warn!("{}: dropping message of unrecognized type", self.name);
                self.record(
                    now,
                    TraceEvent::Dropped {
                        reason: DropReason::UnknownType,
                    },
                );
            }
        }
        TickOutcome::while_pending(!self.input.is_empty())
    }

    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &str {
        "Consumer"
    }
    fn ports(&self) -> Vec<&Port> {
        vec![&self.input]
    }
    fn ports_mut(&mut self) -> Vec<&mut Port> {
        vec![&mut self.input]
    }
    fn drain_trace(&mut self) -> Vec<TraceRecord> {
        std::mem::take(&mut self.trace)
    }
}
