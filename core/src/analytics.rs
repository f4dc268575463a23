use crate::trace::{TraceEvent, TraceRecord};
use crate::{secs, SimTime};
use hdrhistogram::Histogram;
use std::collections::BTreeMap;
use std::fmt;

/// Running counters and end-to-end latency, fed from the trace.
pub struct Analytics {
    pub generated: u64,
    pub routed: u64,
    pub consumed: u64,
    pub dropped: u64,
    pub backpressure: u64,
    pub unresolved: u64,
    pub per_consumer: BTreeMap<String, u64>,
    latency: Option<Histogram<u64>>,
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}

/// 3 significant figures, auto-resizing.
fn new_latency_histogram() -> Option<Histogram<u64>> {
    match Histogram::new(3) {
        Ok(hist) => Some(hist),
        Err(err) => {
            log::error!("latency tracking disabled: {err}");
            None
        }
    }
}

impl Analytics {
    pub fn new() -> Self {
        Self {
            generated: 0,
            routed: 0,
            consumed: 0,
            dropped: 0,
            backpressure: 0,
            unresolved: 0,
            per_consumer: BTreeMap::new(),
            latency: new_latency_histogram(),
        }
    }

    pub fn record(&mut self, record: &TraceRecord) {
        match &record.event {
            TraceEvent::Generated { .. } => self.generated += 1,
            TraceEvent::UnresolvedDestination { .. } => self.unresolved += 1,
            TraceEvent::Backpressure { .. } => self.backpressure += 1,
            TraceEvent::Routed { .. } => self.routed += 1,
            TraceEvent::Dropped { .. } => self.dropped += 1,
            TraceEvent::Consumed { latency, .. } => {
                self.consumed += 1;
                *self
                    .per_consumer
                    .entry(record.component.clone())
                    .or_insert(0) += 1;
                if let Some(hist) = self.latency.as_mut() {
                    if let Err(err) = hist.record(*latency) {
                        log::warn!("latency sample {latency} not recorded: {err}");
                    }
                }
            }
        }
    }

    /// Generated but not yet consumed or dropped.
    pub fn in_flight(&self) -> u64 {
        self.generated
            .saturating_sub(self.consumed)
            .saturating_sub(self.dropped)
    }

    pub fn latency_percentile(&self, p: f64) -> Option<SimTime> {
        let hist = self.latency.as_ref()?;
        if hist.is_empty() {
            return None;
        }
        Some(hist.value_at_quantile(p / 100.0))
    }

    pub fn max_latency(&self) -> Option<SimTime> {
        self.latency
            .as_ref()
            .filter(|h| !h.is_empty())
            .map(|h| h.max())
    }
}

impl fmt::Display for Analytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Generated: {}  Routed: {}  Consumed: {}  Dropped: {}",
            self.generated, self.routed, self.consumed, self.dropped
        )?;
        if self.backpressure > 0 || self.unresolved > 0 {
            writeln!(
                f,
                "Backpressure stalls: {}  Unresolved destinations: {}",
                self.backpressure, self.unresolved
            )?;
        }
        for (name, count) in &self.per_consumer {
            writeln!(f, "  {name}: {count}")?;
        }
        match (self.latency_percentile(50.0), self.latency_percentile(99.0)) {
            (Some(p50), Some(p99)) => write!(
                f,
                "Latency p50: {:.2}s  p99: {:.2}s",
                secs(p50),
                secs(p99)
            ),
            _ => write!(f, "Latency: no messages consumed"),
        }
    }
}
