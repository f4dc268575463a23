#![allow(dead_code)]

use rand::Rng;
use tickroute_core::scenario;
use tickroute_core::*;

pub struct TestHarness {
    pub sim: Simulation,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            sim: Simulation::new(),
        }
    }

    pub fn demo(config: DemoConfig) -> Self {
        config.validate().unwrap();
        Self {
            sim: scenario::build(&config).unwrap(),
        }
    }

    pub fn demo_with_rng<R: Rng + 'static>(config: DemoConfig, rng: R) -> Self {
        config.validate().unwrap();
        Self {
            sim: scenario::build_with_rng(&config, rng).unwrap(),
        }
    }

    pub fn demo_seeded(seed: u64, duration_secs: u64) -> Self {
        Self::demo(DemoConfig {
            duration_secs,
            seed: Some(seed),
            ..DemoConfig::default()
        })
    }

    pub fn run(&mut self) {
        self.sim.run();
    }

    pub fn run_for(&mut self, duration_secs: f64) {
        let end = self.sim.time + from_secs(duration_secs);
        self.sim.run_until(end);
    }

    pub fn records_of(&self, component: &str) -> Vec<&TraceRecord> {
        self.sim
            .trace
            .iter()
            .filter(|r| r.component == component)
            .collect()
    }

    pub fn consumed_times(&self, consumer: &str) -> Vec<SimTime> {
        self.records_of(consumer)
            .into_iter()
            .filter(|r| matches!(r.event, TraceEvent::Consumed { .. }))
            .map(|r| r.time)
            .collect()
    }

    pub fn consumed_contents(&self, consumer: &str) -> Vec<String> {
        self.records_of(consumer)
            .into_iter()
            .filter_map(|r| match &r.event {
                TraceEvent::Consumed { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn generated_for(&self, consumer: &str) -> Vec<SimTime> {
        self.sim
            .trace
            .iter()
            .filter(|r| {
                matches!(&r.event, TraceEvent::Generated { destination } if destination == consumer)
            })
            .map(|r| r.time)
            .collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.sim.trace.iter().map(|r| r.to_string()).collect()
    }
}

pub fn demo_msg(content: &str, destination: &str, remote: Option<PortId>) -> Message {
    Message::demo(content, destination, remote, 0)
}

pub fn content_of(msg: &Message) -> &str {
    msg.as_demo().map(|d| d.content.as_str()).unwrap_or("")
}
