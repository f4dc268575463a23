use crate::common::TestHarness;
use rand::rngs::mock::StepRng;
use tickroute_core::scenario::{consumer_node, DISTRIBUTOR_NODE, PRODUCER_NODE};
use tickroute_core::*;

fn congested() -> TestHarness {
    // Every tick generates, every message goes to Consumer1.
    TestHarness::demo_with_rng(
        DemoConfig {
            duration_secs: 10,
            consume_interval_secs: 3.0,
            consumers: vec!["Consumer1".into()],
            input_capacity: 1,
            output_capacity: 1,
            ..DemoConfig::default()
        },
        StepRng::new(0, 0),
    )
}

#[test]
fn test_backpressure_stalls_producer_without_loss() {
    let mut h = congested();
    h.run();

    let stats = &h.sim.analytics;
    assert!(stats.backpressure > 0, "pipeline should saturate");
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.generated, stats.routed);
    assert_eq!(stats.generated, stats.consumed);
    assert_eq!(stats.in_flight(), 0);
}

#[test]
fn test_everything_drains_after_stop() {
    let mut h = congested();
    h.run();

    assert!(h.sim.is_terminated(PRODUCER_NODE));
    assert!(!h.sim.is_terminated(DISTRIBUTOR_NODE));
    assert!(h.sim.events.is_empty());
    let consumer_in = h
        .sim
        .component(consumer_node(0))
        .and_then(|c| c.ports().first().map(|p| p.id()))
        .unwrap();
    assert!(h.sim.port(consumer_in).unwrap().is_empty());
    // Draining continues well past the producer's stop time.
    assert!(h.sim.time > from_secs(10.0));
}

#[test]
fn test_generation_resumes_after_port_frees() {
    let mut h = congested();
    h.run();

    let generated = h.generated_for("Consumer1");
    let stalls: Vec<SimTime> = h
        .sim
        .trace
        .iter()
        .filter(|r| matches!(r.event, TraceEvent::Backpressure { .. }))
        .map(|r| r.time)
        .collect();
    let first_stall = stalls[0];
    assert!(
        generated.iter().any(|&t| t > first_stall),
        "producer never resumed after stalling at {first_stall}"
    );
    assert!(generated.iter().all(|&t| t < from_secs(10.0)));
}
