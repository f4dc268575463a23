use crate::common::{content_of, demo_msg, TestHarness};
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tickroute_core::*;

fn one_hop(messages: &[&str], interval_secs: f64) -> (TestHarness, PortId) {
    let names = vec!["Consumer1".to_string()];
    let mut distributor = Distributor::new("Distributor", &names);
    let consumer = Consumer::new("Consumer1", from_secs(interval_secs));
    let remote = consumer.input.id();
    for content in messages {
        distributor
            .input
            .recv(demo_msg(content, "Consumer1", Some(remote)))
            .unwrap();
    }
    let out = distributor.output("Consumer1").unwrap().id();

    let mut h = TestHarness::new();
    h.sim.add_component(1, Box::new(distributor)).unwrap();
    h.sim.add_component(2, Box::new(consumer)).unwrap();
    h.sim.connect("DistributorToConsumer1", out, remote).unwrap();
    h.sim.tick_now(1);
    (h, remote)
}

#[test]
fn test_producer_terminates_after_stop_time_for_any_draw() {
    let stop = from_secs(4.0);
    for seed in 0..64 {
        let mut producer =
            Producer::with_rng("Producer", vec!["Consumer1".into()], stop, StdRng::seed_from_u64(seed));
        for now in [stop, stop + 1, from_secs(10.0)] {
            assert_eq!(producer.tick(now), TickOutcome::Terminate, "seed {seed} at {now}");
        }
        assert_eq!(producer.output.outgoing_len(), 0);
    }

    let mut eager = Producer::with_rng("Producer", vec!["Consumer1".into()], stop, StepRng::new(0, 0));
    assert_eq!(eager.tick(stop), TickOutcome::Terminate);
}

#[test]
fn test_forwarded_copy_preserves_content_and_remote_port() {
    let (mut h, remote) = one_hop(&["payload"], 1.0);

    // Distributor runs at 0; the consumer is only woken for 1s.
    h.sim.run_until(0);

    let delivered = h.sim.port(remote).unwrap().peek().unwrap();
    let demo = delivered.as_demo().unwrap();
    assert_eq!(demo.content, "payload");
    assert_eq!(demo.remote_port, Some(remote));
    assert_eq!(delivered.meta.dst, Some(remote));
    assert_eq!(delivered.meta.send_time, 0);
    assert_eq!(h.sim.pending_tick(2), Some(from_secs(1.0)));
}

#[test]
fn test_fifo_through_distributor_and_consumer() {
    let order = ["A", "B", "C", "D", "E"];
    let (mut h, _) = one_hop(&order, 1.0);

    h.run();

    assert_eq!(h.consumed_contents("Consumer1"), order);
    assert_eq!(h.sim.analytics.routed, 5);
    assert_eq!(h.sim.analytics.consumed, 5);
}

#[test]
fn test_drop_removes_exactly_one_and_keeps_order() {
    let names = vec!["Consumer1".to_string()];
    let mut distributor = Distributor::with_capacity("Distributor", &names, 10, 10);
    let remote = PortId::next();
    distributor.input.recv(demo_msg("good1", "Consumer1", Some(remote))).unwrap();
    distributor.input.recv(Message::opaque(serde_json::json!({ "kind": "noise" }))).unwrap();
    distributor.input.recv(demo_msg("good2", "Consumer1", Some(remote))).unwrap();
    distributor.input.recv(demo_msg("stray", "Nobody", Some(remote))).unwrap();
    distributor.input.recv(demo_msg("good3", "Consumer1", Some(remote))).unwrap();

    let mut heads = Vec::new();
    loop {
        let before = distributor.input.len();
        let outcome = distributor.tick(0);
        assert_eq!(distributor.input.len(), before - 1);
        match distributor.input.peek() {
            Some(head) => {
                assert!(outcome.keeps_ticking());
                heads.push(content_of(head).to_string());
            }
            None => {
                assert!(!outcome.keeps_ticking());
                break;
            }
        }
    }

    assert_eq!(heads, ["", "good2", "stray", "good3"]);
    assert_eq!(distributor.output("Consumer1").unwrap().outgoing_len(), 3);
    let drops = distributor
        .drain_trace()
        .into_iter()
        .filter(|r| matches!(r.event, TraceEvent::Dropped { .. }))
        .count();
    assert_eq!(drops, 2);
}

#[test]
fn test_consumer_drains_respect_interval() {
    for interval in [1.0, 2.5] {
        let mut h = TestHarness::demo(DemoConfig {
            duration_secs: 60,
            consume_interval_secs: interval,
            seed: Some(7),
            ..DemoConfig::default()
        });
        h.run();

        for name in ["Consumer1", "Consumer2", "Consumer3"] {
            let times = h.consumed_times(name);
            for pair in times.windows(2) {
                assert!(
                    pair[1] - pair[0] >= from_secs(interval),
                    "{name} drained at {} and {} with interval {interval}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }
}

#[test]
fn test_rate_limited_consumer_is_rewoken_by_timer() {
    // Two messages queued, interval 3s: drains at 1s and 4s, no arrival in between.
    let (mut h, _) = one_hop(&["first", "second"], 3.0);
    h.run();
    assert_eq!(
        h.consumed_times("Consumer1"),
        vec![from_secs(1.0), from_secs(4.0)]
    );
}

#[test]
fn test_interval_beyond_time_range_still_drains_queue() {
    // Rejected by validation, but the engine must still terminate.
    let config = DemoConfig {
        duration_secs: 5,
        consume_interval_secs: 1e20,
        consumers: vec!["Consumer1".into()],
        generation_probability: 1.0,
        seed: Some(1),
        ..DemoConfig::default()
    };
    let mut h = TestHarness {
        sim: scenario::build(&config).unwrap(),
    };
    h.run();

    let stats = &h.sim.analytics;
    assert_eq!(stats.generated, 5);
    assert_eq!(stats.consumed, 1, "only the first arrival is ever eligible");
    assert_eq!(stats.in_flight(), 4);
    assert!(h.sim.events.is_empty());
    assert!(h.sim.time < from_secs(10.0));
}
