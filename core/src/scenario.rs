//! Wiring of the demo topology:
//!
//! ```text
//! Producer.Out -> Distributor.In
//! Distributor.Out.<name> -> <name>.In   (one link per consumer)
//! ```
//!
//! Only the producer is kicked at time 0. The distributor and the consumers
//! run when messages reach them.

use crate::components::consumer::Consumer;
use crate::components::distributor::Distributor;
use crate::components::producer::{Producer, ProducerConfig};
use crate::config::DemoConfig;
use crate::engine::{SimError, Simulation};
use crate::traits::NodeId;
use crate::{from_secs, SimTime};
use rand::prelude::*;

pub const PRODUCER_NODE: NodeId = 1;
pub const DISTRIBUTOR_NODE: NodeId = 2;
/// Consumers take consecutive ids from here, in config order.
pub const FIRST_CONSUMER_NODE: NodeId = 3;

pub fn consumer_node(index: usize) -> NodeId {
    FIRST_CONSUMER_NODE + index as NodeId
}

pub fn build(config: &DemoConfig) -> Result<Simulation, SimError> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    build_with_rng(config, rng)
}

pub fn build_with_rng<R: Rng + 'static>(
    config: &DemoConfig,
    rng: R,
) -> Result<Simulation, SimError> {
    let names = config.consumers.clone();
    let mut sim = Simulation::new();

    let producer_cfg = ProducerConfig {
        probability: config.generation_probability,
        stop_time: config.stop_time().unwrap_or(SimTime::MAX),
        output_capacity: config.output_capacity,
    };
    let mut producer = Producer::with_config("Producer", names.clone(), producer_cfg, rng);
    let distributor = Distributor::with_capacity(
        "Distributor",
        &names,
        config.input_capacity,
        config.output_capacity,
    );
    let interval = from_secs(config.consume_interval_secs);
    let consumers: Vec<Consumer> = names
        .iter()
        .map(|name| Consumer::with_capacity(name, interval, config.input_capacity))
        .collect();

    for consumer in &consumers {
        producer.register_consumer(&consumer.name, consumer.input.id());
    }
    producer.dst_port = Some(distributor.input.id());

    let mut links = vec![(
        "ProducerToDistributor".to_string(),
        producer.output.id(),
        distributor.input.id(),
    )];
    for consumer in &consumers {
        if let Some(out) = distributor.output(&consumer.name) {
            links.push((
                format!("DistributorTo{}", consumer.name),
                out.id(),
                consumer.input.id(),
            ));
        }
    }

    sim.add_component(PRODUCER_NODE, Box::new(producer))?;
    sim.add_component(DISTRIBUTOR_NODE, Box::new(distributor))?;
    for (idx, consumer) in consumers.into_iter().enumerate() {
        sim.add_component(consumer_node(idx), Box::new(consumer))?;
    }
    for (name, a, b) in links {
        sim.connect(&name, a, b)?;
    }

    sim.tick_now(PRODUCER_NODE);
    log::info!(
        "demo topology ready: {} consumers, stop at {}s",
        names.len(),
        config.duration_secs
    );
    Ok(sim)
}
