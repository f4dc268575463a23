pub mod consumer;
pub mod distributor;
pub mod producer;
