//! Broadcast channel implementations.

pub mod inmemory;
pub mod redis_broker;

pub use inmemory::InMemoryBroker;
pub use redis_broker::RedisBroker;
