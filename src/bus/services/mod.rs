//! Message bus service.

mod message_bus;

pub use message_bus::{
    BusError, BusLimits, BusResult, DEFAULT_DRAIN_BATCH, DEFAULT_QUEUE_CAPACITY, MessageBus,
};
