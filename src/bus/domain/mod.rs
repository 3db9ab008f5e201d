//! Domain types for the message bus.

mod message;

pub use message::BusMessage;
