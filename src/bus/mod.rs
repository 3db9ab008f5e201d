//! Topic-addressed publish/subscribe bus between agents.
//!
//! Each topic owns one bounded queue and one subscriber list. Delivery is a
//! pull model: messages stay queued until a subscribed agent drains them.
//!
//! - Domain types in [`domain`]
//! - The bus itself in [`services`]

pub mod domain;
pub mod services;
