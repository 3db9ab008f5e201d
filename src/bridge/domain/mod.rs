//! Bridge request and response types.

mod lists;
mod protocol;

pub use lists::split_comma_list;
pub use protocol::{BridgeRequest, BridgeResponse, CreateAgentParams};
