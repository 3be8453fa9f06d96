//! Capability negotiation and caching.

mod cache;
mod endpoint;
mod negotiator;
mod types;

pub use cache::CapabilityCache;
pub use endpoint::{api_url, HostQuirk};
pub use negotiator::{detect_torznab, negotiate, parse_capabilities, NegotiationError};
pub use types::*;
