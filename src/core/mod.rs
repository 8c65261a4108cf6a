//! Runtime components: the miner API client, metric rules, the startup
//! handshake, link state tracking and the poll loop.

pub mod api;
pub mod collectors;
pub mod executor;
pub mod handshake;
pub mod link;
