//! Atelier REST API access

pub mod client;
pub mod documents;
pub mod transport;
