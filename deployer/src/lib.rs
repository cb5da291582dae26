//! IRIS Deployer Library
//!
//! Pushes changed source documents to an IRIS server, compiles them and
//! removes deleted ones, for use from CI pipelines.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod utils;
