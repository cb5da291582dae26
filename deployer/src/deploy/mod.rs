//! Deployment module

pub mod doc_id;
pub mod fsm;
pub mod observer;
pub mod orchestrator;
pub mod outcome;
pub mod report;
