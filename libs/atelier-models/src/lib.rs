//! Wire models for the IRIS Atelier REST API

pub mod models;

pub use models::{DeletedDocument, DocumentBody, DocumentInfo, Envelope, StatusBlock};
