//! Core request-signing, transport, and polling machinery

pub mod client;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod errors;
pub mod jobs;
pub mod s3;
pub mod transport;
