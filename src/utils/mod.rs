//! Shared helpers for payload normalization

pub mod case;
pub mod time;
