//! Data models for certificates, field records and configuration.

pub mod certificate;
pub mod config;
pub mod energy;
pub mod record;
