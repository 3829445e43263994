pub mod audits;
pub mod config;
pub mod error;
pub mod parcels;
pub mod reference;
pub mod telemetry;
