//! Core of the intern desk: absence scheduling, hours ledgers, vacation
//! approvals, audit trail and trash retention over a single shared state
//! document.

pub mod calendar;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod workflows;
