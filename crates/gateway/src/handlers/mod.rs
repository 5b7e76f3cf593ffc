//! API handlers module

pub mod admin;
pub mod health;
pub mod metrics;
pub mod search;
pub mod stats;
