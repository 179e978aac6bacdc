//! API handlers module

pub mod cartography;
pub mod health;
pub mod metrics;
pub mod works;
