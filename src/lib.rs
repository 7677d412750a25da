//! Goal Bingo - yearly goal cards laid out as bingo grids.
//!
//! Users fill an NxN card with goals, lock the layout by finalizing it, then
//! mark goals complete through the year and score bingo lines. A per-user
//! quota meters assisted goal generation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
