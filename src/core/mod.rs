//! Core building blocks: run parameters and the per-reach correction
//! (profile extraction, bank4flood, assembly). Consumed by the high-level
//! `api` module.
pub mod correction;
pub mod params;
