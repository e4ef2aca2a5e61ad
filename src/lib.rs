//! # Swiss Arbiter
//!
//! A Swiss-system chess tournament engine.
//!
//! ## Architecture
//!
//! - **models**: players, matches, rounds, and the tournament aggregate
//! - **pairing**: the greedy non-rematch pairing engine and its retry ladder
//! - **storage**: JSON persistence (tournament files, player registry)
//! - **config**: configuration loading and validation
//!
//! The engine is synchronous and performs no I/O of its own: persistence is
//! a discrete call made by the caller between steps.

pub mod config;
pub mod models;
pub mod pairing;
pub mod storage;

pub use models::*;
