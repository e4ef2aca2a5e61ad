//! Core data models for the tournament engine.

mod ids;
mod pairing;
mod player;
mod round;
mod tournament;

pub use ids::*;
pub use pairing::*;
pub use player::*;
pub use round::*;
pub use tournament::*;
