//! Core data models.

mod level;
mod match_record;
mod player;
mod stats;

pub use level::*;
pub use match_record::*;
pub use player::*;
pub use stats::*;
