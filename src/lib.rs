//! Conway's Game of Life (B3/S23) on the unbounded signed 64-bit plane.

pub mod life106;
pub mod sparselife;
pub use sparselife::{
    Board, Coord, EngineConfig, GenerationRuleEngine, GenerationStats, TraversalOrder, Visitor,
};
