//! Sparse Game of Life engine internals and public API.

mod board;
mod cell_cache;
mod cell_set;
mod coord;
mod engine;

pub use board::{Board, BoardScan, VisitCells, Visitor, visit_cells};
pub use cell_cache::{BoundedCellCache, CacheEntry, DEFAULT_CACHE_CAPACITY};
pub use cell_set::{SparseCellSet, TraversalOrder};
pub use coord::{Coord, CoordBuildHasher, CoordHasher};
pub use engine::{EngineConfig, GenerationRuleEngine, GenerationStats};
