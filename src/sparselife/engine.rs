//! B3/S23 generation pass as a board visitor.
//!
//! Each live cell is visited once. Its neighbors are resolved through a
//! small LRU memo, and every dead neighbor met along the way has its birth
//! rule evaluated on the spot, counting the triggering live cell as one
//! known neighbor. The memo's processed flag keeps a dead cell shared by
//! several live cells from being evaluated again in the same pass; if the
//! entry was already evicted the cell is simply re-evaluated, which is
//! harmless because queuing a toggle is idempotent.

use std::ops::ControlFlow;

use log::{debug, trace};

use super::board::{Board, BoardScan, Visitor};
use super::cell_cache::{BoundedCellCache, DEFAULT_CACHE_CAPACITY};
use super::coord::Coord;

/// Configuration for a [`GenerationRuleEngine`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Entries kept by the per-pass neighbor memo.
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Set the neighbor memo capacity (at least 1).
    pub fn cache_capacity(mut self, n: usize) -> Self {
        self.cache_capacity = n.max(1);
        self
    }
}

/// Counters for one completed generation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Generation number reached by this pass (1 for the first step).
    pub generation: u64,
    /// Live cells visited.
    pub scanned: usize,
    pub births: usize,
    pub deaths: usize,
    /// Dead cells whose birth rule was evaluated. Each dead neighbor counts
    /// once unless its processed entry was evicted mid-pass.
    pub dead_evaluated: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Live cells after the commit.
    pub population: usize,
}

pub struct GenerationRuleEngine {
    cache: BoundedCellCache,
    generation: u64,
    stats: GenerationStats,
}

impl Default for GenerationRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationRuleEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            cache: BoundedCellCache::with_capacity(config.cache_capacity),
            generation: 0,
            stats: GenerationStats::default(),
        }
    }

    /// Generations completed by this engine.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Counters of the most recent pass.
    #[inline]
    pub fn last_stats(&self) -> GenerationStats {
        self.stats
    }

    #[inline]
    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Advance `board` by one generation.
    pub fn step(&mut self, board: &mut Board) -> GenerationStats {
        board.accept(self);
        self.stats
    }

    pub fn step_n(&mut self, board: &mut Board, n: u64) {
        for _ in 0..n {
            self.step(board);
        }
    }

    #[inline]
    fn is_alive(&mut self, scan: &BoardScan<'_>, c: Coord) -> bool {
        if let Some(entry) = self.cache.lookup(c) {
            self.stats.cache_hits += 1;
            return entry.alive;
        }
        self.stats.cache_misses += 1;
        let alive = scan.is_alive(c);
        self.cache.insert(c, alive);
        alive
    }

    fn update_live_cell(&mut self, scan: &mut BoardScan<'_>, cell: Coord) {
        let mut live = 0u32;
        for n in cell.neighborhood() {
            if self.is_alive(scan, n) {
                live += 1;
            } else {
                self.update_dead_cell(scan, n, cell);
            }
        }
        if !(2..=3).contains(&live) && scan.queue_toggle(cell) {
            self.stats.deaths += 1;
            trace!("died: {cell} neighbors: {live}");
        }
    }

    /// Birth rule for dead `cell`, reached from its live neighbor `from`.
    fn update_dead_cell(&mut self, scan: &mut BoardScan<'_>, cell: Coord, from: Coord) {
        if self.cache.is_processed(cell) {
            return;
        }
        self.cache.mark_processed(cell, false);
        self.stats.dead_evaluated += 1;

        let mut live = 1u32;
        for n in cell.neighborhood() {
            if n != from && self.is_alive(scan, n) {
                live += 1;
            }
        }
        if live == 3 && scan.queue_toggle(cell) {
            self.stats.births += 1;
            trace!("born: {cell} neighbors: {live}");
        }
    }
}

impl Visitor for GenerationRuleEngine {
    fn on_started(&mut self, board: &mut Board) {
        debug_assert_eq!(board.pending_len(), 0);
        self.cache.clear();
        self.stats = GenerationStats {
            generation: self.generation + 1,
            ..GenerationStats::default()
        };
    }

    #[inline]
    fn visit(&mut self, scan: &mut BoardScan<'_>, cell: Coord) -> ControlFlow<()> {
        self.stats.scanned += 1;
        self.update_live_cell(scan, cell);
        ControlFlow::Continue(())
    }

    fn on_ended(&mut self, board: &mut Board) {
        board.apply_toggles();
        self.cache.clear();
        self.generation += 1;
        self.stats.population = board.size();
        let s = &self.stats;
        debug!(
            "generation {}: scanned {} born {} died {} population {} (cache {} hits / {} misses)",
            s.generation, s.scanned, s.births, s.deaths, s.population, s.cache_hits, s.cache_misses
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::ops::ControlFlow;

    use super::{EngineConfig, GenerationRuleEngine};
    use crate::sparselife::{Board, Coord, visit_cells};

    fn board_of(cells: &[(i64, i64)]) -> Board {
        let mut board = Board::new();
        for &c in cells {
            board.initialize(Coord::from(c));
        }
        board
    }

    fn live(board: &mut Board) -> BTreeSet<(i64, i64)> {
        let mut out = BTreeSet::new();
        board.accept(&mut visit_cells(|c| {
            out.insert(c.into());
            ControlFlow::Continue(())
        }));
        out
    }

    fn set_of(cells: &[(i64, i64)]) -> BTreeSet<(i64, i64)> {
        cells.iter().copied().collect()
    }

    #[test]
    fn isolated_cell_dies() {
        let mut board = board_of(&[(10, -10)]);
        let stats = GenerationRuleEngine::new().step(&mut board);
        assert_eq!(board.size(), 0);
        assert_eq!(stats.deaths, 1);
        assert_eq!(stats.births, 0);
        assert_eq!(board.pending_len(), 0);
    }

    #[test]
    fn blinker_flips_and_returns() {
        let vertical = [(0, 1), (1, 1), (2, 1)];
        let horizontal = [(1, 0), (1, 1), (1, 2)];
        let mut board = board_of(&vertical);
        let mut engine = GenerationRuleEngine::new();

        let stats = engine.step(&mut board);
        assert_eq!(live(&mut board), set_of(&horizontal));
        assert_eq!((stats.births, stats.deaths), (2, 2));

        engine.step(&mut board);
        assert_eq!(live(&mut board), set_of(&vertical));
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn block_is_still() {
        let block = [(0, 0), (0, 1), (1, 0), (1, 1)];
        let mut board = board_of(&block);
        let mut engine = GenerationRuleEngine::new();
        engine.step_n(&mut board, 6);
        assert_eq!(live(&mut board), set_of(&block));
        assert_eq!(engine.last_stats().births, 0);
        assert_eq!(engine.last_stats().deaths, 0);
    }

    #[test]
    fn glider_translates_diagonally() {
        let glider = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
        let mut board = board_of(&glider);
        GenerationRuleEngine::new().step_n(&mut board, 4);
        let shifted: Vec<(i64, i64)> = glider.iter().map(|&(r, c)| (r + 1, c + 1)).collect();
        assert_eq!(live(&mut board), set_of(&shifted));
    }

    #[test]
    fn tiny_cache_gives_same_result() {
        let seed = [(0, 0), (0, 1), (0, 2), (1, 0), (2, 1), (-1, 1), (3, 3), (3, 4)];
        let mut reference = board_of(&seed);
        let mut squeezed = board_of(&seed);
        let mut big = GenerationRuleEngine::with_config(EngineConfig::default().cache_capacity(4096));
        let mut small = GenerationRuleEngine::with_config(EngineConfig::default().cache_capacity(1));
        for _ in 0..12 {
            big.step(&mut reference);
            small.step(&mut squeezed);
            assert_eq!(live(&mut reference), live(&mut squeezed));
            assert_eq!(big.last_stats().births, small.last_stats().births);
        }
    }

    #[test]
    fn shared_dead_neighbors_are_evaluated_once() {
        let blinker = [(0, 1), (1, 1), (2, 1)];
        let bordering: BTreeSet<Coord> = blinker
            .iter()
            .flat_map(|&c| Coord::from(c).neighborhood())
            .filter(|n| !blinker.contains(&(n.row, n.col)))
            .collect();
        assert_eq!(bordering.len(), 12);

        let mut board = board_of(&blinker);
        let mut engine =
            GenerationRuleEngine::with_config(EngineConfig::default().cache_capacity(4096));
        let stats = engine.step(&mut board);
        assert_eq!(stats.dead_evaluated, bordering.len());

        let mut squeezed = board_of(&blinker);
        let mut small = GenerationRuleEngine::with_config(EngineConfig::default().cache_capacity(1));
        let stats = small.step(&mut squeezed);
        assert!(stats.dead_evaluated > bordering.len());
        assert_eq!(live(&mut squeezed), live(&mut board));
    }

    #[test]
    fn block_neighbors_are_evaluated_once_per_pass() {
        let mut board = board_of(&[(0, 0), (0, 1), (1, 0), (1, 1)]);
        let mut engine =
            GenerationRuleEngine::with_config(EngineConfig::default().cache_capacity(4096));
        for _ in 0..3 {
            assert_eq!(engine.step(&mut board).dead_evaluated, 12);
        }
    }

    #[test]
    fn stats_track_cache_traffic() {
        let mut board = board_of(&[(0, 0), (0, 1), (0, 2)]);
        let mut engine = GenerationRuleEngine::new();
        let stats = engine.step(&mut board);
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.scanned, 3);
        assert_eq!(stats.population, 3);
        assert!(stats.cache_hits > 0);
        assert!(stats.cache_misses > 0);
    }

    #[test]
    fn config_floor_is_one() {
        let engine = GenerationRuleEngine::with_config(EngineConfig::default().cache_capacity(0));
        assert_eq!(engine.cache_capacity(), 1);
    }
}
