//! The board: current live set, pending toggles, and visitor dispatch.
//!
//! A generation is two-phase. During [`Board::accept`] the visitor only sees
//! a [`BoardScan`], which can read the current state and queue toggles but
//! cannot touch the current set. Queued toggles are committed by
//! [`Board::apply_toggles`], which is reachable only from the
//! `on_started`/`on_ended` hooks (or outside a pass), so every cell in a
//! generation observes the same committed state.

use std::ops::ControlFlow;

use super::cell_set::{SparseCellSet, TraversalOrder};
use super::coord::Coord;

/// Visitor capability set driven by [`Board::accept`].
pub trait Visitor {
    /// Called once before the first visit.
    fn on_started(&mut self, _board: &mut Board) {}

    /// Called for each live cell in traversal order. Returning `Break` ends
    /// the traversal immediately.
    fn visit(&mut self, scan: &mut BoardScan<'_>, cell: Coord) -> ControlFlow<()>;

    /// Called once after the last visit, including after an early stop.
    fn on_ended(&mut self, _board: &mut Board) {}
}

/// Mid-traversal view of a [`Board`].
pub struct BoardScan<'a> {
    current: &'a SparseCellSet,
    pending: &'a mut SparseCellSet,
}

impl BoardScan<'_> {
    #[inline]
    pub fn is_alive(&self, c: Coord) -> bool {
        self.current.contains(c)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.current.len()
    }

    /// Queue `c` to flip at the next commit. Returns `false` if it was
    /// already queued.
    #[inline]
    pub fn queue_toggle(&mut self, c: Coord) -> bool {
        self.pending.insert(c)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Board {
    current: SparseCellSet,
    /// Cells whose state in `current` flips at the next commit.
    pending: SparseCellSet,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: TraversalOrder) -> Self {
        Self {
            current: SparseCellSet::with_order(order),
            pending: SparseCellSet::with_order(order),
        }
    }

    #[inline]
    pub fn order(&self) -> TraversalOrder {
        self.current.order()
    }

    /// Seed `c` as alive, bypassing the toggle queue.
    #[inline]
    pub fn initialize(&mut self, c: Coord) {
        self.current.insert(c);
    }

    #[inline]
    pub fn is_alive(&self, c: Coord) -> bool {
        self.current.contains(c)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.current.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.pending.clear();
    }

    /// Queue `c` to flip at the next commit. Returns `false` if it was
    /// already queued.
    #[inline]
    pub fn queue_toggle(&mut self, c: Coord) -> bool {
        self.pending.insert(c)
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flip every pending cell once and empty the queue. Returns the number
    /// of cells flipped.
    pub fn apply_toggles(&mut self) -> usize {
        let flipped = self.pending.len();
        for c in self.pending.iter() {
            self.current.toggle(c);
        }
        self.pending.clear();
        flipped
    }

    /// Run `visitor` over every live cell.
    ///
    /// Returns `true` if the traversal reached the end, `false` if the
    /// visitor stopped it.
    pub fn accept<V>(&mut self, visitor: &mut V) -> bool
    where
        V: Visitor + ?Sized,
    {
        visitor.on_started(self);
        let mut scan = BoardScan {
            current: &self.current,
            pending: &mut self.pending,
        };
        let flow = self
            .current
            .traverse(|cell| visitor.visit(&mut scan, cell));
        visitor.on_ended(self);
        flow.is_continue()
    }
}

/// Read-only visitor wrapping a closure.
pub struct VisitCells<F> {
    f: F,
}

/// Adapt `f` into a reporting [`Visitor`].
pub fn visit_cells<F>(f: F) -> VisitCells<F>
where
    F: FnMut(Coord) -> ControlFlow<()>,
{
    VisitCells { f }
}

impl<F> Visitor for VisitCells<F>
where
    F: FnMut(Coord) -> ControlFlow<()>,
{
    #[inline]
    fn visit(&mut self, _scan: &mut BoardScan<'_>, cell: Coord) -> ControlFlow<()> {
        (self.f)(cell)
    }
}
