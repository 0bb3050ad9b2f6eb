//! Sparse live-cell storage over the full `i64 x i64` plane.
//!
//! Each coordinate is split into four 32-bit words
//! `(row_hi, row_lo, col_hi, col_lo)` and stored in four nested ordered
//! levels. A level is removed as soon as its last child goes away, so memory
//! tracks the number of live cells rather than the spread of the pattern.
//!
//! Traversal is lexicographic over the stored words. With
//! [`TraversalOrder::Packed`] the high words are the raw two's-complement
//! bits, so every negative row (or column) enumerates after all non-negative
//! ones. [`TraversalOrder::Numeric`] flips the sign bit of the high words
//! before storing them, which turns the same walk into plain numeric order.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use super::coord::Coord;

const SIGN_BIAS: u32 = 0x8000_0000;

type ColLow = BTreeSet<u32>;
type ColHigh = BTreeMap<u32, ColLow>;
type RowLow = BTreeMap<u32, ColHigh>;
type RowHigh = BTreeMap<u32, RowLow>;

/// Enumeration order of a [`SparseCellSet`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Unsigned word order: non-negative coordinates first, then negatives.
    #[default]
    Packed,
    /// True numeric `(row, col)` order.
    Numeric,
}

impl TraversalOrder {
    #[inline(always)]
    fn high_bias(self) -> u32 {
        match self {
            TraversalOrder::Packed => 0,
            TraversalOrder::Numeric => SIGN_BIAS,
        }
    }
}

/// The four stored words of one coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Key {
    row_hi: u32,
    row_lo: u32,
    col_hi: u32,
    col_lo: u32,
}

#[inline(always)]
fn split(v: i64, bias: u32) -> (u32, u32) {
    let bits = v as u64;
    (((bits >> 32) as u32) ^ bias, bits as u32)
}

#[inline(always)]
fn join(hi: u32, lo: u32, bias: u32) -> i64 {
    ((((hi ^ bias) as u64) << 32) | lo as u64) as i64
}

impl Key {
    #[inline]
    fn pack(c: Coord, order: TraversalOrder) -> Self {
        let bias = order.high_bias();
        let (row_hi, row_lo) = split(c.row, bias);
        let (col_hi, col_lo) = split(c.col, bias);
        Self {
            row_hi,
            row_lo,
            col_hi,
            col_lo,
        }
    }

    #[inline]
    fn unpack(self, order: TraversalOrder) -> Coord {
        let bias = order.high_bias();
        Coord::new(
            join(self.row_hi, self.row_lo, bias),
            join(self.col_hi, self.col_lo, bias),
        )
    }
}

/// Set of live coordinates.
#[derive(Clone, Debug, Default)]
pub struct SparseCellSet {
    rows: RowHigh,
    len: usize,
    order: TraversalOrder,
}

impl SparseCellSet {
    pub fn new() -> Self {
        Self::with_order(TraversalOrder::default())
    }

    pub fn with_order(order: TraversalOrder) -> Self {
        Self {
            rows: BTreeMap::new(),
            len: 0,
            order,
        }
    }

    #[inline]
    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.len = 0;
    }

    /// Mark `c` alive. Returns `true` if it was not already present.
    pub fn insert(&mut self, c: Coord) -> bool {
        let k = Key::pack(c, self.order);
        let inserted = self
            .rows
            .entry(k.row_hi)
            .or_default()
            .entry(k.row_lo)
            .or_default()
            .entry(k.col_hi)
            .or_default()
            .insert(k.col_lo);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Mark `c` dead. Returns `true` if it was present.
    ///
    /// Every level left empty by the removal is dropped.
    pub fn remove(&mut self, c: Coord) -> bool {
        let k = Key::pack(c, self.order);
        let Some(row_lo) = self.rows.get_mut(&k.row_hi) else {
            return false;
        };
        let Some(col_hi) = row_lo.get_mut(&k.row_lo) else {
            return false;
        };
        let Some(col_lo) = col_hi.get_mut(&k.col_hi) else {
            return false;
        };
        if !col_lo.remove(&k.col_lo) {
            return false;
        }
        self.len -= 1;

        if col_lo.is_empty() {
            col_hi.remove(&k.col_hi);
            if col_hi.is_empty() {
                row_lo.remove(&k.row_lo);
                if row_lo.is_empty() {
                    self.rows.remove(&k.row_hi);
                }
            }
        }
        true
    }

    /// Flip membership of `c`. Returns the new membership.
    #[inline]
    pub fn toggle(&mut self, c: Coord) -> bool {
        if self.remove(c) {
            false
        } else {
            self.insert(c)
        }
    }

    pub fn contains(&self, c: Coord) -> bool {
        let k = Key::pack(c, self.order);
        self.rows
            .get(&k.row_hi)
            .and_then(|row_lo| row_lo.get(&k.row_lo))
            .and_then(|col_hi| col_hi.get(&k.col_hi))
            .is_some_and(|col_lo| col_lo.contains(&k.col_lo))
    }

    /// All live coordinates in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        let order = self.order;
        self.rows.iter().flat_map(move |(&row_hi, row_lows)| {
            row_lows.iter().flat_map(move |(&row_lo, col_highs)| {
                col_highs.iter().flat_map(move |(&col_hi, col_lows)| {
                    col_lows.iter().map(move |&col_lo| {
                        Key {
                            row_hi,
                            row_lo,
                            col_hi,
                            col_lo,
                        }
                        .unpack(order)
                    })
                })
            })
        })
    }

    /// Visit every live coordinate in traversal order until `f` breaks.
    ///
    /// Returns `Break` iff the walk was cut short.
    #[inline]
    pub fn traverse<F>(&self, f: F) -> ControlFlow<()>
    where
        F: FnMut(Coord) -> ControlFlow<()>,
    {
        self.iter().try_for_each(f)
    }

    /// Number of nodes held across all four levels.
    #[cfg(test)]
    fn node_count(&self) -> usize {
        self.rows
            .values()
            .map(|row_lo| {
                1 + row_lo
                    .values()
                    .map(|col_hi| 1 + col_hi.values().map(|col_lo| 1 + col_lo.len()).sum::<usize>())
                    .sum::<usize>()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use super::{Coord, SparseCellSet, TraversalOrder};

    fn collect(set: &SparseCellSet) -> Vec<(i64, i64)> {
        set.iter().map(Into::into).collect()
    }

    #[test]
    fn insert_and_remove_track_count() {
        let mut set = SparseCellSet::new();
        assert!(set.insert(Coord::new(1, 2)));
        assert!(!set.insert(Coord::new(1, 2)));
        assert!(set.insert(Coord::new(-1, 2)));
        assert_eq!(set.len(), 2);

        assert!(set.remove(Coord::new(1, 2)));
        assert!(!set.remove(Coord::new(1, 2)));
        assert!(!set.remove(Coord::new(9, 9)));
        assert_eq!(set.len(), 1);
        assert!(set.contains(Coord::new(-1, 2)));
        assert!(!set.contains(Coord::new(1, 2)));
    }

    #[test]
    fn toggle_counts_both_directions() {
        let mut set = SparseCellSet::new();
        assert!(set.toggle(Coord::new(5, 5)));
        assert_eq!(set.len(), 1);
        assert!(!set.toggle(Coord::new(5, 5)));
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn empty_levels_are_pruned() {
        let mut set = SparseCellSet::new();
        let far = Coord::new(0x1_0000_0000, -0x7_0000_0001);
        set.insert(far);
        assert_eq!(set.node_count(), 4);
        set.insert(Coord::new(0, 0));
        assert_eq!(set.node_count(), 8);

        set.remove(far);
        assert_eq!(set.node_count(), 4);
        set.remove(Coord::new(0, 0));
        assert_eq!(set.node_count(), 0);
    }

    #[test]
    fn shared_prefixes_are_shared() {
        let mut set = SparseCellSet::new();
        set.insert(Coord::new(7, 1));
        set.insert(Coord::new(7, 2));
        assert_eq!(set.node_count(), 5);
        set.remove(Coord::new(7, 1));
        assert_eq!(set.node_count(), 4);
    }

    #[test]
    fn packed_order_puts_negatives_last() {
        let mut set = SparseCellSet::new();
        for c in [(-1, 0), (0, -1), (0, 0), (1, 0), (i64::MIN, 3), (i64::MAX, 3)] {
            set.insert(Coord::from(c));
        }
        assert_eq!(
            collect(&set),
            vec![(0, 0), (0, -1), (1, 0), (i64::MAX, 3), (i64::MIN, 3), (-1, 0)]
        );
    }

    #[test]
    fn numeric_order_is_plain_numeric() {
        let mut set = SparseCellSet::with_order(TraversalOrder::Numeric);
        let cells = [(-1, 0), (0, -1), (0, 0), (1, 0), (i64::MIN, 3), (i64::MAX, 3)];
        for c in cells {
            set.insert(Coord::from(c));
        }
        let mut expected = cells.to_vec();
        expected.sort();
        assert_eq!(collect(&set), expected);
        assert!(set.contains(Coord::new(i64::MIN, 3)));
    }

    #[test]
    fn extremes_round_trip_through_words() {
        let mut set = SparseCellSet::new();
        let corners = [
            (i64::MIN, i64::MIN),
            (i64::MIN, i64::MAX),
            (i64::MAX, i64::MIN),
            (i64::MAX, i64::MAX),
        ];
        for c in corners {
            set.insert(Coord::from(c));
        }
        let mut seen = collect(&set);
        seen.sort();
        let mut expected = corners.to_vec();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn traverse_stops_when_asked() {
        let mut set = SparseCellSet::new();
        for i in 0..10 {
            set.insert(Coord::new(i, i));
        }
        let mut visited = Vec::new();
        let flow = set.traverse(|c| {
            visited.push(c);
            if visited.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(visited, vec![Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 2)]);

        let mut count = 0;
        let flow = set.traverse(|_| {
            count += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(count, 10);
    }
}
