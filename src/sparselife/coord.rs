//! Plane coordinates and the clamped Moore neighborhood.
//!
//! The plane spans the full `i64` range on both axes. Neighborhoods are
//! clamped at `i64::MIN`/`i64::MAX` instead of wrapping, so a cell on the
//! edge of the plane simply has fewer neighbors.

use std::fmt;
use std::hash::{BuildHasher, Hasher};

/// A cell address on the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: i64,
    pub col: i64,
}

impl Coord {
    #[inline]
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// The Moore neighborhood of this cell in row-major order, excluding
    /// the cell itself.
    #[inline]
    pub fn neighborhood(self) -> impl Iterator<Item = Coord> {
        let top = self.row.saturating_sub(1);
        let bottom = self.row.saturating_add(1);
        let left = self.col.saturating_sub(1);
        let right = self.col.saturating_add(1);
        (top..=bottom)
            .flat_map(move |row| (left..=right).map(move |col| Coord::new(row, col)))
            .filter(move |&n| n != self)
    }
}

impl From<(i64, i64)> for Coord {
    #[inline]
    fn from((row, col): (i64, i64)) -> Self {
        Self::new(row, col)
    }
}

impl From<Coord> for (i64, i64) {
    #[inline]
    fn from(c: Coord) -> Self {
        (c.row, c.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.row, self.col)
    }
}

// Two distinct multipliers so row and column lanes don't collide on
// grid-aligned patterns.
const MX: u64 = 0x517c_c1b7_2722_0a95;
const MY: u64 = 0x6c62_272e_07bb_0142;

/// Lightweight hasher for `Coord` keys.
///
/// The derived `Hash` for `Coord` writes the row then the column, which land
/// in alternating lanes here. Anything else is folded through the same lanes
/// eight bytes at a time.
#[derive(Default)]
pub struct CoordHasher {
    hash: u64,
    lane: u32,
}

impl Hasher for CoordHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.write_u64(u64::from_le_bytes(word));
        }
    }

    #[inline(always)]
    fn write_u64(&mut self, v: u64) {
        let mixed = if self.lane & 1 == 0 {
            v.wrapping_mul(MX)
        } else {
            v.wrapping_mul(MY).rotate_right(31)
        };
        self.hash ^= mixed;
        self.lane = self.lane.wrapping_add(1);
    }

    #[inline(always)]
    fn write_i64(&mut self, v: i64) {
        self.write_u64(v as u64);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CoordBuildHasher;

impl BuildHasher for CoordBuildHasher {
    type Hasher = CoordHasher;

    #[inline]
    fn build_hasher(&self) -> CoordHasher {
        CoordHasher::default()
    }
}
