//! Bit-packed rolling lattice with half-buffer recycling.

use crate::error::LatticeError;

const WORD_BITS: usize = u64::BITS as usize;

/// One half of the physical row buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    /// Physical rows `[0, dH/2)`.
    Bottom,
    /// Physical rows `[dH/2, dH)`.
    Top,
}

/// A `L x dH` window onto a logically `L x H` deposit.
///
/// Each physical row is `ceil(L / 64)` words. Logical row `y` lives at
/// physical row `y mod dH`, so the window wraps as the surface grows.
/// [`recycle`](Self::recycle) zeroes the half the front is about to
/// re-enter; rows in a recycled half read as unoccupied until they are
/// occupied again.
///
/// The lattice also carries `height[L]`, the logical row of the topmost
/// deposit in each column. Heights are never bounded by `dH`.
///
/// # Examples
///
/// ```
/// use surfdep_lattice::RollingLattice;
///
/// let mut lattice = RollingLattice::new(8, 1 << 19, 64).unwrap();
/// lattice.occupy(3, 100_000).unwrap();
/// assert!(lattice.is_occupied(3, 100_000).unwrap());
/// // 100_000 and 100_064 share a physical row.
/// assert!(lattice.is_occupied(3, 100_064).unwrap());
/// assert!(!lattice.is_occupied(4, 100_000).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct RollingLattice {
    width: usize,
    max_height: i64,
    buffer_height: usize,
    words_per_row: usize,
    bits: Vec<u64>,
    heights: Vec<i64>,
    bottom_cleared: bool,
    top_cleared: bool,
}

impl RollingLattice {
    /// Create an empty lattice of width `width`, logical height
    /// `max_height` and physical buffer height `buffer_height`.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidDimensions`] unless `width > 0`,
    /// `2 <= buffer_height <= max_height` and `buffer_height` is even.
    pub fn new(width: usize, max_height: i64, buffer_height: usize) -> Result<Self, LatticeError> {
        if width == 0 {
            return Err(LatticeError::InvalidDimensions {
                reason: "width L must be positive".to_string(),
            });
        }
        if buffer_height < 2 || buffer_height % 2 != 0 {
            return Err(LatticeError::InvalidDimensions {
                reason: format!("buffer height dH must be even and >= 2, got {buffer_height}"),
            });
        }
        if i64::try_from(buffer_height).map_or(true, |dh| dh > max_height) {
            return Err(LatticeError::InvalidDimensions {
                reason: format!(
                    "buffer height dH ({buffer_height}) exceeds logical height H ({max_height})"
                ),
            });
        }
        let words_per_row = width.div_ceil(WORD_BITS);
        Ok(Self {
            width,
            max_height,
            buffer_height,
            words_per_row,
            bits: vec![0; words_per_row * buffer_height],
            heights: vec![0; width],
            bottom_cleared: false,
            top_cleared: false,
        })
    }

    /// Lattice width `L`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Logical maximum height `H`.
    pub fn max_height(&self) -> i64 {
        self.max_height
    }

    /// Physical buffer height `dH`.
    pub fn buffer_height(&self) -> usize {
        self.buffer_height
    }

    /// Whether `(x, y)` is occupied.
    ///
    /// # Errors
    ///
    /// [`LatticeError::OutOfRange`] if `x >= L` or `y < 0`.
    pub fn is_occupied(&self, x: usize, y: i64) -> Result<bool, LatticeError> {
        let (word, mask) = self.locate(x, y)?;
        Ok(self.bits[word] & mask != 0)
    }

    /// Mark `(x, y)` occupied.
    ///
    /// `y >= H` is accepted; exceeding the logical height is a run-level
    /// stop condition, not a lattice fault.
    ///
    /// # Errors
    ///
    /// [`LatticeError::OutOfRange`] if `x >= L` or `y < 0`.
    pub fn occupy(&mut self, x: usize, y: i64) -> Result<(), LatticeError> {
        let (word, mask) = self.locate(x, y)?;
        self.bits[word] |= mask;
        Ok(())
    }

    /// Recycle half of the buffer if the front at `new_max_y` has just
    /// crossed into it. Called once per step, after placement and before
    /// the new site is occupied.
    ///
    /// Entering physical row 0 clears the bottom half; entering physical
    /// row `dH/2` clears the top half. Each crossing clears at most once:
    /// a half is not cleared again until the other half has been.
    ///
    /// # Errors
    ///
    /// [`LatticeError::OutOfRange`] if `new_max_y < 0`.
    pub fn recycle(&mut self, new_max_y: i64) -> Result<Option<Half>, LatticeError> {
        if new_max_y < 0 {
            return Err(self.out_of_range(0, new_max_y));
        }
        let dh = self.buffer_height as i64;
        let half = dh / 2;
        if !self.bottom_cleared && new_max_y % dh == 0 {
            self.clear_half(Half::Bottom);
            self.bottom_cleared = true;
            self.top_cleared = false;
            Ok(Some(Half::Bottom))
        } else if !self.top_cleared && new_max_y % half == 0 && new_max_y % dh != 0 {
            self.clear_half(Half::Top);
            self.top_cleared = true;
            self.bottom_cleared = false;
            Ok(Some(Half::Top))
        } else {
            Ok(None)
        }
    }

    /// Maximum of `height[]` over columns `[max(0, lo), min(L-1, hi)]`.
    ///
    /// Saturates the range at the lattice edges instead of failing.
    /// Returns `-1` when the range is empty (`hi < lo`, or the clamped
    /// range lies entirely outside the lattice).
    pub fn local_max_height(&self, lo: i64, hi: i64) -> i64 {
        if hi < lo {
            return -1;
        }
        let last = self.width as i64 - 1;
        let lo = lo.max(0);
        let hi = hi.min(last);
        if hi < lo {
            return -1;
        }
        self.heights[lo as usize..=hi as usize]
            .iter()
            .copied()
            .max()
            .unwrap_or(-1)
    }

    /// Height of column `x`.
    ///
    /// # Errors
    ///
    /// [`LatticeError::OutOfRange`] if `x >= L`.
    pub fn height(&self, x: usize) -> Result<i64, LatticeError> {
        self.heights
            .get(x)
            .copied()
            .ok_or_else(|| self.out_of_range(x as i64, 0))
    }

    /// All column heights.
    pub fn heights(&self) -> &[i64] {
        &self.heights
    }

    /// Record `y` as the height of column `x`.
    ///
    /// # Errors
    ///
    /// [`LatticeError::OutOfRange`] if `x >= L` or `y < 0`.
    pub fn set_height(&mut self, x: usize, y: i64) -> Result<(), LatticeError> {
        if y < 0 || x >= self.width {
            return Err(self.out_of_range(x as i64, y));
        }
        self.heights[x] = y;
        Ok(())
    }

    /// Whether `(x, y)` lies within `[0, L) x [0, H)`.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && (x as u64) < self.width as u64 && y >= 0 && y < self.max_height
    }

    /// Whether any in-bounds cell of the 3x3 neighbourhood around
    /// `(x, y)`, the cell itself included, is occupied.
    pub fn has_neighbours(&self, x: i64, y: i64) -> bool {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if self.in_bounds(nx, ny) && self.is_occupied(nx as usize, ny).unwrap_or(false) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether the bottom half was the most recently recycled.
    pub fn is_bottom_cleared(&self) -> bool {
        self.bottom_cleared
    }

    /// Whether the top half was the most recently recycled.
    pub fn is_top_cleared(&self) -> bool {
        self.top_cleared
    }

    /// Physical row backing logical row `y`.
    pub fn physical_row(&self, y: i64) -> usize {
        y.rem_euclid(self.buffer_height as i64) as usize
    }

    /// Number of occupied cells in the physical buffer.
    pub fn occupied_cells(&self) -> u64 {
        self.bits.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Bytes held by the bit buffer and height array.
    pub fn memory_bytes(&self) -> usize {
        self.bits.len() * std::mem::size_of::<u64>() + self.heights.len() * std::mem::size_of::<i64>()
    }

    fn locate(&self, x: usize, y: i64) -> Result<(usize, u64), LatticeError> {
        if x >= self.width || y < 0 {
            return Err(self.out_of_range(x as i64, y));
        }
        let row = self.physical_row(y);
        let word = row * self.words_per_row + x / WORD_BITS;
        Ok((word, 1u64 << (x % WORD_BITS)))
    }

    fn clear_half(&mut self, half: Half) {
        let half_rows = self.buffer_height / 2;
        let start = match half {
            Half::Bottom => 0,
            Half::Top => half_rows,
        } * self.words_per_row;
        let end = start + half_rows * self.words_per_row;
        self.bits[start..end].fill(0);
    }

    fn out_of_range(&self, x: i64, y: i64) -> LatticeError {
        LatticeError::OutOfRange {
            x,
            y,
            width: self.width,
        }
    }
}
