/// Hierarchical occupancy bitmask with Morton (Z-order) word layout
///
/// Every pixel of the virtual screen owns one bit in a *low* word (an 8×8
/// pixel bin). Low words are laid out so that the 64 low bins of a mid bin
/// are contiguous and Morton ordered, and the mid bins of a top bin are
/// again Morton ordered. Neighbouring tiles touched while scanning a small
/// box face therefore land in the same or adjacent cache lines.
///
/// Occupancy answers come from the low words only. Mid and top words hold
/// "fully occupied" summaries (bit set once every child is full) that are
/// used for diagnostics.
use super::constants::*;

/// Location of a single pixel bit: the low word index plus the bit inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelAddress {
    pub word: usize,
    pub bit: u32,
}

pub struct HierarchicalBitmask {
    low: Vec<u64>,
    mid: Vec<u64>,
    top: Vec<u64>,
}

impl Default for HierarchicalBitmask {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchicalBitmask {
    pub fn new() -> Self {
        Self {
            low: vec![0; LOW_BIN_COUNT],
            mid: vec![0; MID_BIN_COUNT],
            top: vec![0; TOP_BIN_COUNT],
        }
    }

    /// Reset every word so that all pixels read as unoccupied.
    #[inline]
    pub fn clear(&mut self) {
        self.low.fill(0);
        self.mid.fill(0);
        self.top.fill(0);
    }

    #[inline]
    pub fn is_pixel_in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < PIXEL_WIDTH && y < PIXEL_HEIGHT
    }

    /// Returns true if the pixel is NOT occupied.
    ///
    /// Pixels off the screen are never unoccupied.
    #[inline]
    pub fn test_pixel(&self, x: i32, y: i32) -> bool {
        if !Self::is_pixel_in_bounds(x, y) {
            return false;
        }
        self.low[low_index_from_pixel(x, y)] & pixel_mask(x, y) == 0
    }

    /// Mark the pixel as occupied. Off-screen pixels are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32) {
        if !Self::is_pixel_in_bounds(x, y) {
            return;
        }
        self.merge_word(low_index_from_pixel(x, y), pixel_mask(x, y));
    }

    /// Raw low word at `index`.
    #[inline]
    pub fn word(&self, index: usize) -> u64 {
        self.low[index]
    }

    /// OR `mask` into the low word at `index`, keeping summaries current.
    #[inline]
    pub fn merge_word(&mut self, index: usize, mask: u64) {
        let word = &mut self.low[index];
        let before = *word;
        *word |= mask;

        if before != u64::MAX && *word == u64::MAX {
            self.mark_low_full(index);
        }
    }

    fn mark_low_full(&mut self, low_index: usize) {
        let mid_index = low_index >> 6;
        let mid = &mut self.mid[mid_index];
        *mid |= 1u64 << (low_index & 63);

        if *mid == u64::MAX {
            self.top[mid_index >> 6] |= 1u64 << (mid_index & 63);
        }
    }

    /// All low words in storage order (used for raster snapshots).
    #[inline]
    pub fn low_words(&self) -> &[u64] {
        &self.low
    }

    pub fn occupied_pixel_count(&self) -> u64 {
        self.low.iter().map(|w| w.count_ones() as u64).sum()
    }

    /// Number of 8×8 bins that are completely occupied.
    pub fn full_low_bin_count(&self) -> u32 {
        self.mid.iter().map(|w| w.count_ones()).sum()
    }

    /// Number of 64×64 bins that are completely occupied.
    pub fn full_mid_bin_count(&self) -> u32 {
        self.top.iter().map(|w| w.count_ones()).sum()
    }

    #[inline]
    pub fn address(x: i32, y: i32) -> PixelAddress {
        PixelAddress {
            word: low_index_from_pixel(x, y),
            bit: pixel_index(x, y),
        }
    }

    /// Inverse of [`HierarchicalBitmask::address`].
    pub fn pixel_at(address: PixelAddress) -> (i32, i32) {
        let top = (address.word >> TOP_INDEX_SHIFT) as i32;
        let (mid_x, mid_y) = morton_decode(((address.word >> MID_INDEX_SHIFT) & 63) as u32);
        let (bin_x, bin_y) = morton_decode((address.word & 63) as u32);

        let top_x = top & (TOP_WIDTH - 1);
        let top_y = top >> TOP_Y_SHIFT;

        let low_x = (top_x << MID_AXIS_SHIFT) | ((mid_x as i32) << LOW_AXIS_SHIFT) | bin_x as i32;
        let low_y = (top_y << MID_AXIS_SHIFT) | ((mid_y as i32) << LOW_AXIS_SHIFT) | bin_y as i32;

        let bit = address.bit as i32;
        (
            (low_x << BIN_AXIS_SHIFT) | (bit & BIN_PIXEL_INDEX_MASK),
            (low_y << BIN_AXIS_SHIFT) | (bit >> BIN_AXIS_SHIFT),
        )
    }
}

#[inline]
pub fn top_index(top_x: i32, top_y: i32) -> usize {
    ((top_y << TOP_Y_SHIFT) | top_x) as usize
}

/// Index of the mid word covering mid bin (`mid_x`, `mid_y`).
#[inline]
pub fn mid_index(mid_x: i32, mid_y: i32) -> usize {
    let top = top_index(mid_x >> LOW_AXIS_SHIFT, mid_y >> LOW_AXIS_SHIFT);
    let morton = morton_encode(
        (mid_x & BIN_PIXEL_INDEX_MASK) as u32,
        (mid_y & BIN_PIXEL_INDEX_MASK) as u32,
    );
    (top << MID_INDEX_SHIFT) | morton as usize
}

/// Index of the low word covering low bin (`low_x`, `low_y`).
#[inline]
pub fn low_index(low_x: i32, low_y: i32) -> usize {
    let mid_x = (low_x >> LOW_AXIS_SHIFT) & BIN_PIXEL_INDEX_MASK;
    let mid_y = (low_y >> LOW_AXIS_SHIFT) & BIN_PIXEL_INDEX_MASK;
    let top = top_index(low_x >> MID_AXIS_SHIFT, low_y >> MID_AXIS_SHIFT);

    (top << TOP_INDEX_SHIFT)
        | ((morton_encode(mid_x as u32, mid_y as u32) as usize) << MID_INDEX_SHIFT)
        | morton_encode(
            (low_x & BIN_PIXEL_INDEX_MASK) as u32,
            (low_y & BIN_PIXEL_INDEX_MASK) as u32,
        ) as usize
}

#[inline]
pub fn low_index_from_pixel(x: i32, y: i32) -> usize {
    low_index(x >> LOW_AXIS_SHIFT, y >> LOW_AXIS_SHIFT)
}

/// Row-major bit position of a pixel within its 8×8 word.
#[inline]
pub fn pixel_index(x: i32, y: i32) -> u32 {
    (((y & BIN_PIXEL_INDEX_MASK) << BIN_AXIS_SHIFT) | (x & BIN_PIXEL_INDEX_MASK)) as u32
}

#[inline]
pub fn pixel_mask(x: i32, y: i32) -> u64 {
    1u64 << pixel_index(x, y)
}

/// Interleave the bits of x (even positions) and y (odd positions).
///
/// x = ...x2 x1 x0
/// y = ...y2 y1 y0
/// morton = ...y2 x2 y1 x1 y0 x0
#[inline]
pub fn morton_encode(mut x: u32, mut y: u32) -> u32 {
    x &= 0x0000FFFF;
    y &= 0x0000FFFF;

    x = (x | (x << 8)) & 0x00FF00FF;
    x = (x | (x << 4)) & 0x0F0F0F0F;
    x = (x | (x << 2)) & 0x33333333;
    x = (x | (x << 1)) & 0x55555555;

    y = (y | (y << 8)) & 0x00FF00FF;
    y = (y | (y << 4)) & 0x0F0F0F0F;
    y = (y | (y << 2)) & 0x33333333;
    y = (y | (y << 1)) & 0x55555555;

    x | (y << 1)
}

#[inline]
pub fn morton_decode(morton: u32) -> (u32, u32) {
    let mut x = morton & 0x55555555;
    let mut y = (morton >> 1) & 0x55555555;

    x = (x | (x >> 1)) & 0x33333333;
    x = (x | (x >> 2)) & 0x0F0F0F0F;
    x = (x | (x >> 4)) & 0x00FF00FF;
    x = (x | (x >> 8)) & 0x0000FFFF;

    y = (y | (y >> 1)) & 0x33333333;
    y = (y | (y >> 2)) & 0x0F0F0F0F;
    y = (y | (y >> 4)) & 0x00FF00FF;
    y = (y | (y >> 8)) & 0x0000FFFF;

    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn morton_z_pattern() {
        // 0  1  4  5
        // 2  3  6  7
        // 8  9  12 13
        // 10 11 14 15
        assert_eq!(morton_encode(0, 0), 0);
        assert_eq!(morton_encode(1, 0), 1);
        assert_eq!(morton_encode(0, 1), 2);
        assert_eq!(morton_encode(1, 1), 3);
        assert_eq!(morton_encode(2, 0), 4);
        assert_eq!(morton_encode(0, 2), 8);
        assert_eq!(morton_encode(3, 3), 15);
        assert_eq!(morton_encode(7, 7), 63);
    }

    #[test]
    fn morton_round_trip_8x8() {
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(morton_decode(morton_encode(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn pixel_index_is_row_major() {
        assert_eq!(pixel_index(0, 0), 0);
        assert_eq!(pixel_index(7, 0), 7);
        assert_eq!(pixel_index(0, 1), 8);
        assert_eq!(pixel_index(7, 7), 63);
        // Only the low three bits of each axis matter.
        assert_eq!(pixel_index(9, 17), pixel_index(1, 1));
    }

    #[test]
    fn low_index_places_top_bins_in_high_bits() {
        assert_eq!(low_index(0, 0), 0);
        assert_eq!(low_index(1, 0), 1);
        assert_eq!(low_index(0, 1), 2);
        // First low bin of the second mid bin.
        assert_eq!(low_index(8, 0), 1 << 6);
        // First low bin of the right-hand top bin.
        assert_eq!(low_index(64, 0), 1 << 12);
        assert_eq!(low_index(LOW_WIDTH - 1, LOW_HEIGHT - 1), LOW_BIN_COUNT - 1);
    }

    #[test]
    fn low_index_nests_inside_mid_index() {
        for low_y in 0..LOW_HEIGHT {
            for low_x in 0..LOW_WIDTH {
                assert_eq!(
                    low_index(low_x, low_y) >> 6,
                    mid_index(low_x >> 3, low_y >> 3)
                );
            }
        }
    }

    #[test]
    fn clear_after_writes_reads_empty() {
        let mut mask = HierarchicalBitmask::new();
        mask.set_pixel(0, 0);
        mask.set_pixel(1023, 511);
        mask.set_pixel(517, 130);
        assert!(!mask.test_pixel(517, 130));

        mask.clear();
        assert_eq!(mask.occupied_pixel_count(), 0);
        assert!(mask.test_pixel(0, 0));
        assert!(mask.test_pixel(1023, 511));
        assert!(mask.test_pixel(517, 130));
        assert_eq!(mask.full_low_bin_count(), 0);
    }

    #[test]
    fn set_pixel_touches_only_that_pixel() {
        let mut mask = HierarchicalBitmask::new();
        mask.set_pixel(100, 200);
        assert!(!mask.test_pixel(100, 200));
        assert!(mask.test_pixel(101, 200));
        assert!(mask.test_pixel(100, 201));
        assert!(mask.test_pixel(99, 199));
        assert_eq!(mask.occupied_pixel_count(), 1);
    }

    #[test]
    fn off_screen_pixels_are_ignored() {
        let mut mask = HierarchicalBitmask::new();
        for (x, y) in [(-1, 0), (0, -1), (PIXEL_WIDTH, 0), (0, PIXEL_HEIGHT), (i32::MIN, i32::MAX)] {
            mask.set_pixel(x, y);
            assert!(!mask.test_pixel(x, y), "({x}, {y}) is never unoccupied");
        }
        assert_eq!(mask.occupied_pixel_count(), 0);
    }

    #[test]
    fn full_bins_roll_up_into_summaries() {
        let mut mask = HierarchicalBitmask::new();

        for y in 0..8 {
            for x in 0..8 {
                mask.set_pixel(x, y);
            }
        }
        assert_eq!(mask.full_low_bin_count(), 1);
        assert_eq!(mask.full_mid_bin_count(), 0);

        for y in 0..64 {
            for x in 0..64 {
                mask.set_pixel(x, y);
            }
        }
        assert_eq!(mask.full_low_bin_count(), 64);
        assert_eq!(mask.full_mid_bin_count(), 1);
    }

    #[test]
    fn merge_word_is_idempotent_for_summaries() {
        let mut mask = HierarchicalBitmask::new();
        let index = low_index(5, 5);
        mask.merge_word(index, u64::MAX);
        mask.merge_word(index, u64::MAX);
        assert_eq!(mask.full_low_bin_count(), 1);
        assert_eq!(mask.word(index), u64::MAX);
    }
}
