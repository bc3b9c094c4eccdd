/// Fixed dimensions of the occlusion raster.
///
/// The raster is a virtual 1024×512 screen split into a three-level
/// hierarchy of 64-bit words:
/// - low bin: 8×8 pixels (one word, one bit per pixel)
/// - mid bin: 8×8 low bins (64×64 pixels)
/// - top bin: 8×8 mid bins (512×512 pixels), 2×1 of them cover the screen

/// log2 of the edge length of any bin measured in its child units.
pub const BIN_AXIS_SHIFT: i32 = 3;
pub const BIN_PIXEL_DIAMETER: i32 = 1 << BIN_AXIS_SHIFT;
pub const BIN_PIXEL_INDEX_MASK: i32 = BIN_PIXEL_DIAMETER - 1;

pub const LOW_AXIS_SHIFT: i32 = BIN_AXIS_SHIFT;
pub const MID_AXIS_SHIFT: i32 = BIN_AXIS_SHIFT * 2;

/// Shift of the mid Morton number inside a low word index.
pub const MID_INDEX_SHIFT: i32 = LOW_AXIS_SHIFT * 2;
/// Shift of the top index inside a low word index.
pub const TOP_INDEX_SHIFT: i32 = MID_INDEX_SHIFT * 2;

pub const TOP_WIDTH: i32 = 2;
pub const TOP_HEIGHT: i32 = 1;
pub const TOP_Y_SHIFT: i32 = (TOP_WIDTH - 1).count_ones() as i32;

pub const MID_WIDTH: i32 = TOP_WIDTH * BIN_PIXEL_DIAMETER;
pub const MID_HEIGHT: i32 = TOP_HEIGHT * BIN_PIXEL_DIAMETER;

pub const LOW_WIDTH: i32 = MID_WIDTH * BIN_PIXEL_DIAMETER;
pub const LOW_HEIGHT: i32 = MID_HEIGHT * BIN_PIXEL_DIAMETER;

pub const PIXEL_WIDTH: i32 = LOW_WIDTH * BIN_PIXEL_DIAMETER;
pub const PIXEL_HEIGHT: i32 = LOW_HEIGHT * BIN_PIXEL_DIAMETER;

pub const TOP_BIN_COUNT: usize = (TOP_WIDTH * TOP_HEIGHT) as usize;
pub const MID_BIN_COUNT: usize = (MID_WIDTH * MID_HEIGHT) as usize;
pub const LOW_BIN_COUNT: usize = (LOW_WIDTH * LOW_HEIGHT) as usize;

/// Sub-pixel precision of projected coordinates.
pub const PRECISION_BITS: i32 = 4;
pub const PRECISION_PIXEL_CENTER: i32 = 1 << (PRECISION_BITS - 1);

pub const PRECISION_WIDTH: i32 = PIXEL_WIDTH << PRECISION_BITS;
pub const PRECISION_HEIGHT: i32 = PIXEL_HEIGHT << PRECISION_BITS;
pub const HALF_PRECISION_WIDTH: i32 = PRECISION_WIDTH / 2;
pub const HALF_PRECISION_HEIGHT: i32 = PRECISION_HEIGHT / 2;

/// Margin (in sub-pixel units) tolerated outside each viewport edge.
pub const GUARD_SIZE: i32 = 512;
pub const GUARD_MIN_X: i32 = -GUARD_SIZE;
pub const GUARD_MAX_X: i32 = PRECISION_WIDTH + GUARD_SIZE;
pub const GUARD_MIN_Y: i32 = -GUARD_SIZE;
pub const GUARD_MAX_Y: i32 = PRECISION_HEIGHT + GUARD_SIZE;

/// Guard band expressed as an NDC extent, used for clip-space clipping.
pub const GUARD_NDC_X: f32 = 1.0 + GUARD_SIZE as f32 / HALF_PRECISION_WIDTH as f32;
pub const GUARD_NDC_Y: f32 = 1.0 + GUARD_SIZE as f32 / HALF_PRECISION_HEIGHT as f32;

/// Vertices closer than this (clip w) are clipped away.
pub const NEAR_W_EPS: f32 = 0.001;

/// Edge length of a terrain chunk in blocks.
pub const CHUNK_DIAMETER: i32 = 16;
