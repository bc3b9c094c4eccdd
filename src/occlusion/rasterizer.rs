/// Fixed-point edge-function rasterizer writing into the occlusion bitmask
///
/// Triangles are scanned one 8×8 low bin at a time: the coverage of a whole
/// bin is accumulated into a 64-bit mask using incremental edge stepping, and
/// only then combined with the bin's occupancy word. Draw and test share the
/// scan; they differ only in what happens to a non-empty coverage mask.
/// Test mode alone also answers for polygons too thin to cover any pixel
/// centre.
use super::bitmask::{low_index, HierarchicalBitmask};
use super::constants::*;
use super::projection::ProjectedVertex;
use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterMode {
    /// Stop at the first covered pixel that is not yet occupied.
    Test,
    /// Mark every covered pixel as occupied.
    Draw,
}

/// Edge equations and clamped pixel bounds of one triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleSetup {
    pub min_px: i32,
    pub min_py: i32,
    pub max_px: i32,
    pub max_py: i32,
    /// Per-pixel x step of each edge function.
    pub a: [i32; 3],
    /// Per-pixel y step of each edge function.
    pub b: [i32; 3],
    /// Edge functions at the centre of (min_px, min_py), fill-rule biased and
    /// reduced to whole-pixel precision. Inside iff all three are >= 0.
    pub w_origin: [i32; 3],
}

impl TriangleSetup {
    /// Returns None for zero-area triangles and triangles that cover no pixel
    /// centre inside the viewport.
    pub fn new(v0: ProjectedVertex, v1: ProjectedVertex, v2: ProjectedVertex) -> Option<Self> {
        debug_assert!(v0.is_in_guard_band() && v1.is_in_guard_band() && v2.is_in_guard_band());

        let area = orient2d(v0.x, v0.y, v1.x, v1.y, v2.x, v2.y);
        if area == 0 {
            return None;
        }

        // Normalise to counter-clockwise so "inside" is always the positive side.
        let (v1, v2) = if area < 0 { (v2, v1) } else { (v1, v2) };

        let min_x = v0.x.min(v1.x).min(v2.x);
        let max_x = v0.x.max(v1.x).max(v2.x);
        let min_y = v0.y.min(v1.y).min(v2.y);
        let max_y = v0.y.max(v1.y).max(v2.y);

        // Pixels whose centres fall inside the fixed-point bounds.
        let min_px = ((min_x + PRECISION_PIXEL_CENTER - 1) >> PRECISION_BITS).max(0);
        let min_py = ((min_y + PRECISION_PIXEL_CENTER - 1) >> PRECISION_BITS).max(0);
        let max_px = ((max_x - PRECISION_PIXEL_CENTER) >> PRECISION_BITS).min(PIXEL_WIDTH - 1);
        let max_py = ((max_y - PRECISION_PIXEL_CENTER) >> PRECISION_BITS).min(PIXEL_HEIGHT - 1);

        if min_px > max_px || min_py > max_py {
            return None;
        }

        let cx = (min_px << PRECISION_BITS) + PRECISION_PIXEL_CENTER;
        let cy = (min_py << PRECISION_BITS) + PRECISION_PIXEL_CENTER;

        let edges = [(v1, v2), (v2, v0), (v0, v1)];
        let mut a = [0i32; 3];
        let mut b = [0i32; 3];
        let mut w_origin = [0i32; 3];

        for (i, (start, end)) in edges.into_iter().enumerate() {
            a[i] = start.y - end.y;
            b[i] = end.x - start.x;

            // Samples exactly on an edge belong to the triangle only if the
            // edge is a left edge (descending) or a top edge (horizontal,
            // running toward -x). Shared edges run in opposite directions in
            // the two triangles, so exactly one of them owns the tie.
            let is_top_left = a[i] > 0 || (a[i] == 0 && b[i] < 0);
            let bias: i64 = if is_top_left { 0 } else { -1 };

            // Per-pixel steps are whole multiples of 1 << PRECISION_BITS, so
            // flooring once here loses nothing during stepping.
            let e = orient2d(start.x, start.y, end.x, end.y, cx, cy) + bias;
            w_origin[i] = (e >> PRECISION_BITS) as i32;
        }

        Some(Self {
            min_px,
            min_py,
            max_px,
            max_py,
            a,
            b,
            w_origin,
        })
    }

    /// Edge values at pixel (x, y).
    #[inline]
    fn edges_at(&self, x: i32, y: i32) -> [i32; 3] {
        let dx = x - self.min_px;
        let dy = y - self.min_py;
        [
            self.w_origin[0] + self.a[0] * dx + self.b[0] * dy,
            self.w_origin[1] + self.a[1] * dx + self.b[1] * dy,
            self.w_origin[2] + self.a[2] * dx + self.b[2] * dy,
        ]
    }

    /// Coverage of low bin (`tile_x`, `tile_y`) as a row-major 64-bit mask.
    fn tile_coverage(&self, tile_x: i32, tile_y: i32) -> u64 {
        let base_x = tile_x << BIN_AXIS_SHIFT;
        let base_y = tile_y << BIN_AXIS_SHIFT;

        let col_min = (self.min_px - base_x).max(0);
        let col_max = (self.max_px - base_x).min(BIN_PIXEL_INDEX_MASK);
        let row_min = (self.min_py - base_y).max(0);
        let row_max = (self.max_py - base_y).min(BIN_PIXEL_INDEX_MASK);

        let mut w_row = self.edges_at(base_x + col_min, base_y + row_min);
        let mut mask = 0u64;

        for py in row_min..=row_max {
            let mut w = w_row;
            for px in col_min..=col_max {
                if (w[0] | w[1] | w[2]) >= 0 {
                    mask |= 1u64 << ((py << BIN_AXIS_SHIFT) | px);
                }
                w[0] += self.a[0];
                w[1] += self.a[1];
                w[2] += self.a[2];
            }
            w_row[0] += self.b[0];
            w_row[1] += self.b[1];
            w_row[2] += self.b[2];
        }

        mask
    }
}

/// Twice the signed area of (a, b, c); positive when c is left of a -> b.
#[inline]
pub fn orient2d(ax: i32, ay: i32, bx: i32, by: i32, cx: i32, cy: i32) -> i64 {
    let (ax, ay, bx, by, cx, cy) = (ax as i64, ay as i64, bx as i64, by as i64, cx as i64, cy as i64);
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

/// What one triangle scan found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    /// No pixel centre lies inside the triangle.
    Empty,
    /// Centres were covered: all already occupied (test) or now marked (draw).
    Covered,
    /// Test mode found a covered pixel that is not yet occupied.
    Unoccupied,
}

pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    /// Scan one triangle, sampling pixel centres only.
    ///
    /// Test mode returns true as soon as a covered, unoccupied pixel is
    /// found. Draw mode returns true if any pixel was covered.
    pub fn rasterize_triangle(
        bitmask: &mut HierarchicalBitmask,
        v0: ProjectedVertex,
        v1: ProjectedVertex,
        v2: ProjectedVertex,
        mode: RasterMode,
    ) -> bool {
        match Self::triangle_coverage(bitmask, v0, v1, v2, mode) {
            Coverage::Unoccupied => true,
            Coverage::Covered => mode == RasterMode::Draw,
            Coverage::Empty => false,
        }
    }

    /// Scan a convex quad as the triangles (0, 1, 2) and (0, 2, 3).
    pub fn rasterize_quad(
        bitmask: &mut HierarchicalBitmask,
        quad: [ProjectedVertex; 4],
        mode: RasterMode,
    ) -> bool {
        Self::rasterize_polygon(bitmask, &quad, mode)
    }

    /// Scan a convex polygon as a fan around its first vertex.
    ///
    /// Draw mode marks covered pixel centres only, so occluders never grow.
    /// In test mode a polygon that covers no pixel centre at all falls back
    /// to the pixels under its bounding box: it is visible if any of them is
    /// unoccupied.
    pub fn rasterize_polygon(
        bitmask: &mut HierarchicalBitmask,
        verts: &[ProjectedVertex],
        mode: RasterMode,
    ) -> bool {
        let Some((&first, rest)) = verts.split_first() else {
            return false;
        };

        let mut covered = false;
        for edge in rest.windows(2) {
            match Self::triangle_coverage(bitmask, first, edge[0], edge[1], mode) {
                Coverage::Unoccupied => return true,
                Coverage::Covered => covered = true,
                Coverage::Empty => {}
            }
        }

        match mode {
            RasterMode::Draw => covered,
            RasterMode::Test => !covered && verts.len() >= 3 && Self::test_footprint(bitmask, verts),
        }
    }

    fn triangle_coverage(
        bitmask: &mut HierarchicalBitmask,
        v0: ProjectedVertex,
        v1: ProjectedVertex,
        v2: ProjectedVertex,
        mode: RasterMode,
    ) -> Coverage {
        count_call!(FUNCTION_COUNTERS.triangles_rasterized);

        let Some(setup) = TriangleSetup::new(v0, v1, v2) else {
            count_call!(FUNCTION_COUNTERS.triangles_rejected);
            return Coverage::Empty;
        };

        Self::scan(bitmask, &setup, mode)
    }

    fn scan(bitmask: &mut HierarchicalBitmask, setup: &TriangleSetup, mode: RasterMode) -> Coverage {
        let tile_x0 = setup.min_px >> BIN_AXIS_SHIFT;
        let tile_x1 = setup.max_px >> BIN_AXIS_SHIFT;
        let tile_y0 = setup.min_py >> BIN_AXIS_SHIFT;
        let tile_y1 = setup.max_py >> BIN_AXIS_SHIFT;

        let mut coverage = Coverage::Empty;

        for tile_y in tile_y0..=tile_y1 {
            for tile_x in tile_x0..=tile_x1 {
                let mask = setup.tile_coverage(tile_x, tile_y);
                if mask == 0 {
                    continue;
                }

                coverage = Coverage::Covered;
                let index = low_index(tile_x, tile_y);
                match mode {
                    RasterMode::Test => {
                        count_call!(FUNCTION_COUNTERS.bins_tested);
                        if mask & !bitmask.word(index) != 0 {
                            return Coverage::Unoccupied;
                        }
                    }
                    RasterMode::Draw => {
                        count_call!(FUNCTION_COUNTERS.bins_drawn);
                        bitmask.merge_word(index, mask);
                    }
                }
            }
        }

        coverage
    }

    /// True if any viewport pixel touched by the fixed-point bounding box of
    /// `verts` is unoccupied.
    fn test_footprint(bitmask: &HierarchicalBitmask, verts: &[ProjectedVertex]) -> bool {
        let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
        let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
        for v in verts {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }

        let min_px = (min_x >> PRECISION_BITS).max(0);
        let min_py = (min_y >> PRECISION_BITS).max(0);
        let max_px = (max_x >> PRECISION_BITS).min(PIXEL_WIDTH - 1);
        let max_py = (max_y >> PRECISION_BITS).min(PIXEL_HEIGHT - 1);

        if min_px > max_px || min_py > max_py {
            return false;
        }

        for tile_y in (min_py >> BIN_AXIS_SHIFT)..=(max_py >> BIN_AXIS_SHIFT) {
            for tile_x in (min_px >> BIN_AXIS_SHIFT)..=(max_px >> BIN_AXIS_SHIFT) {
                count_call!(FUNCTION_COUNTERS.bins_tested);

                let base_x = tile_x << BIN_AXIS_SHIFT;
                let base_y = tile_y << BIN_AXIS_SHIFT;
                let mask = rect_mask(
                    (min_px - base_x).max(0),
                    (max_px - base_x).min(BIN_PIXEL_INDEX_MASK),
                    (min_py - base_y).max(0),
                    (max_py - base_y).min(BIN_PIXEL_INDEX_MASK),
                );

                if mask & !bitmask.word(low_index(tile_x, tile_y)) != 0 {
                    return true;
                }
            }
        }

        false
    }
}

/// Bits of the inclusive pixel rectangle inside one 8×8 word.
#[inline]
fn rect_mask(col_min: i32, col_max: i32, row_min: i32, row_max: i32) -> u64 {
    let row_bits = ((1u64 << (col_max - col_min + 1)) - 1) << col_min;
    let mut mask = 0u64;
    for row in row_min..=row_max {
        mask |= row_bits << (row << BIN_AXIS_SHIFT);
    }
    mask
}
