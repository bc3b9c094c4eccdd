//! Randomised fill-rule checks: triangles sharing an edge must cover every
//! pixel centre of their union exactly once.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use terrain_occlusion::occlusion::constants::{PIXEL_HEIGHT, PIXEL_WIDTH};
use terrain_occlusion::occlusion::rasterizer::orient2d;
use terrain_occlusion::occlusion::{
    EdgeFunctionRasterizer, HierarchicalBitmask, ProjectedVertex, RasterMode,
};

const CASES: usize = 200;

fn vertex(x: i32, y: i32) -> ProjectedVertex {
    ProjectedVertex { x, y }
}

fn draw(triangles: &[[ProjectedVertex; 3]]) -> HierarchicalBitmask {
    let mut mask = HierarchicalBitmask::new();
    for [a, b, c] in triangles {
        EdgeFunctionRasterizer::rasterize_triangle(&mut mask, *a, *b, *c, RasterMode::Draw);
    }
    mask
}

fn union(a: &HierarchicalBitmask, b: &HierarchicalBitmask) -> Vec<u64> {
    a.low_words().iter().zip(b.low_words()).map(|(x, y)| x | y).collect()
}

/// Random parallelogram `p, p+u, p+u+v, p+v` in sub-pixel units, kept well
/// inside the viewport. With `snap` every corner lands on a pixel corner.
fn random_parallelogram(rng: &mut ChaCha8Rng, snap: bool) -> [ProjectedVertex; 4] {
    let scale = if snap { 16 } else { 1 };
    let range = if snap { 60 } else { 60 * 16 };

    loop {
        let px = rng.gen_range(130 * 16 / scale..=890 * 16 / scale) * scale;
        let py = rng.gen_range(130 * 16 / scale..=380 * 16 / scale) * scale;
        let (ux, uy) = (rng.gen_range(-range..=range) * scale, rng.gen_range(-range..=range) * scale);
        let (vx, vy) = (rng.gen_range(-range..=range) * scale, rng.gen_range(-range..=range) * scale);

        if ux as i64 * vy as i64 - uy as i64 * vx as i64 == 0 {
            continue;
        }

        return [
            vertex(px, py),
            vertex(px + ux, py + uy),
            vertex(px + ux + vx, py + uy + vy),
            vertex(px + vx, py + vy),
        ];
    }
}

/// Sign of the pixel centre against every edge of the (convex) quad,
/// normalised so that inside is positive. Returns (strictly inside,
/// strictly outside).
fn classify_centre(quad: &[ProjectedVertex; 4], x: i32, y: i32) -> (bool, bool) {
    let cx = x * 16 + 8;
    let cy = y * 16 + 8;
    let winding = orient2d(quad[0].x, quad[0].y, quad[1].x, quad[1].y, quad[2].x, quad[2].y).signum();

    let mut all_positive = true;
    let mut any_negative = false;
    for i in 0..4 {
        let (a, b) = (quad[i], quad[(i + 1) % 4]);
        let e = orient2d(a.x, a.y, b.x, b.y, cx, cy) * winding;
        all_positive &= e > 0;
        any_negative |= e < 0;
    }
    (all_positive, any_negative)
}

fn check_parallelogram(quad: [ProjectedVertex; 4], case: usize) {
    let first = draw(&[[quad[0], quad[1], quad[2]]]);
    let second = draw(&[[quad[0], quad[2], quad[3]]]);

    // Disjoint halves.
    for (i, (a, b)) in first.low_words().iter().zip(second.low_words()).enumerate() {
        assert_eq!(a & b, 0, "case {case}: halves overlap in word {i}, quad {quad:?}");
    }

    let covered = union(&first, &second);

    // Same union whichever diagonal splits the quad.
    let other_first = draw(&[[quad[1], quad[2], quad[3]]]);
    let other_second = draw(&[[quad[1], quad[3], quad[0]]]);
    assert_eq!(
        covered,
        union(&other_first, &other_second),
        "case {case}: diagonal choice changed coverage, quad {quad:?}"
    );

    // Interior covered, exterior untouched.
    let mut union_mask = HierarchicalBitmask::new();
    for (index, &word) in covered.iter().enumerate() {
        if word != 0 {
            union_mask.merge_word(index, word);
        }
    }

    let min_x = quad.iter().map(|v| v.x).min().unwrap_or(0) / 16 - 1;
    let max_x = quad.iter().map(|v| v.x).max().unwrap_or(0) / 16 + 1;
    let min_y = quad.iter().map(|v| v.y).min().unwrap_or(0) / 16 - 1;
    let max_y = quad.iter().map(|v| v.y).max().unwrap_or(0) / 16 + 1;

    for y in min_y.max(0)..=max_y.min(PIXEL_HEIGHT - 1) {
        for x in min_x.max(0)..=max_x.min(PIXEL_WIDTH - 1) {
            let (inside, outside) = classify_centre(&quad, x, y);
            let set = !union_mask.test_pixel(x, y);
            if inside {
                assert!(set, "case {case}: interior pixel ({x}, {y}) missed, quad {quad:?}");
            }
            if outside {
                assert!(!set, "case {case}: exterior pixel ({x}, {y}) drawn, quad {quad:?}");
            }
        }
    }
}

#[test]
fn test_pixel_aligned_parallelograms() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0cc1_u64);
    for case in 0..CASES {
        let quad = random_parallelogram(&mut rng, true);
        check_parallelogram(quad, case);
    }
}

#[test]
fn test_sub_pixel_parallelograms() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_u64);
    for case in 0..CASES {
        let quad = random_parallelogram(&mut rng, false);
        check_parallelogram(quad, case);
    }
}

#[test]
fn test_triangle_fan_covers_each_pixel_once() {
    // Regular-ish polygon around a centre, fanned from vertex 0 the same way
    // clipped faces are.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for case in 0..50 {
        let cx = rng.gen_range(300..700) * 16;
        let cy = rng.gen_range(150..350) * 16;
        let radius = rng.gen_range(20.0f64..100.0) * 16.0;
        let count = rng.gen_range(3..=9);
        let phase = rng.gen_range(0.0..std::f64::consts::TAU);

        let poly: Vec<ProjectedVertex> = (0..count)
            .map(|i| {
                let angle = phase + i as f64 * std::f64::consts::TAU / count as f64;
                vertex(cx + (radius * angle.cos()) as i32, cy + (radius * angle.sin()) as i32)
            })
            .collect();

        let mut total = 0u64;
        let mut combined = vec![0u64; HierarchicalBitmask::new().low_words().len()];
        for edge in poly[1..].windows(2) {
            let tri = draw(&[[poly[0], edge[0], edge[1]]]);
            total += tri.occupied_pixel_count();
            for (acc, word) in combined.iter_mut().zip(tri.low_words()) {
                assert_eq!(*acc & word, 0, "case {case}: fan triangles overlap");
                *acc |= word;
            }
        }

        let union_count: u64 = combined.iter().map(|w| w.count_ones() as u64).sum();
        assert_eq!(total, union_count, "case {case}");
        assert!(union_count > 0, "case {case}: polygon of radius {radius} drew nothing");
    }
}
