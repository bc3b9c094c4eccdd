//! Identical inputs must produce bit-identical rasters and answers.
use glam::{DVec3, IVec3, Mat4};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use terrain_occlusion::occlusion::raster_dump::RasterSnapshot;
use terrain_occlusion::{Camera, PackedBox, TerrainOccluder};

struct Frame {
    raster: Vec<u64>,
    answers: Vec<bool>,
}

fn random_boxes(seed: u64, count: usize) -> Vec<(IVec3, PackedBox)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let origin = IVec3::new(
                rng.gen_range(-8..8) * 16,
                rng.gen_range(0..4) * 16,
                rng.gen_range(1..12) * 16,
            );
            let packed = PackedBox::pack(
                rng.gen_range(0..16),
                rng.gen_range(0..16),
                rng.gen_range(0..16),
                rng.gen_range(1..=16),
                rng.gen_range(1..=16),
                rng.gen_range(1..=16),
                rng.gen_range(0..4),
            );
            (origin, packed)
        })
        .collect()
}

fn run(camera: &Camera, boxes: &[(IVec3, PackedBox)]) -> Frame {
    let mut occluder = TerrainOccluder::new();
    occluder.clear_scene();
    occluder.prepare_scene(camera.projection_matrix(), camera.view_rotation(), camera.position);

    let mut answers = Vec::with_capacity(boxes.len());
    for (i, &(origin, packed)) in boxes.iter().enumerate() {
        occluder.prepare_chunk(origin);
        answers.push(occluder.is_box_visible(packed));
        if i % 2 == 0 {
            occluder.occlude_box(packed);
        }
    }

    Frame {
        raster: occluder.bitmask().low_words().to_vec(),
        answers,
    }
}

#[test]
fn test_repeated_runs_are_bit_identical() {
    let mut camera = Camera::new(DVec3::new(3.25, 30.0, -20.0));
    camera.rotate(0.3, 0.4);
    let boxes = random_boxes(42, 400);

    let first = run(&camera, &boxes);
    assert!(first.raster.iter().any(|&w| w != 0), "scene should draw something");

    for _ in 0..3 {
        let again = run(&camera, &boxes);
        assert_eq!(first.raster, again.raster);
        assert_eq!(first.answers, again.answers);
    }
}

#[test]
fn test_reused_occluder_matches_fresh_one() {
    let camera = Camera::new(DVec3::new(0.0, 24.0, -10.0));
    let boxes = random_boxes(7, 200);
    let fresh = run(&camera, &boxes);

    // Dirty an occluder with a different frame, then replay.
    let mut occluder = TerrainOccluder::new();
    occluder.clear_scene();
    occluder.prepare_scene(
        Mat4::perspective_lh(1.0, 2.0, 0.1, 100.0),
        Mat4::IDENTITY,
        DVec3::new(5.0, 5.0, -50.0),
    );
    for (origin, packed) in random_boxes(99, 50) {
        occluder.prepare_chunk(origin);
        occluder.occlude_box(packed);
    }

    occluder.clear_scene();
    occluder.prepare_scene(camera.projection_matrix(), camera.view_rotation(), camera.position);
    for (i, &(origin, packed)) in boxes.iter().enumerate() {
        occluder.prepare_chunk(origin);
        assert_eq!(occluder.is_box_visible(packed), fresh.answers[i], "box {i}");
        if i % 2 == 0 {
            occluder.occlude_box(packed);
        }
    }
    assert_eq!(occluder.bitmask().low_words(), &fresh.raster[..]);

    let snapshot = RasterSnapshot::capture(occluder.bitmask());
    assert_eq!(snapshot.to_image(), RasterSnapshot::capture(occluder.bitmask()).to_image());
}
