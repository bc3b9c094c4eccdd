/// Clip-space transform, fixed-point screen conversion and guard-band clipping
use super::constants::*;
use glam::{Mat4, Vec3, Vec4};

/// A quad clipped against 5 planes can grow to at most 9 vertices.
pub const MAX_POLY_VERTS: usize = 12;

/// Vertex after the perspective divide, in 28.4 fixed-point pixel units.
///
/// Row 0 of the raster is the bottom of the screen (NDC y = -1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectedVertex {
    pub x: i32,
    pub y: i32,
}

impl ProjectedVertex {
    #[inline]
    pub fn from_clip(clip: Vec4) -> Self {
        let inv_w = 1.0 / clip.w;
        Self {
            x: ndc_to_fixed(clip.x * inv_w, HALF_PRECISION_WIDTH),
            y: ndc_to_fixed(clip.y * inv_w, HALF_PRECISION_HEIGHT),
        }
    }

    #[inline]
    pub fn is_in_guard_band(&self) -> bool {
        self.x >= GUARD_MIN_X && self.x <= GUARD_MAX_X && self.y >= GUARD_MIN_Y && self.y <= GUARD_MAX_Y
    }

    /// Pull a vertex that float rounding nudged past the guard band back onto it.
    #[inline]
    pub fn clamped_to_guard_band(self) -> Self {
        Self {
            x: self.x.clamp(GUARD_MIN_X, GUARD_MAX_X),
            y: self.y.clamp(GUARD_MIN_Y, GUARD_MAX_Y),
        }
    }
}

/// Scale and round one NDC axis into sub-pixel units.
///
/// `f32::round` is exact IEEE arithmetic, so identical inputs give identical
/// fixed-point output on every platform. The `as` cast saturates.
#[inline]
fn ndc_to_fixed(ndc: f32, half_extent: i32) -> i32 {
    let half = half_extent as f32;
    (ndc * half + half).round() as i32
}

/// Stateless transform of model-space points into projected vertices.
pub struct FixedPointProjector;

impl FixedPointProjector {
    #[inline]
    pub fn to_clip(mvp: &Mat4, point: Vec3) -> Vec4 {
        *mvp * point.extend(1.0)
    }

    /// Transform and divide. No clipping: callers must check
    /// [`FixedPointProjector::is_clip_inside_guard_band`] first or clip.
    #[inline]
    pub fn project(mvp: &Mat4, point: Vec3) -> ProjectedVertex {
        ProjectedVertex::from_clip(Self::to_clip(mvp, point))
    }

    /// True if the clip-space point is in front of the near plane and its
    /// divided coordinates land inside the guard band.
    #[inline]
    pub fn is_clip_inside_guard_band(clip: Vec4) -> bool {
        clip.w >= NEAR_W_EPS
            && clip.x.abs() <= GUARD_NDC_X * clip.w
            && clip.y.abs() <= GUARD_NDC_Y * clip.w
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipPlane {
    Near,
    Left,
    Right,
    Bottom,
    Top,
}

impl ClipPlane {
    const ALL: [ClipPlane; 5] = [
        ClipPlane::Near,
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
    ];

    /// Signed distance; inside when >= 0.
    #[inline]
    fn distance(self, v: Vec4) -> f32 {
        match self {
            ClipPlane::Near => v.w - NEAR_W_EPS,
            ClipPlane::Left => v.x + GUARD_NDC_X * v.w,
            ClipPlane::Right => GUARD_NDC_X * v.w - v.x,
            ClipPlane::Bottom => v.y + GUARD_NDC_Y * v.w,
            ClipPlane::Top => GUARD_NDC_Y * v.w - v.y,
        }
    }
}

/// Fixed-capacity convex polygon in clip space.
#[derive(Clone, Copy)]
pub struct ClipPolygon {
    verts: [Vec4; MAX_POLY_VERTS],
    len: usize,
}

impl ClipPolygon {
    pub fn from_slice(input: &[Vec4]) -> Self {
        let mut verts = [Vec4::ZERO; MAX_POLY_VERTS];
        let len = input.len().min(MAX_POLY_VERTS);
        verts[..len].copy_from_slice(&input[..len]);
        Self { verts, len }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec4] {
        &self.verts[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn push(&mut self, v: Vec4) {
        if self.len < MAX_POLY_VERTS {
            self.verts[self.len] = v;
            self.len += 1;
        }
    }

    /// Clip against the near plane and the four guard-band planes.
    /// The result is empty or has at least 3 vertices.
    pub fn clip_to_guard_band(&self) -> ClipPolygon {
        let mut current = *self;
        let mut scratch = ClipPolygon {
            verts: [Vec4::ZERO; MAX_POLY_VERTS],
            len: 0,
        };

        for plane in ClipPlane::ALL {
            clip_polygon_plane(current.vertices(), plane, &mut scratch);
            std::mem::swap(&mut current, &mut scratch);
            if current.len < 3 {
                current.len = 0;
                break;
            }
        }

        current
    }
}

/// Sutherland-Hodgman against a single plane.
fn clip_polygon_plane(input: &[Vec4], plane: ClipPlane, output: &mut ClipPolygon) {
    output.len = 0;
    let Some(&last) = input.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_dist = plane.distance(prev);

    for &curr in input {
        let curr_dist = plane.distance(curr);
        let prev_inside = prev_dist >= 0.0;
        let curr_inside = curr_dist >= 0.0;

        if prev_inside != curr_inside {
            let t = prev_dist / (prev_dist - curr_dist);
            output.push(prev + (curr - prev) * t);
        }
        if curr_inside {
            output.push(curr);
        }

        prev = curr;
        prev_dist = curr_dist;
    }
}
