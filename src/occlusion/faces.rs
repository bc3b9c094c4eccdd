/// Box corner projection and camera-facing face selection
use super::projection::FixedPointProjector;
use glam::{IVec3, Mat4, Vec3, Vec4};

/// Axis-aligned face of a box, in block-face order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxFace {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl BoxFace {
    pub const ALL: [BoxFace; 6] = [
        BoxFace::Down,
        BoxFace::Up,
        BoxFace::North,
        BoxFace::South,
        BoxFace::West,
        BoxFace::East,
    ];

    /// Corner indices (see [`BoxCorners`]) of the face quad, wound
    /// consistently so the 0-2 diagonal splits it into two triangles.
    #[inline]
    pub const fn quad_corners(self) -> [usize; 4] {
        match self {
            BoxFace::Up => [0b110, 0b010, 0b011, 0b111],
            BoxFace::Down => [0b000, 0b100, 0b101, 0b001],
            BoxFace::East => [0b101, 0b100, 0b110, 0b111],
            BoxFace::West => [0b000, 0b001, 0b011, 0b010],
            BoxFace::South => [0b001, 0b101, 0b111, 0b011],
            BoxFace::North => [0b100, 0b000, 0b010, 0b110],
        }
    }

    #[inline]
    pub const fn flag(self) -> u8 {
        1 << self as u8
    }
}

/// Small bitset of faces. Bit 6 marks "unassigned" geometry (no cull face).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const EMPTY: FaceSet = FaceSet(0);
    pub const UNASSIGNED: FaceSet = FaceSet(1 << 6);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn insert(&mut self, face: BoxFace) {
        self.0 |= face.flag();
    }

    #[inline]
    pub const fn contains(self, face: BoxFace) -> bool {
        self.0 & face.flag() != 0
    }

    #[inline]
    pub const fn has_unassigned(self) -> bool {
        self.0 & Self::UNASSIGNED.0 != 0
    }

    /// Number of real (non-unassigned) faces.
    #[inline]
    pub const fn face_count(self) -> u32 {
        (self.0 & 0b11_1111).count_ones()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = BoxFace> {
        BoxFace::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

/// Clip-space positions of the 8 corners of a box.
///
/// Corner `i` has x = max when bit 2 is set, y = max for bit 1, z = max for bit 0.
#[derive(Debug, Clone, Copy)]
pub struct BoxCorners {
    pub clip: [Vec4; 8],
}

impl BoxCorners {
    #[inline]
    pub fn face_quad(&self, face: BoxFace) -> [Vec4; 4] {
        face.quad_corners().map(|i| self.clip[i])
    }
}

pub struct BoxProjector;

impl BoxProjector {
    pub fn project_corners(mvp: &Mat4, min: Vec3, max: Vec3) -> BoxCorners {
        let mut clip = [Vec4::ZERO; 8];
        for (i, corner) in clip.iter_mut().enumerate() {
            let p = Vec3::new(
                if i & 0b100 != 0 { max.x } else { min.x },
                if i & 0b010 != 0 { max.y } else { min.y },
                if i & 0b001 != 0 { max.z } else { min.z },
            );
            *corner = FixedPointProjector::to_clip(mvp, p);
        }
        BoxCorners { clip }
    }

    /// Faces of the box `min..max` (chunk-relative) whose outward side
    /// strictly contains the camera. `offset` is chunk origin minus camera.
    ///
    /// At most one face per axis can qualify, so at most 3 are returned. A
    /// camera inside the box yields an empty set.
    pub fn facing_faces(offset: Vec3, min: Vec3, max: Vec3) -> FaceSet {
        let mut faces = FaceSet::EMPTY;

        if offset.y < -max.y {
            faces.insert(BoxFace::Up);
        }
        if offset.y > -min.y {
            faces.insert(BoxFace::Down);
        }
        if offset.x < -max.x {
            faces.insert(BoxFace::East);
        }
        if offset.x > -min.x {
            faces.insert(BoxFace::West);
        }
        if offset.z < -max.z {
            faces.insert(BoxFace::South);
        }
        if offset.z > -min.z {
            faces.insert(BoxFace::North);
        }

        faces
    }
}

/// Per-frame helper deciding which face-sorted draw lists of a region can
/// contain camera-facing geometry.
///
/// Works on region coordinates (block position >> 4). Regions sharing the
/// camera's region row on an axis keep both faces for that axis. The
/// unassigned flag is always set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawListFaceCuller {
    up_max_y: i32,
    down_min_y: i32,
    east_max_x: i32,
    west_min_x: i32,
    south_max_z: i32,
    north_min_z: i32,
}

impl DrawListFaceCuller {
    pub fn new(camera_region: IVec3) -> Self {
        let mut culler = Self::default();
        culler.update(camera_region);
        culler
    }

    pub fn update(&mut self, camera_region: IVec3) {
        self.up_max_y = camera_region.y + 1;
        self.down_min_y = camera_region.y - 1;
        self.east_max_x = camera_region.x + 1;
        self.west_min_x = camera_region.x - 1;
        self.south_max_z = camera_region.z + 1;
        self.north_min_z = camera_region.z - 1;
    }

    pub fn visible_faces(&self, region: IVec3) -> FaceSet {
        let mut faces = FaceSet::UNASSIGNED;

        if region.x < self.east_max_x {
            faces.insert(BoxFace::East);
        }
        if region.x > self.west_min_x {
            faces.insert(BoxFace::West);
        }
        if region.y < self.up_max_y {
            faces.insert(BoxFace::Up);
        }
        if region.y > self.down_min_y {
            faces.insert(BoxFace::Down);
        }
        if region.z < self.south_max_z {
            faces.insert(BoxFace::South);
        }
        if region.z > self.north_min_z {
            faces.insert(BoxFace::North);
        }

        faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Vec3 = Vec3::ZERO;
    const MAX: Vec3 = Vec3::splat(16.0);

    #[test]
    fn camera_inside_box_sees_no_faces() {
        let faces = BoxProjector::facing_faces(Vec3::splat(-8.0), MIN, MAX);
        assert!(faces.is_empty());
    }

    #[test]
    fn camera_on_face_plane_is_not_outside() {
        // Camera exactly at y = 16 relative to the chunk.
        let faces = BoxProjector::facing_faces(Vec3::new(-8.0, -16.0, -8.0), MIN, MAX);
        assert!(!faces.contains(BoxFace::Up));
        assert!(faces.is_empty());
    }

    #[test]
    fn corner_view_selects_three_faces() {
        // Camera above, east and south of the chunk.
        let faces = BoxProjector::facing_faces(Vec3::new(-20.0, -30.0, -40.0), MIN, MAX);
        assert_eq!(faces.face_count(), 3);
        assert!(faces.contains(BoxFace::Up));
        assert!(faces.contains(BoxFace::East));
        assert!(faces.contains(BoxFace::South));

        let faces = BoxProjector::facing_faces(Vec3::new(5.0, 5.0, 5.0), MIN, MAX);
        assert_eq!(faces.iter().collect::<Vec<_>>(), vec![BoxFace::Down, BoxFace::North, BoxFace::West]);
    }

    #[test]
    fn sub_box_uses_its_own_planes() {
        let min = Vec3::new(4.0, 4.0, 4.0);
        let max = Vec3::new(8.0, 8.0, 8.0);
        // Camera at chunk-relative (10, 6, 6): east of the sub box only.
        let faces = BoxProjector::facing_faces(Vec3::new(-10.0, -6.0, -6.0), min, max);
        assert_eq!(faces.iter().collect::<Vec<_>>(), vec![BoxFace::East]);
    }

    #[test]
    fn corners_follow_bit_layout() {
        let corners = BoxProjector::project_corners(&Mat4::IDENTITY, Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(corners.clip[0b000], Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(corners.clip[0b101], Vec4::new(4.0, 2.0, 6.0, 1.0));
        assert_eq!(corners.clip[0b111], Vec4::new(4.0, 5.0, 6.0, 1.0));
    }

    #[test]
    fn face_quads_lie_on_their_plane() {
        let corners = BoxProjector::project_corners(&Mat4::IDENTITY, Vec3::ZERO, Vec3::ONE);
        for face in BoxFace::ALL {
            let quad = corners.face_quad(face);
            let (axis, value) = match face {
                BoxFace::Down => (1, 0.0),
                BoxFace::Up => (1, 1.0),
                BoxFace::North => (2, 0.0),
                BoxFace::South => (2, 1.0),
                BoxFace::West => (0, 0.0),
                BoxFace::East => (0, 1.0),
            };
            assert!(quad.iter().all(|v| v[axis] == value), "{face:?}");
        }
    }

    #[test]
    fn draw_list_flags_keep_unassigned() {
        let culler = DrawListFaceCuller::new(IVec3::new(0, 4, 0));

        let same = culler.visible_faces(IVec3::new(0, 4, 0));
        assert!(same.has_unassigned());
        assert_eq!(same.face_count(), 6);

        // Region far above the camera: its up faces point away.
        let above = culler.visible_faces(IVec3::new(0, 10, 0));
        assert!(above.has_unassigned());
        assert!(!above.contains(BoxFace::Up));
        assert!(above.contains(BoxFace::Down));
    }
}
