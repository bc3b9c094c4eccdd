/// Chunk-relative box packed into a single `u32`
///
/// Layout (low to high): x0, y0, z0, x1, y1, z1 at 5 bits each (0..=16),
/// then a 2-bit range priority.
use std::fmt;

pub const RANGE_NEAR: u8 = 0;
pub const RANGE_MID: u8 = 1;
pub const RANGE_FAR: u8 = 2;
pub const RANGE_EXTREME: u8 = 3;

const COORD_BITS: u32 = 5;
const COORD_MASK: u32 = (1 << COORD_BITS) - 1;
const RANGE_SHIFT: u32 = COORD_BITS * 6;
const RANGE_MASK: u32 = 0b11;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedBox(u32);

impl PackedBox {
    /// The whole 16×16×16 chunk at near range.
    pub const FULL_CHUNK: PackedBox = PackedBox::pack(0, 0, 0, 16, 16, 16, RANGE_NEAR);

    /// Coordinates above 16 are clamped; min/max are reordered per axis.
    pub const fn pack(x0: u8, y0: u8, z0: u8, x1: u8, y1: u8, z1: u8, range: u8) -> Self {
        let (x0, x1) = ordered(clamp16(x0), clamp16(x1));
        let (y0, y1) = ordered(clamp16(y0), clamp16(y1));
        let (z0, z1) = ordered(clamp16(z0), clamp16(z1));

        Self(
            x0 as u32
                | (y0 as u32) << COORD_BITS
                | (z0 as u32) << (COORD_BITS * 2)
                | (x1 as u32) << (COORD_BITS * 3)
                | (y1 as u32) << (COORD_BITS * 4)
                | (z1 as u32) << (COORD_BITS * 5)
                | ((range as u32) & RANGE_MASK) << RANGE_SHIFT,
        )
    }

    /// Raw bits are normalised the same way as [`PackedBox::pack`].
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        let raw = Self(bits);
        Self::pack(raw.x0(), raw.y0(), raw.z0(), raw.x1(), raw.y1(), raw.z1(), raw.range())
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    const fn field(self, index: u32) -> u8 {
        ((self.0 >> (COORD_BITS * index)) & COORD_MASK) as u8
    }

    #[inline]
    pub const fn x0(self) -> u8 {
        self.field(0)
    }

    #[inline]
    pub const fn y0(self) -> u8 {
        self.field(1)
    }

    #[inline]
    pub const fn z0(self) -> u8 {
        self.field(2)
    }

    #[inline]
    pub const fn x1(self) -> u8 {
        self.field(3)
    }

    #[inline]
    pub const fn y1(self) -> u8 {
        self.field(4)
    }

    #[inline]
    pub const fn z1(self) -> u8 {
        self.field(5)
    }

    #[inline]
    pub const fn range(self) -> u8 {
        ((self.0 >> RANGE_SHIFT) & RANGE_MASK) as u8
    }

    /// True if the box has zero extent on some axis.
    pub const fn is_flat(self) -> bool {
        self.x0() == self.x1() || self.y0() == self.y1() || self.z0() == self.z1()
    }

    pub fn volume(self) -> u32 {
        (self.x1() - self.x0()) as u32 * (self.y1() - self.y0()) as u32 * (self.z1() - self.z0()) as u32
    }
}

const fn clamp16(v: u8) -> u8 {
    if v > 16 {
        16
    } else {
        v
    }
}

const fn ordered(a: u8, b: u8) -> (u8, u8) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl fmt::Debug for PackedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PackedBox({},{},{} .. {},{},{} r{})",
            self.x0(),
            self.y0(),
            self.z0(),
            self.x1(),
            self.y1(),
            self.z1(),
            self.range()
        )
    }
}
