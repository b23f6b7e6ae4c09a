#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with unsigned integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub pos: (u32, u32),
    pub size: (u32, u32),
}

impl Rect {
    #[inline]
    pub fn new(pos: (u32, u32), size: (u32, u32)) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn min(&self) -> (u32, u32) {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> (u32, u32) {
        (self.pos.0 + self.size.0, self.pos.1 + self.size.1)
    }

    /// Like [`max`][Rect::max], but `None` if the far corner doesn't fit in
    /// 32-bit coordinates.
    pub fn checked_max(&self) -> Option<(u32, u32)> {
        Some((
            self.pos.0.checked_add(self.size.0)?,
            self.pos.1.checked_add(self.size.1)?,
        ))
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.size.0) * u64::from(self.size.1)
    }

    /// Tells whether the two rectangles share any area. Rectangles that only
    /// touch along an edge, or that have no area, never intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (self_max, other_max) = (self.max(), other.max());

        self.pos.0 < other_max.0
            && other.pos.0 < self_max.0
            && self.pos.1 < other_max.1
            && other.pos.1 < self_max.1
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        let (self_max, other_max) = (self.max(), other.max());

        other.pos.0 >= self.pos.0
            && other.pos.1 >= self.pos.1
            && other_max.0 <= self_max.0
            && other_max.1 <= self_max.1
    }

    /// The smallest rectangle containing both inputs.
    pub fn union(&self, other: &Rect) -> Rect {
        let (self_max, other_max) = (self.max(), other.max());
        let pos = (self.pos.0.min(other.pos.0), self.pos.1.min(other.pos.1));
        let max = (self_max.0.max(other_max.0), self_max.1.max(other_max.1));

        Rect {
            pos,
            size: (max.0 - pos.0, max.1 - pos.1),
        }
    }
}
