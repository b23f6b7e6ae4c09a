use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Something that can be placed by the packing functions.
///
/// The packer only ever reads the size of a `Packable` and writes its
/// position. Consumers implement this on their own objects (sprites, glyphs,
/// UI panels) so that positions are written back in place.
pub trait Packable {
    fn size(&self) -> (u32, u32);

    fn set_position(&mut self, position: (u32, u32));
}

impl<T: Packable + ?Sized> Packable for &mut T {
    #[inline]
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    #[inline]
    fn set_position(&mut self, position: (u32, u32)) {
        (**self).set_position(position)
    }
}

/// A plain rectangle to pack, for consumers that don't have their own type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub size: (u32, u32),
    pub position: (u32, u32),
}

impl Item {
    #[inline]
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size,
            position: (0, 0),
        }
    }
}

impl Packable for Item {
    #[inline]
    fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    fn set_position(&mut self, position: (u32, u32)) {
        self.position = position;
    }
}

/// The overall shape to aim for when packing.
///
/// `Tall` and `Wide` force every growth step along one axis, producing a
/// vertical or horizontal strip. `Square` picks the growth direction that
/// keeps the packed region closest to a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BinShape {
    Square,
    Tall,
    Wide,
}

impl BinShape {
    /// Descending sort key for an input of the given size. Larger keys are
    /// placed first.
    pub(crate) fn sort_key(self, size: (u32, u32)) -> (u32, u32) {
        let (width, height) = size;

        match self {
            BinShape::Tall => (width, height),
            BinShape::Wide => (height, width),
            BinShape::Square => (width.max(height), width.min(height)),
        }
    }
}

impl Default for BinShape {
    fn default() -> Self {
        BinShape::Square
    }
}

impl FromStr for BinShape {
    type Err = String;

    fn from_str(value: &str) -> Result<BinShape, Self::Err> {
        match value {
            "square" => Ok(BinShape::Square),
            "tall" => Ok(BinShape::Tall),
            "wide" => Ok(BinShape::Wide),

            _ => Err(String::from(
                "Invalid shape. Valid options are 'square', 'tall', and 'wide'.",
            )),
        }
    }
}

impl fmt::Display for BinShape {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            BinShape::Square => "square",
            BinShape::Tall => "tall",
            BinShape::Wide => "wide",
        };

        formatter.write_str(name)
    }
}
