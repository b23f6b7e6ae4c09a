//! Spritebin packs rectangles into a compact region that grows as it fills
//! up. It was built to lay out sprite sheets: the largest rectangles are placed
//! first, and whenever nothing fits, the region is enlarged in whichever
//! direction keeps it closest to the desired [`BinShape`].
//!
//! Packing is greedy and fast rather than optimal, and rectangles are never
//! rotated. The free space left over is kept in a [`BinTree`], which can be
//! handed back to the packer to add more rectangles later without moving any
//! that were already placed.
//!
//! ## Example
//! ```
//! use spritebin::{BinPacker, BinShape, Item};
//!
//! // Anything implementing `Packable` can be packed. `Item` is the simplest
//! // implementation: just a size and the position the packer picked.
//! let mut items = vec![
//!     Item::new((100, 50)),
//!     Item::new((50, 50)),
//!     Item::new((50, 50)),
//! ];
//!
//! let packer = BinPacker::new().shape(BinShape::Square);
//! let mut tree = packer.pack(&mut items)?;
//! assert_eq!(tree.as_ref().map(|tree| tree.size()), Some((100, 100)));
//!
//! // Later on, place one more item around the existing ones.
//! let mut extra = Item::new((30, 30));
//! packer.pack_one(&mut tree, &mut extra)?;
//! # Ok::<(), spritebin::PackError>(())
//! ```

mod error;
mod geometry;
mod packer;
mod tree;
mod types;

pub use error::*;
pub use geometry::*;
pub use packer::*;
pub use tree::{BinNode, BinTree, NodeId, NodeState};
pub use types::*;
