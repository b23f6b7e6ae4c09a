//! The binary tree of free and occupied space that the packer grows.
//!
//! Nodes live in a flat arena owned by [`BinTree`] and refer to their
//! children by [`NodeId`]. Growing the tree never copies or moves existing
//! nodes: a new root is pushed that adopts the old root as one of its
//! children.

#[cfg(feature = "serde")]
use std::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::TreeError, geometry::Rect, types::Packable};

/// Index of a node inside of a [`BinTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node's region is being used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "kebab-case"))]
pub enum NodeState {
    /// Nothing has been placed here yet.
    Free,

    /// A rectangle of the given size sits in the top-left corner of the node.
    /// The `right` child covers the space beside it and the `down` child the
    /// full-width space below it.
    Occupied { size: (u32, u32) },

    /// The node was created by growing the tree. Its whole area belongs to its
    /// children.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinNode {
    pub(crate) rect: Rect,
    pub(crate) state: NodeState,
    pub(crate) right: Option<NodeId>,
    pub(crate) down: Option<NodeId>,
}

impl BinNode {
    fn free(rect: Rect) -> Self {
        Self {
            rect,
            state: NodeState::Free,
            right: None,
            down: None,
        }
    }

    fn split(rect: Rect, right: NodeId, down: NodeId) -> Self {
        Self {
            rect,
            state: NodeState::Split,
            right: Some(right),
            down: Some(down),
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.state != NodeState::Free
    }

    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    #[inline]
    pub fn down(&self) -> Option<NodeId> {
        self.down
    }

    /// The rectangle that was placed into this node, if any.
    pub fn placed(&self) -> Option<Rect> {
        match self.state {
            NodeState::Occupied { size } => Some(Rect::new(self.rect.pos, size)),
            _ => None,
        }
    }

    fn children(&self) -> impl Iterator<Item = NodeId> {
        self.right.into_iter().chain(self.down)
    }
}

/// Direction that a [`BinTree`] can grow in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Growth {
    Right,
    Down,
}

/// A packed region: every rectangle placed so far plus the free space left
/// between them.
///
/// Trees are produced by [`BinPacker`][crate::BinPacker] and can be handed
/// back to it to place more rectangles without moving any of the existing
/// ones.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBinTree"))]
pub struct BinTree {
    nodes: Vec<BinNode>,
    root: NodeId,
}

impl BinTree {
    pub(crate) fn new(rect: Rect) -> Self {
        Self {
            nodes: vec![BinNode::free(rect)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn root(&self) -> &BinNode {
        &self.nodes[self.root.0]
    }

    /// Looks up a node by ID. IDs are only meaningful for the tree that
    /// handed them out.
    #[inline]
    pub fn node(&self, id: NodeId) -> &BinNode {
        &self.nodes[id.0]
    }

    /// Every node in the tree, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &BinNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn origin(&self) -> (u32, u32) {
        self.root().rect.pos
    }

    /// The bounding size of everything packed into this tree.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.root().rect.size
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.root().rect
    }

    /// All rectangles placed into this tree.
    pub fn occupied(&self) -> impl Iterator<Item = Rect> + '_ {
        self.nodes.iter().filter_map(BinNode::placed)
    }

    /// All regions that are still free to place rectangles into.
    pub fn free_regions(&self) -> impl Iterator<Item = Rect> + '_ {
        self.nodes
            .iter()
            .filter(|node| !node.is_used())
            .map(BinNode::rect)
    }

    fn push(&mut self, node: BinNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Places `item` into the first free node under `start` that is large
    /// enough to hold it. Right-hand regions are searched before regions
    /// below.
    pub(crate) fn try_place<T: Packable + ?Sized>(&mut self, start: NodeId, item: &mut T) -> bool {
        let size = item.size();
        let mut to_visit = vec![start];

        while let Some(id) = to_visit.pop() {
            let node = &self.nodes[id.0];

            if node.is_used() {
                // The stack is LIFO, so `down` goes in first.
                to_visit.extend(node.down);
                to_visit.extend(node.right);
            } else if node.rect.size.0 >= size.0 && node.rect.size.1 >= size.1 {
                let position = node.rect.pos;
                self.occupy(id, size);
                item.set_position(position);

                log::trace!(
                    "Placed {}x{} at {:?} in node {:?}",
                    size.0,
                    size.1,
                    position,
                    id
                );

                return true;
            }
        }

        false
    }

    fn occupy(&mut self, id: NodeId, size: (u32, u32)) {
        let Rect { pos, size: region } = self.nodes[id.0].rect;

        let right = if region.0 == size.0 {
            None
        } else {
            Some(self.push(BinNode::free(Rect::new(
                (pos.0 + size.0, pos.1),
                (region.0 - size.0, size.1),
            ))))
        };

        let down = if region.1 == size.1 {
            None
        } else {
            Some(self.push(BinNode::free(Rect::new(
                (pos.0, pos.1 + size.1),
                (region.0, region.1 - size.1),
            ))))
        };

        let node = &mut self.nodes[id.0];
        node.state = NodeState::Occupied { size };
        node.right = right;
        node.down = down;
    }

    /// Picks the direction that keeps the tree closest to a square when
    /// adding a rectangle of the given size.
    pub(crate) fn square_growth(&self, size: (u32, u32)) -> Growth {
        let (width, height) = self.size();
        let (width, height) = (u64::from(width), u64::from(height));
        let (item_width, item_height) = (u64::from(size.0), u64::from(size.1));

        // Growing in a direction only avoids stretching the other axis too if
        // the tree already covers the item along that axis.
        let can_grow_right = height >= item_height;
        let can_grow_down = width >= item_width;

        let should_grow_right = can_grow_right && height.max(item_height) >= width + item_width;
        let should_grow_down = can_grow_down && width.max(item_width) >= height + item_height;

        match (should_grow_right, should_grow_down) {
            (true, false) => Growth::Right,
            (false, true) => Growth::Down,
            (false, false) if can_grow_right != can_grow_down => {
                if can_grow_right {
                    Growth::Right
                } else {
                    Growth::Down
                }
            }
            _ => {
                let right = Squareness::new(width + item_width, height.max(item_height));
                let down = Squareness::new(height + item_height, width.max(item_width));

                if down <= right {
                    Growth::Down
                } else {
                    Growth::Right
                }
            }
        }
    }

    /// Enlarges the tree along `direction` so that an item of the given size
    /// fits, returning the fresh free node made for it.
    pub(crate) fn grow(&mut self, size: (u32, u32), direction: Growth) -> NodeId {
        let old_root = self.root;
        let Rect {
            pos: (x, y),
            size: (width, height),
        } = self.root().rect;

        let (new_root, slot) = match direction {
            Growth::Down => {
                let new_width = width.max(size.0);

                let upper = if size.0 > width {
                    let beside = self.push(BinNode::free(Rect::new(
                        (x + width, y),
                        (size.0 - width, height),
                    )));

                    self.push(BinNode::split(
                        Rect::new((x, y), (size.0, height)),
                        beside,
                        old_root,
                    ))
                } else {
                    old_root
                };

                let lower = self.push(BinNode::free(Rect::new(
                    (x, y + height),
                    (new_width, size.1),
                )));

                let root = BinNode::split(
                    Rect::new((x, y), (new_width, height + size.1)),
                    upper,
                    lower,
                );

                (root, lower)
            }
            Growth::Right => {
                let new_height = height.max(size.1);

                let left = if size.1 > height {
                    let below = self.push(BinNode::free(Rect::new(
                        (x, y + height),
                        (width, size.1 - height),
                    )));

                    self.push(BinNode::split(
                        Rect::new((x, y), (width, size.1)),
                        old_root,
                        below,
                    ))
                } else {
                    old_root
                };

                let column = self.push(BinNode::free(Rect::new(
                    (x + width, y),
                    (size.0, new_height),
                )));

                let root = BinNode::split(
                    Rect::new((x, y), (width + size.0, new_height)),
                    column,
                    left,
                );

                (root, column)
            }
        };

        self.root = self.push(new_root);

        log::trace!(
            "Grew {:?} from {}x{} to {}x{}",
            direction,
            width,
            height,
            self.size().0,
            self.size().1
        );

        slot
    }

    /// Checks that the tree is well formed: every node is reachable at most
    /// once, children stay inside their parent, and the occupied corner plus
    /// both children cover each used node exactly.
    pub fn validate(&self) -> Result<(), TreeError> {
        let len = self.nodes.len();

        if self.root.0 >= len {
            return Err(TreeError::RootOutOfBounds {
                root: self.root,
                len,
            });
        }

        let mut visited = vec![false; len];
        let mut to_visit = vec![self.root];
        visited[self.root.0] = true;

        while let Some(id) = to_visit.pop() {
            let node = &self.nodes[id.0];

            for child in node.children() {
                if child.0 >= len {
                    return Err(TreeError::ChildOutOfBounds {
                        parent: id,
                        child,
                        len,
                    });
                }

                if visited[child.0] {
                    return Err(TreeError::Revisited { node: child });
                }

                visited[child.0] = true;
                to_visit.push(child);
            }

            self.validate_node(id)?;
        }

        Ok(())
    }

    fn validate_node(&self, id: NodeId) -> Result<(), TreeError> {
        let node = &self.nodes[id.0];

        // Children are measured against this node before they're visited
        // themselves, so check their corners here too.
        if node.rect.checked_max().is_none() {
            return Err(TreeError::OutOfRange { node: id });
        }

        for child in node.children() {
            if self.nodes[child.0].rect.checked_max().is_none() {
                return Err(TreeError::OutOfRange { node: child });
            }
        }

        if node.placed().map_or(false, |placed| placed.checked_max().is_none()) {
            return Err(TreeError::PlacedEscapes { node: id });
        }

        let mut regions = Vec::with_capacity(3);

        match node.state {
            NodeState::Free => {
                if node.right.is_some() || node.down.is_some() {
                    return Err(TreeError::BadSplit {
                        node: id,
                        state: "free",
                    });
                }

                return Ok(());
            }
            NodeState::Occupied { .. } => {
                regions.extend(node.placed());
            }
            NodeState::Split => {
                if node.right.is_none() || node.down.is_none() {
                    return Err(TreeError::BadSplit {
                        node: id,
                        state: "split",
                    });
                }
            }
        }

        regions.extend(node.children().map(|child| self.nodes[child.0].rect));

        for child in node.children() {
            if !node.rect.contains_rect(&self.nodes[child.0].rect) {
                return Err(TreeError::Escapes { parent: id, child });
            }
        }

        if let Some(placed) = node.placed() {
            if !node.rect.contains_rect(&placed) {
                return Err(TreeError::PlacedEscapes { node: id });
            }
        }

        for (index, region) in regions.iter().enumerate() {
            if regions[index + 1..]
                .iter()
                .any(|other| region.intersects(other))
            {
                return Err(TreeError::Overlap { node: id });
            }
        }

        let covered: u64 = regions.iter().map(Rect::area).sum();
        if covered != node.rect.area() {
            return Err(TreeError::Gap { node: id });
        }

        Ok(())
    }
}

/// The longer side of a candidate region divided by its shorter side, kept as
/// a fraction so comparisons are exact.
#[derive(Debug, Clone, Copy)]
struct Squareness {
    long: u64,
    short: u64,
}

impl Squareness {
    fn new(a: u64, b: u64) -> Self {
        Self {
            long: a.max(b),
            short: a.min(b),
        }
    }
}

impl PartialEq for Squareness {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(std::cmp::Ordering::Equal)
    }
}

impl PartialOrd for Squareness {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let lhs = u128::from(self.long) * u128::from(other.short);
        let rhs = u128::from(other.long) * u128::from(self.short);

        Some(lhs.cmp(&rhs))
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawBinTree {
    nodes: Vec<BinNode>,
    root: NodeId,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBinTree> for BinTree {
    type Error = TreeError;

    fn try_from(raw: RawBinTree) -> Result<Self, Self::Error> {
        let tree = BinTree {
            nodes: raw.nodes,
            root: raw.root,
        };

        tree.validate()?;
        Ok(tree)
    }
}
