use thiserror::Error;

use crate::tree::NodeId;

/// Errors returned by the packing functions for input they can't handle.
///
/// Breaking the packer's own invariants is not represented here; that is a
/// bug and panics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error(
        "Packing these rectangles could produce a region of {width}x{height} at \
         ({x}, {y}), which does not fit in 32-bit coordinates"
    )]
    Overflow { x: u64, y: u64, width: u64, height: u64 },
}

/// Structural problems found while validating a [`BinTree`][crate::BinTree].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Root node {root:?} is out of bounds for a tree of {len} nodes")]
    RootOutOfBounds { root: NodeId, len: usize },

    #[error("Node {parent:?} refers to child {child:?}, but the tree only has {len} nodes")]
    ChildOutOfBounds {
        parent: NodeId,
        child: NodeId,
        len: usize,
    },

    #[error("Node {node:?} is reachable through more than one parent")]
    Revisited { node: NodeId },

    #[error("Node {node:?} reaches past the edge of 32-bit coordinate space")]
    OutOfRange { node: NodeId },

    #[error("Node {child:?} extends outside of its parent {parent:?}")]
    Escapes { parent: NodeId, child: NodeId },

    #[error("The rectangle placed in node {node:?} extends outside of the node")]
    PlacedEscapes { node: NodeId },

    #[error("The regions inside node {node:?} overlap each other")]
    Overlap { node: NodeId },

    #[error("The regions inside node {node:?} don't cover all of its area")]
    Gap { node: NodeId },

    #[error("Node {node:?} has {state} contents but its children are inconsistent with them")]
    BadSplit { node: NodeId, state: &'static str },
}
