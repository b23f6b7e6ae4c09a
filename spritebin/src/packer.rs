use std::{cmp::Reverse, iter};

use crate::{
    error::PackError,
    geometry::Rect,
    tree::{BinTree, Growth},
    types::{BinShape, Packable},
};

/// Packs rectangles into a region that grows as needed, aiming for the
/// configured [`BinShape`].
///
/// The packer itself holds no state besides its settings. The [`BinTree`] it
/// returns records the free space that's left, and can be passed back in to
/// place more rectangles without moving the ones that were already placed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinPacker {
    shape: BinShape,
    origin: (u32, u32),
}

impl BinPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(self, shape: BinShape) -> Self {
        Self { shape, ..self }
    }

    /// Where the top-left corner of freshly packed regions should be.
    pub fn origin(self, origin: (u32, u32)) -> Self {
        Self { origin, ..self }
    }

    /// Places every item into a new compact region, writing each item's
    /// position in place.
    ///
    /// Returns `Ok(None)` if there was nothing to pack.
    pub fn pack<T: Packable>(&self, items: &mut [T]) -> Result<Option<BinTree>, PackError> {
        if items.is_empty() {
            log::trace!("Nothing to pack");
            return Ok(None);
        }

        check_bounds(
            self.shape,
            self.origin,
            (0, 0),
            items.iter().map(|item| item.size()),
        )?;

        log::trace!("Packing {} items with shape {}", items.len(), self.shape);

        let order = sorted_order(self.shape, items);
        let mut size = items[order[0]].size();

        match self.shape {
            BinShape::Tall => {
                size.0 = items.iter().map(|item| item.size().0).max().unwrap_or(size.0);
            }
            BinShape::Wide => {
                size.1 = items.iter().map(|item| item.size().1).max().unwrap_or(size.1);
            }
            BinShape::Square => {}
        }

        let mut tree = BinTree::new(Rect::new(self.origin, size));
        self.place_all(&mut tree, items, &order);

        log::trace!(
            "Finished packing {} items into {}x{}",
            items.len(),
            tree.size().0,
            tree.size().1
        );

        Ok(Some(tree))
    }

    /// Places more items around the contents of an existing tree. Rectangles
    /// that were already placed into `tree` keep their positions.
    ///
    /// New items are placed largest first by their longer side, then their
    /// shorter side, whatever the shape.
    ///
    /// If `tree` is `None`, this is the same as [`pack`][BinPacker::pack] and
    /// `tree` receives the result. On error, `tree` is left untouched.
    pub fn pack_into<T: Packable>(
        &self,
        tree: &mut Option<BinTree>,
        items: &mut [T],
    ) -> Result<(), PackError> {
        match tree {
            Some(existing) => {
                check_bounds(
                    self.shape,
                    existing.origin(),
                    existing.size(),
                    items.iter().map(|item| item.size()),
                )?;

                log::trace!(
                    "Packing {} more items into existing {}x{} region",
                    items.len(),
                    existing.size().0,
                    existing.size().1
                );

                let order = sorted_order(BinShape::Square, items);
                self.place_all(existing, items, &order);
            }
            None => *tree = self.pack(items)?,
        }

        Ok(())
    }

    /// Places a single item, either into an existing tree or, if `tree` is
    /// `None`, as the only occupant of a new tree at the configured origin.
    pub fn pack_one<T: Packable + ?Sized>(
        &self,
        tree: &mut Option<BinTree>,
        item: &mut T,
    ) -> Result<(), PackError> {
        match tree {
            Some(existing) => {
                check_bounds(
                    self.shape,
                    existing.origin(),
                    existing.size(),
                    iter::once(item.size()),
                )?;
                self.place(existing, item);
            }
            None => *tree = Some(Self::pack_isolated(item, self.origin)?),
        }

        Ok(())
    }

    /// Wraps a single item in a tree of exactly its own size at `origin`.
    pub fn pack_isolated<T: Packable + ?Sized>(
        item: &mut T,
        origin: (u32, u32),
    ) -> Result<BinTree, PackError> {
        let size = item.size();
        check_bounds(BinShape::Square, origin, (0, 0), iter::once(size))?;

        let mut tree = BinTree::new(Rect::new(origin, size));
        let root = tree.root_id();

        if !tree.try_place(root, item) {
            panic!(
                "Packing invariant violated: a {}x{} item didn't fit into a region of its own size",
                size.0, size.1
            );
        }

        Ok(tree)
    }

    fn place_all<T: Packable>(&self, tree: &mut BinTree, items: &mut [T], order: &[usize]) {
        for &index in order {
            self.place(tree, &mut items[index]);
        }
    }

    fn place<T: Packable + ?Sized>(&self, tree: &mut BinTree, item: &mut T) {
        let root = tree.root_id();
        if tree.try_place(root, item) {
            return;
        }

        let size = item.size();
        let direction = match self.shape {
            BinShape::Tall => Growth::Down,
            BinShape::Wide => Growth::Right,
            BinShape::Square => tree.square_growth(size),
        };

        let slot = tree.grow(size, direction);

        if !tree.try_place(slot, item) {
            panic!(
                "Packing invariant violated: a {}x{} item didn't fit into the region grown for it",
                size.0, size.1
            );
        }

        debug_assert_eq!(tree.validate(), Ok(()));
    }
}

/// Indices of `items`, largest first according to `shape`. The sort is
/// stable, so equal items keep the order they were given in.
fn sorted_order<T: Packable>(shape: BinShape, items: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&index| Reverse(shape.sort_key(items[index].size())));
    order
}

/// Makes sure that packing items of the given sizes next to a region of
/// `existing` size at `origin` can't leave 32-bit coordinate space.
///
/// Growth only ever adds an item's width or height to one axis, and widens
/// the other axis at most to the largest item. `Tall` and `Wide` only grow
/// along one axis, so the other is bounded by the largest item. `Square` may
/// grow along either, so both are bounded by the sum of all sizes, which can
/// reject some inputs that would have fit.
fn check_bounds<I>(
    shape: BinShape,
    origin: (u32, u32),
    existing: (u32, u32),
    sizes: I,
) -> Result<(), PackError>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let existing = (u64::from(existing.0), u64::from(existing.1));

    let (sum, max) = sizes.into_iter().fold(
        (existing, existing),
        |(sum, max), (item_width, item_height)| {
            let (item_width, item_height) = (u64::from(item_width), u64::from(item_height));

            (
                (sum.0 + item_width, sum.1 + item_height),
                (max.0.max(item_width), max.1.max(item_height)),
            )
        },
    );

    let (width, height) = match shape {
        BinShape::Tall => (max.0, sum.1),
        BinShape::Wide => (sum.0, max.1),
        BinShape::Square => sum,
    };

    let (x, y) = (u64::from(origin.0), u64::from(origin.1));
    let limit = u64::from(u32::MAX);

    if x + width > limit || y + height > limit {
        return Err(PackError::Overflow {
            x,
            y,
            width,
            height,
        });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{tree::NodeState, types::Item};

    fn items(sizes: &[(u32, u32)]) -> Vec<Item> {
        sizes.iter().copied().map(Item::new).collect()
    }

    fn positions(items: &[Item]) -> Vec<(u32, u32)> {
        items.iter().map(|item| item.position).collect()
    }

    fn describe(tree: &BinTree, items: &[Item]) -> String {
        let mut lines = vec![format!("size: {}x{}", tree.size().0, tree.size().1)];

        for (index, item) in items.iter().enumerate() {
            lines.push(format!(
                "{}: {}x{} at ({}, {})",
                index, item.size.0, item.size.1, item.position.0, item.position.1
            ));
        }

        lines.join("\n")
    }

    /// Checks everything that must hold for any set of items packed into the
    /// same tree.
    fn assert_well_packed(tree: &BinTree, items: &[Item]) {
        tree.validate().unwrap();

        let bounds = tree.bounds();
        for (index, item) in items.iter().enumerate() {
            let rect = Rect::new(item.position, item.size);

            assert!(
                bounds.contains_rect(&rect),
                "item {} ({:?}) escapes {:?}",
                index,
                rect,
                bounds
            );

            for (other_index, other) in items.iter().enumerate().skip(index + 1) {
                let other_rect = Rect::new(other.position, other.size);

                assert!(
                    !rect.intersects(&other_rect),
                    "item {} ({:?}) overlaps item {} ({:?})",
                    index,
                    rect,
                    other_index,
                    other_rect
                );
            }
        }
    }

    /// Small deterministic generator so the sweeps below don't need another
    /// dependency.
    struct Lcg(u64);

    impl Lcg {
        fn next_u32(&mut self) -> u32 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 33) as u32
        }

        fn below(&mut self, limit: u32) -> u32 {
            self.next_u32() % limit
        }

        fn sizes(&mut self, count: usize) -> Vec<(u32, u32)> {
            (0..count)
                .map(|_| (self.below(64) + 1, self.below(64) + 1))
                .collect()
        }
    }

    const SHAPES: &[BinShape] = &[BinShape::Square, BinShape::Tall, BinShape::Wide];

    #[test]
    fn empty_input() {
        let packer = BinPacker::new();
        let mut nothing: Vec<Item> = Vec::new();

        assert_eq!(packer.pack(&mut nothing), Ok(None));

        let mut tree = None;
        packer.pack_into(&mut tree, &mut nothing).unwrap();
        assert_eq!(tree, None);
    }

    #[test]
    fn empty_input_keeps_existing_tree() {
        let packer = BinPacker::new();
        let mut tree = packer.pack(&mut items(&[(10, 10)])).unwrap();
        let before = tree.clone();

        packer.pack_into(&mut tree, &mut Vec::<Item>::new()).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn wide_piece_and_two_squares() {
        let mut input = items(&[(100, 50), (50, 50), (50, 50)]);
        let tree = BinPacker::new().pack(&mut input).unwrap().unwrap();

        assert_well_packed(&tree, &input);
        insta::assert_snapshot!(describe(&tree, &input), @r###"
        size: 100x100
        0: 100x50 at (0, 0)
        1: 50x50 at (0, 50)
        2: 50x50 at (50, 50)
        "###);
    }

    #[test]
    fn largest_is_placed_first() {
        let mut input = items(&[(20, 20), (30, 20), (40, 40)]);
        let tree = BinPacker::new().pack(&mut input).unwrap().unwrap();

        assert_well_packed(&tree, &input);
        assert_eq!(tree.size(), (60, 60));
        assert_eq!(positions(&input), vec![(40, 0), (0, 40), (0, 0)]);
    }

    #[test]
    fn equal_ratios_grow_down() {
        let mut input = items(&[(10, 10), (10, 10)]);
        let tree = BinPacker::new().pack(&mut input).unwrap().unwrap();

        assert_eq!(tree.size(), (10, 20));
        assert_eq!(positions(&input), vec![(0, 0), (0, 10)]);
    }

    #[test]
    fn equal_items_keep_input_order() {
        let mut input = items(&[(8, 8), (8, 8), (8, 8), (8, 8)]);
        BinPacker::new().pack(&mut input).unwrap();

        assert_eq!(input[0].position, (0, 0));
        assert_eq!(input[1].position, (0, 8));
    }

    #[test]
    fn tall_stacks_downwards() {
        let mut input = items(&[(30, 10), (20, 40), (10, 10), (25, 5)]);
        let tree = BinPacker::new()
            .shape(BinShape::Tall)
            .pack(&mut input)
            .unwrap()
            .unwrap();

        assert_well_packed(&tree, &input);
        assert_eq!(tree.size(), (30, 55));
        assert_eq!(
            positions(&input),
            vec![(0, 0), (0, 15), (20, 15), (0, 10)]
        );
    }

    #[test]
    fn wide_stacks_rightwards() {
        let mut input = items(&[(10, 30), (40, 5), (20, 30), (5, 5)]);
        let tree = BinPacker::new()
            .shape(BinShape::Wide)
            .pack(&mut input)
            .unwrap()
            .unwrap();

        assert_well_packed(&tree, &input);
        assert_eq!(tree.size(), (70, 30));
        assert_eq!(
            positions(&input),
            vec![(20, 0), (30, 0), (0, 0), (30, 5)]
        );
    }

    #[test]
    fn strips_never_grow_across() {
        let mut rng = Lcg(7);

        for _ in 0..50 {
            let count = rng.below(30) as usize + 1;
            let sizes = rng.sizes(count);
            let max_width = sizes.iter().map(|size| size.0).max().unwrap();
            let max_height = sizes.iter().map(|size| size.1).max().unwrap();

            let mut input = items(&sizes);
            let tree = BinPacker::new()
                .shape(BinShape::Tall)
                .pack(&mut input)
                .unwrap()
                .unwrap();
            assert_eq!(tree.size().0, max_width);

            let mut input = items(&sizes);
            let tree = BinPacker::new()
                .shape(BinShape::Wide)
                .pack(&mut input)
                .unwrap()
                .unwrap();
            assert_eq!(tree.size().1, max_height);
        }
    }

    #[test]
    fn random_batches_are_well_packed() {
        let mut rng = Lcg(0x5eed);

        for round in 0..60 {
            let shape = SHAPES[round % SHAPES.len()];
            let count = rng.below(40) as usize + 1;
            let mut input = items(&rng.sizes(count));

            let tree = BinPacker::new()
                .shape(shape)
                .pack(&mut input)
                .unwrap()
                .unwrap();

            assert_well_packed(&tree, &input);
            assert_eq!(tree.occupied().count(), input.len());
        }
    }

    #[test]
    fn packing_is_deterministic() {
        let mut rng = Lcg(42);
        let sizes = rng.sizes(25);

        for &shape in SHAPES {
            let packer = BinPacker::new().shape(shape);

            let mut first = items(&sizes);
            let mut second = items(&sizes);
            let first_tree = packer.pack(&mut first).unwrap();
            let second_tree = packer.pack(&mut second).unwrap();

            assert_eq!(first, second);
            assert_eq!(first_tree, second_tree);
        }
    }

    #[test]
    fn incremental_matches_batch() {
        let sizes = [(40, 40), (30, 20), (20, 20)];
        let packer = BinPacker::new();

        let mut batch = items(&sizes);
        let batch_tree = packer.pack(&mut batch).unwrap();

        let mut incremental = items(&sizes);
        let mut tree = None;
        for item in &mut incremental {
            packer.pack_one(&mut tree, item).unwrap();
        }

        assert_eq!(incremental, batch);
        assert_eq!(tree, batch_tree);

        let mut in_slices = items(&sizes);
        let mut tree = None;
        for chunk in in_slices.chunks_mut(1) {
            packer.pack_into(&mut tree, chunk).unwrap();
        }

        assert_eq!(in_slices, batch);
        assert_eq!(tree.unwrap().size(), (60, 60));
    }

    #[test]
    fn incremental_reuses_free_space() {
        let packer = BinPacker::new().shape(BinShape::Tall);
        let mut placed = items(&[(100, 50), (60, 50)]);
        let mut tree = packer.pack(&mut placed).unwrap();
        assert_eq!(tree.as_ref().unwrap().size(), (100, 100));

        let mut item = Item::new((30, 30));
        packer.pack_one(&mut tree, &mut item).unwrap();

        assert_eq!(item.position, (60, 50));
        assert_eq!(tree.as_ref().unwrap().size(), (100, 100));
        assert_eq!(positions(&placed), vec![(0, 0), (0, 50)]);
    }

    #[test]
    fn incremental_never_moves_placed_items() {
        let mut rng = Lcg(99);

        for round in 0..30 {
            let shape = SHAPES[round % SHAPES.len()];
            let packer = BinPacker::new().shape(shape);

            let mut all = items(&rng.sizes(30));
            let mut tree = None;
            let mut snapshots = Vec::new();

            let mut start = 0;
            while start < all.len() {
                let end = (start + rng.below(6) as usize + 1).min(all.len());
                packer.pack_into(&mut tree, &mut all[start..end]).unwrap();

                snapshots.push(positions(&all[..end]));
                start = end;
            }

            let finished = positions(&all);
            for snapshot in &snapshots {
                assert_eq!(&finished[..snapshot.len()], &snapshot[..]);
            }

            assert_well_packed(tree.as_ref().unwrap(), &all);
        }
    }

    #[test]
    fn tall_tree_widens_for_wider_item() {
        let packer = BinPacker::new().shape(BinShape::Tall);
        let mut tree = None;

        let mut first = Item::new((10, 10));
        packer.pack_one(&mut tree, &mut first).unwrap();

        let mut wide = Item::new((20, 5));
        packer.pack_one(&mut tree, &mut wide).unwrap();
        assert_eq!(wide.position, (0, 10));
        assert_eq!(tree.as_ref().unwrap().size(), (20, 15));

        let mut filler = Item::new((10, 10));
        packer.pack_one(&mut tree, &mut filler).unwrap();
        assert_eq!(filler.position, (10, 0));
        assert_eq!(tree.as_ref().unwrap().size(), (20, 15));

        assert_well_packed(tree.as_ref().unwrap(), &[first, wide, filler]);
    }

    #[test]
    fn wide_tree_raises_for_taller_item() {
        let packer = BinPacker::new().shape(BinShape::Wide);
        let mut tree = None;

        let mut first = Item::new((10, 10));
        packer.pack_one(&mut tree, &mut first).unwrap();

        let mut tall = Item::new((5, 20));
        packer.pack_one(&mut tree, &mut tall).unwrap();
        assert_eq!(tall.position, (10, 0));
        assert_eq!(tree.as_ref().unwrap().size(), (15, 20));

        let mut filler = Item::new((10, 10));
        packer.pack_one(&mut tree, &mut filler).unwrap();
        assert_eq!(filler.position, (0, 10));
        assert_eq!(tree.as_ref().unwrap().size(), (15, 20));

        assert_well_packed(tree.as_ref().unwrap(), &[first, tall, filler]);
    }

    #[test]
    fn offset_origin() {
        let mut input = items(&[(100, 50), (50, 50), (50, 50)]);
        let tree = BinPacker::new()
            .origin((7, 3))
            .pack(&mut input)
            .unwrap()
            .unwrap();

        assert_eq!(tree.bounds(), Rect::new((7, 3), (100, 100)));
        assert_eq!(positions(&input), vec![(7, 3), (7, 53), (57, 53)]);
        assert_well_packed(&tree, &input);
    }

    #[test]
    fn isolated_item() {
        let mut item = Item::new((12, 5));
        let tree = BinPacker::pack_isolated(&mut item, (40, 2)).unwrap();

        assert_eq!(item.position, (40, 2));
        assert_eq!(tree.bounds(), Rect::new((40, 2), (12, 5)));
        assert_eq!(tree.root().state(), NodeState::Occupied { size: (12, 5) });
        assert_eq!(tree.free_regions().count(), 0);
    }

    #[test]
    fn zero_sized_items() {
        let mut input = items(&[(0, 0), (5, 5), (0, 3)]);
        let tree = BinPacker::new().pack(&mut input).unwrap().unwrap();

        assert_well_packed(&tree, &input);
        assert_eq!(tree.size(), (5, 5));
        assert_eq!(positions(&input), vec![(5, 3), (0, 0), (5, 0)]);
    }

    #[test]
    fn overflow_is_rejected_up_front() {
        let packer = BinPacker::new();

        let mut input = items(&[(u32::MAX, 1), (1, 1)]);
        assert!(matches!(
            packer.pack(&mut input),
            Err(PackError::Overflow { .. })
        ));
        assert_eq!(positions(&input), vec![(0, 0), (0, 0)]);

        let mut tree = packer.pack(&mut items(&[(10, 10)])).unwrap();
        let before = tree.clone();

        let mut huge = Item::new((u32::MAX - 5, 1));
        assert!(packer.pack_one(&mut tree, &mut huge).is_err());
        assert_eq!(tree, before);

        let mut corner = Item::new((2, 2));
        assert!(BinPacker::pack_isolated(&mut corner, (u32::MAX - 1, 0)).is_err());
    }

    #[test]
    fn strips_only_bound_the_growing_axis() {
        let half = u32::MAX / 2 + 1;

        let mut input = items(&[(half, 1), (half, 1)]);
        let tree = BinPacker::new()
            .shape(BinShape::Tall)
            .pack(&mut input)
            .unwrap()
            .unwrap();
        assert_eq!(tree.size(), (half, 2));
        assert_eq!(positions(&input), vec![(0, 0), (0, 1)]);

        let mut input = items(&[(1, half), (1, half)]);
        let tree = BinPacker::new()
            .shape(BinShape::Wide)
            .pack(&mut input)
            .unwrap()
            .unwrap();
        assert_eq!(tree.size(), (2, half));

        let mut input = items(&[(1, half), (1, half)]);
        assert!(matches!(
            BinPacker::new().shape(BinShape::Tall).pack(&mut input),
            Err(PackError::Overflow { .. })
        ));
    }

    #[test]
    fn incremental_sorts_by_longer_side() {
        let packer = BinPacker::new().shape(BinShape::Tall);
        let mut tree = packer.pack(&mut items(&[(20, 10)])).unwrap();

        // By width alone the 20x5 strip would go first.
        let mut more = items(&[(20, 5), (10, 30)]);
        packer.pack_into(&mut tree, &mut more).unwrap();

        assert_eq!(positions(&more), vec![(0, 40), (0, 10)]);
        assert_eq!(tree.as_ref().unwrap().size(), (20, 45));
        assert_well_packed(tree.as_ref().unwrap(), &more);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialized_trees_are_validated() {
        let mut input = items(&[(40, 40), (30, 20), (20, 20)]);
        let tree = BinPacker::new().pack(&mut input).unwrap().unwrap();

        let encoded = serde_json::to_string(&tree).unwrap();
        let decoded: BinTree = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, tree);

        let mut value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        value["root"] = serde_json::json!(1000);
        assert!(serde_json::from_value::<BinTree>(value).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialized_trees_near_the_coordinate_limit_are_rejected() {
        let mut item = Item::new((10, 10));
        let tree = BinPacker::pack_isolated(&mut item, (0, 0)).unwrap();

        let mut value = serde_json::to_value(&tree).unwrap();
        value["nodes"][0]["rect"]["pos"] = serde_json::json!([u32::MAX - 5, 0]);

        let err = serde_json::from_value::<BinTree>(value).unwrap_err();
        assert!(err.to_string().contains("32-bit"));
    }
}
