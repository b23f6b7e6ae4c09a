//! The sprite sheet document: a set of named sprites, the region they're
//! drawn into, and, while sprites are arranged automatically, the free space
//! that new sprites get packed into.

use spritebin::{BinPacker, BinShape, BinTree, PackError, Packable, Rect};

use crate::{
    image::Image,
    sprite::{Sprite, DEFAULT_NAME},
};

#[derive(Debug, Clone)]
pub struct Sheet {
    sprites: Vec<Sprite>,
    shape: BinShape,
    auto_arrange: bool,

    /// Only kept while `auto_arrange` is on.
    bin: Option<BinTree>,

    size: (u32, u32),

    /// How many sprites have been given a default name so far.
    auto_named: u32,
}

impl Sheet {
    pub fn new(shape: BinShape, auto_arrange: bool) -> Self {
        Self {
            sprites: Vec::new(),
            shape,
            auto_arrange,
            bin: None,
            size: (0, 0),
            auto_named: 0,
        }
    }

    /// Rebuilds a sheet that was saved earlier. Sprites keep their names and
    /// positions as given.
    pub fn restore(
        shape: BinShape,
        auto_arrange: bool,
        size: (u32, u32),
        sprites: Vec<Sprite>,
        bin: Option<BinTree>,
    ) -> Self {
        Self {
            sprites,
            shape,
            auto_arrange,
            bin: if auto_arrange { bin } else { None },
            size,
            auto_named: 0,
        }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|sprite| sprite.name() == name)
    }

    pub fn shape(&self) -> BinShape {
        self.shape
    }

    pub fn auto_arrange(&self) -> bool {
        self.auto_arrange
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn free_space(&self) -> Option<&BinTree> {
        self.bin.as_ref()
    }

    /// Adds one sprite. With auto-arrange on it's packed into the free space
    /// left by the other sprites, otherwise it stays where it is.
    pub fn add_sprite(&mut self, mut sprite: Sprite) -> Result<(), PackError> {
        if self.auto_arrange {
            self.prepare_bin()?;
            self.packer().pack_one(&mut self.bin, &mut sprite)?;
            self.cover_bin();
        } else {
            self.cover(sprite.boundary());
        }

        self.push_sprite(sprite);
        Ok(())
    }

    /// Adds a batch of sprites. With auto-arrange on they're packed into the
    /// free space left by the other sprites. Otherwise they're packed among
    /// themselves below everything already on the sheet.
    pub fn add_sprites(&mut self, mut sprites: Vec<Sprite>) -> Result<(), PackError> {
        if sprites.is_empty() {
            return Ok(());
        }

        if self.auto_arrange {
            self.prepare_bin()?;
            self.packer().pack_into(&mut self.bin, &mut sprites)?;
            self.cover_bin();
        } else {
            let origin = (0, self.size.1);
            self.packer().origin(origin).pack(&mut sprites)?;

            for sprite in &sprites {
                self.cover(sprite.boundary());
            }
        }

        log::debug!("Added {} sprites to the sheet", sprites.len());

        for sprite in sprites {
            self.push_sprite(sprite);
        }

        Ok(())
    }

    /// Packs sprites again from scratch.
    ///
    /// With nothing selected every sprite is repacked. With auto-arrange on,
    /// the selected sprites are packed first and the rest around them.
    /// Otherwise only the selected sprites move, packed together where they
    /// were, and the sheet is fitted to its contents.
    ///
    /// If packing fails, every sprite is left where it was.
    pub fn rearrange(&mut self, selected: &[&str]) -> Result<(), PackError> {
        let positions: Vec<(u32, u32)> = self.sprites.iter().map(Sprite::position).collect();

        let result = self.arrange(selected);

        if result.is_err() {
            for (sprite, position) in self.sprites.iter_mut().zip(positions) {
                sprite.set_position(position);
            }
        }

        result
    }

    fn arrange(&mut self, selected: &[&str]) -> Result<(), PackError> {
        let packer = self.packer();

        if selected.is_empty() {
            let tree = packer.pack(&mut self.sprites)?;

            if let Some(tree) = &tree {
                self.size = tree.size();
            }

            self.bin = if self.auto_arrange { tree } else { None };
            return Ok(());
        }

        let (mut chosen, mut rest): (Vec<&mut Sprite>, Vec<&mut Sprite>) = self
            .sprites
            .iter_mut()
            .partition(|sprite| selected.iter().any(|name| *name == sprite.name()));

        log::debug!(
            "Rearranging {} selected sprites around {} others",
            chosen.len(),
            rest.len()
        );

        if self.auto_arrange {
            let mut tree = packer.pack(&mut chosen)?;
            packer.pack_into(&mut tree, &mut rest)?;

            if let Some(tree) = &tree {
                self.size = tree.size();
            }

            self.bin = tree;
        } else {
            let origin = union_boundary(chosen.iter().map(|sprite| &**sprite))
                .map_or((0, 0), |boundary| boundary.pos);

            packer.origin(origin).pack(&mut chosen)?;
            self.fit_to_sprites();
        }

        Ok(())
    }

    /// Changes the shape the sheet grows towards, repacking everything if
    /// sprites are arranged automatically.
    pub fn set_shape(&mut self, shape: BinShape) -> Result<(), PackError> {
        if shape == self.shape {
            return Ok(());
        }

        self.shape = shape;

        if self.auto_arrange {
            self.rearrange(&[])?;
        }

        Ok(())
    }

    pub fn set_auto_arrange(&mut self, auto_arrange: bool) -> Result<(), PackError> {
        if auto_arrange == self.auto_arrange {
            return Ok(());
        }

        self.auto_arrange = auto_arrange;

        if auto_arrange {
            if let Err(err) = self.rearrange(&[]) {
                self.auto_arrange = false;
                return Err(err);
            }
        } else {
            self.bin = None;
        }

        Ok(())
    }

    /// Removes every sprite with one of the given names, returning how many
    /// were removed.
    pub fn remove(&mut self, names: &[&str]) -> Result<usize, PackError> {
        let before = self.sprites.len();
        self.sprites
            .retain(|sprite| !names.iter().any(|name| *name == sprite.name()));

        let removed = before - self.sprites.len();

        if removed > 0 && self.auto_arrange {
            self.rearrange(&[])?;
        }

        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.bin = None;
        self.size = (0, 0);
        self.auto_named = 0;
    }

    /// Moves all sprites so that together they start at the origin, and
    /// shrinks or grows the sheet to fit them exactly.
    ///
    /// While sprites are arranged automatically the sheet always matches the
    /// free space tree instead.
    pub fn fit_to_sprites(&mut self) {
        if let Some(bin) = &self.bin {
            self.size = bin.size();
            return;
        }

        let boundary = match union_boundary(&self.sprites) {
            Some(boundary) => boundary,
            None => return,
        };

        let (dx, dy) = boundary.pos;
        if (dx, dy) != (0, 0) {
            for sprite in &mut self.sprites {
                let (x, y) = sprite.position();
                sprite.set_position((x - dx, y - dy));
            }
        }

        self.size = boundary.size;
    }

    /// Draws every sprite onto one image the size of the sheet.
    pub fn render(&self) -> Image {
        let mut image = Image::new_empty_rgba8(self.size);

        for sprite in &self.sprites {
            image.blit(sprite.image(), sprite.position());
        }

        image
    }

    fn packer(&self) -> BinPacker {
        BinPacker::new().shape(self.shape)
    }

    // Sprites restored without their free space need to be packed again
    // before anything can be added around them.
    fn prepare_bin(&mut self) -> Result<(), PackError> {
        if self.bin.is_none() && !self.sprites.is_empty() {
            log::debug!("No free space recorded, rearranging the sheet");
            self.rearrange(&[])?;
        }

        Ok(())
    }

    fn cover_bin(&mut self) {
        if let Some(bin) = &self.bin {
            let bounds = bin.bounds();
            self.cover(bounds);
        }
    }

    fn cover(&mut self, rect: Rect) {
        let max = (
            rect.pos.0.saturating_add(rect.size.0),
            rect.pos.1.saturating_add(rect.size.1),
        );
        self.size = (self.size.0.max(max.0), self.size.1.max(max.1));
    }

    fn push_sprite(&mut self, mut sprite: Sprite) {
        if sprite.name().is_empty() {
            self.auto_named += 1;
            sprite.set_name(&format!("{} {}", DEFAULT_NAME, self.auto_named));
        }

        while self.sprite(sprite.name()).is_some() {
            sprite.adjust_name();
        }

        log::trace!(
            "Added sprite {} at {:?}",
            sprite.name(),
            sprite.position()
        );

        self.sprites.push(sprite);
    }
}

/// The smallest rectangle containing every given sprite, or `None` if there
/// are no sprites.
pub fn union_boundary<'a, I>(sprites: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Sprite>,
{
    sprites
        .into_iter()
        .map(Sprite::boundary)
        .fold(None, |union: Option<Rect>, boundary| match union {
            Some(union) => Some(union.union(&boundary)),
            None => Some(boundary),
        })
}
