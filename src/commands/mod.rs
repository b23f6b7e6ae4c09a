mod add;
mod pack;
mod rearrange;
mod remove;

pub use add::*;
pub use pack::*;
pub use rearrange::*;
pub use remove::*;

use std::path::{Path, PathBuf};

use anyhow::Context;
use fs_err as fs;
use spritebin::Packable;

use crate::{
    data::{Layout, LayoutSprite},
    sheet::Sheet,
    sprite::Sprite,
};

/// Loads a sheet back from its layout file, reading every sprite from its
/// recorded source image.
fn load_sheet(layout_path: &Path) -> anyhow::Result<(Sheet, PathBuf)> {
    let layout = Layout::read_from_file(layout_path)?;
    let folder = parent_folder(layout_path);

    let mut free_space = layout.free_space;
    let mut sprites = Vec::with_capacity(layout.sprites.len());

    for recorded in &layout.sprites {
        let mut sprite = Sprite::from_file(folder.join(&recorded.source))
            .with_context(|| format!("Couldn't load sprite {}", recorded.name))?;

        sprite.set_name(&recorded.name);
        sprite.set_position(recorded.offset);

        if sprite.size() != recorded.size {
            log::warn!(
                "Sprite {} changed size from {:?} to {:?}, the sheet will be rearranged",
                recorded.name,
                recorded.size,
                sprite.size()
            );
            free_space = None;
        }

        sprites.push(sprite);
    }

    log::debug!(
        "Loaded {} sprites from {}",
        sprites.len(),
        layout_path.display()
    );

    let mut sheet = Sheet::restore(
        layout.shape,
        layout.auto_arrange,
        layout.size,
        sprites,
        free_space,
    );

    if sheet.auto_arrange() && sheet.free_space().is_none() && !sheet.sprites().is_empty() {
        sheet.rearrange(&[])?;
    }

    Ok((sheet, folder.join(&layout.image)))
}

/// Renders the sheet to `image_path` and writes its layout to `layout_path`.
fn save_sheet(sheet: &Sheet, image_path: &Path, layout_path: &Path) -> anyhow::Result<()> {
    for path in &[image_path, layout_path] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = fs::File::create(image_path)?;
    sheet
        .render()
        .encode_png(file)
        .with_context(|| format!("Couldn't write {}", image_path.display()))?;

    let folder = parent_folder(layout_path);

    let layout = Layout {
        shape: sheet.shape(),
        auto_arrange: sheet.auto_arrange(),
        size: sheet.size(),
        image: relative_to(image_path, &folder),
        sprites: sheet
            .sprites()
            .iter()
            .map(|sprite| LayoutSprite {
                name: sprite.name().to_owned(),
                source: relative_to(sprite.source(), &folder),
                offset: sprite.position(),
                size: sprite.size(),
            })
            .collect(),
        free_space: sheet.free_space().cloned(),
    };

    layout.write_to_file(layout_path)?;

    log::info!(
        "Wrote {}x{} sheet with {} sprites to {}",
        sheet.size().0,
        sheet.size().1,
        sheet.sprites().len(),
        image_path.display()
    );

    Ok(())
}

fn parent_folder(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => PathBuf::from("."),
    }
}

// Paths outside of `folder` are kept as they are.
fn relative_to(path: &Path, folder: &Path) -> PathBuf {
    path.strip_prefix(folder).unwrap_or(path).to_owned()
}
