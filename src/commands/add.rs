use crate::{options::AddOptions, sprite::Sprite};

use super::{load_sheet, save_sheet};

pub fn add(options: AddOptions) -> anyhow::Result<()> {
    let (mut sheet, image_path) = load_sheet(&options.layout)?;

    let mut sprites = options
        .images
        .iter()
        .map(Sprite::from_file)
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Adding {} images to a sheet of {} sprites",
        sprites.len(),
        sheet.sprites().len()
    );

    if sprites.len() == 1 && sheet.auto_arrange() {
        if let Some(sprite) = sprites.pop() {
            sheet.add_sprite(sprite)?;
        }
    } else {
        sheet.add_sprites(sprites)?;
    }

    save_sheet(&sheet, &image_path, &options.layout)
}
