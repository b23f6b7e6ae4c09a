use crate::options::RearrangeOptions;

use super::{load_sheet, save_sheet};

pub fn rearrange(options: RearrangeOptions) -> anyhow::Result<()> {
    let (mut sheet, image_path) = load_sheet(&options.layout)?;

    if let Some(shape) = options.shape {
        log::info!("Changing shape from {} to {}", sheet.shape(), shape);
        sheet.set_shape(shape)?;
    }

    if let Some(auto_arrange) = options.auto_arrange {
        sheet.set_auto_arrange(auto_arrange)?;
    }

    let selected: Vec<&str> = options.selected.iter().map(String::as_str).collect();

    for name in &selected {
        if sheet.sprite(name).is_none() {
            log::warn!("No sprite named {} in {}", name, options.layout.display());
        }
    }

    sheet.rearrange(&selected)?;

    save_sheet(&sheet, &image_path, &options.layout)
}
