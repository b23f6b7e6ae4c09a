use anyhow::bail;

use crate::options::RemoveOptions;

use super::{load_sheet, save_sheet};

pub fn remove(options: RemoveOptions) -> anyhow::Result<()> {
    let (mut sheet, image_path) = load_sheet(&options.layout)?;

    let names: Vec<&str> = options.names.iter().map(String::as_str).collect();
    let removed = sheet.remove(&names)?;

    if removed == 0 {
        bail!("None of the given sprites are in {}", options.layout.display());
    }

    if !sheet.auto_arrange() {
        sheet.fit_to_sprites();
    }

    log::info!("Removed {} sprites", removed);

    save_sheet(&sheet, &image_path, &options.layout)
}
