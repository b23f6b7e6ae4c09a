use std::{
    collections::BTreeSet,
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use walkdir::WalkDir;

use crate::{
    data::{Config, InputConfig},
    options::PackOptions,
    sheet::Sheet,
    sprite::Sprite,
};

use super::save_sheet;

pub fn pack(options: PackOptions) -> anyhow::Result<()> {
    let fuzzy_config_path = match options.config_path {
        Some(path) => path,
        None => env::current_dir()?,
    };

    let config = Config::read_from_folder_or_file(&fuzzy_config_path)
        .with_context(|| format!("Couldn't read config from {}", fuzzy_config_path.display()))?;

    let shape = options.shape.unwrap_or(config.shape);
    let auto_arrange = config.auto_arrange && !options.no_auto_arrange;

    let inputs = discover_inputs(&config)?;
    log::info!("Packing {} images for {}", inputs.len(), config.name);

    let sprites = inputs
        .iter()
        .map(|path| Sprite::from_file(path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sheet = Sheet::new(shape, auto_arrange);
    sheet.add_sprites(sprites)?;

    save_sheet(&sheet, &config.output_path(), &config.layout_path())
}

/// Finds every PNG matched by one of the config's input globs, in a stable
/// order.
fn discover_inputs(config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let folder = config.folder();
    let mut found = BTreeSet::new();

    for input in &config.inputs {
        let base_path = folder.join(input.glob.search_root());
        log::trace!(
            "Searching for inputs in {} matching {}",
            base_path.display(),
            input.glob
        );

        for entry in WalkDir::new(&base_path) {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file() || !matches_glob(folder, path, input) {
                continue;
            }

            if !is_png(path) {
                log::warn!("Skipping {}, only PNG images can be packed", path.display());
                continue;
            }

            if !found.insert(path.to_owned()) {
                log::warn!("{} is matched by more than one input", path.display());
            }
        }
    }

    Ok(found.into_iter().collect())
}

fn matches_glob(folder: &Path, path: &Path, input: &InputConfig) -> bool {
    match path.strip_prefix(folder) {
        Ok(relative) => input.glob.is_match(relative),
        Err(_) => false,
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(false, |extension| extension.eq_ignore_ascii_case("png"))
}
