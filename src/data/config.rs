use std::{
    io,
    path::{Path, PathBuf},
};

use fs_err as fs;
use serde::{Deserialize, Serialize};
use spritebin::BinShape;
use thiserror::Error;

use crate::glob::Glob;

static CONFIG_FILENAME: &str = "spritemap.toml";

/// Describes a sprite sheet to build, contained in a spritemap.toml file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// The name of the sheet. Also used to name the output files when they
    /// aren't given explicitly.
    pub name: String,

    /// The shape the sheet should grow towards.
    #[serde(default)]
    pub shape: BinShape,

    /// Whether sprites should be packed automatically. When disabled, sprites
    /// are spread out once and the free space isn't tracked.
    #[serde(default = "default_auto_arrange")]
    pub auto_arrange: bool,

    /// Where to write the packed image. Defaults to `<name>.png`.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Where to write the layout describing the packed image. Defaults to the
    /// output path with a `.json` extension.
    #[serde(default)]
    pub layout: Option<PathBuf>,

    /// Globs selecting the images that make up the sheet.
    #[serde(default)]
    pub inputs: Vec<InputConfig>,

    /// The path that this config came from. Paths from this config should be
    /// relative to the folder containing this file.
    #[serde(skip)]
    pub file_path: PathBuf,
}

impl Config {
    pub fn read_from_folder_or_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let meta = fs::metadata(path)?;

        if meta.is_file() {
            Self::read_from_file(path)
        } else {
            Self::read_from_folder(path)
        }
    }

    pub fn read_from_folder<P: AsRef<Path>>(folder_path: P) -> Result<Self, ConfigError> {
        let folder_path = folder_path.as_ref();
        let file_path = &folder_path.join(CONFIG_FILENAME);

        Self::read_from_file(file_path)
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read(path)?;

        let mut config: Self = toml::from_slice(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })?;
        config.file_path = path.to_owned();

        Ok(config)
    }

    /// The path that paths in this Config should be considered relative to.
    pub fn folder(&self) -> &Path {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => self.folder().join(output),
            None => self.folder().join(format!("{}.png", self.name)),
        }
    }

    pub fn layout_path(&self) -> PathBuf {
        match &self.layout {
            Some(layout) => self.folder().join(layout),
            None => self.output_path().with_extension("json"),
        }
    }
}

fn default_auto_arrange() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct InputConfig {
    /// A glob, relative to the config's folder, matching images that should
    /// be packed into the sheet.
    pub glob: Glob,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{source} in {}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ConfigError {
    /// Tells whether this ConfigError originated because of a path not
    /// existing.
    pub fn is_not_found(&self) -> bool {
        match self {
            ConfigError::Io { source } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
