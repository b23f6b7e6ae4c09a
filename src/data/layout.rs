use std::{
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use fs_err as fs;
use serde::{Deserialize, Serialize};
use spritebin::{BinShape, BinTree};
use thiserror::Error;

/// Describes a packed sprite sheet: where every sprite ended up and, when the
/// sheet is arranged automatically, the free space left between them.
///
/// Layouts are written next to the packed image and read back by commands
/// that modify an existing sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Layout {
    pub shape: BinShape,
    pub auto_arrange: bool,
    pub size: (u32, u32),

    /// The packed image, relative to the folder containing the layout.
    pub image: PathBuf,

    pub sprites: Vec<LayoutSprite>,

    /// The tree that new sprites should be packed into. Only present for
    /// automatically arranged sheets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_space: Option<BinTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LayoutSprite {
    pub name: String,

    /// The image this sprite was loaded from, relative to the folder
    /// containing the layout.
    pub source: PathBuf,

    pub offset: (u32, u32),
    pub size: (u32, u32),
}

impl Layout {
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let file = BufReader::new(fs::File::open(path)?);

        serde_json::from_reader(file).map_err(|source| LayoutError::Json {
            path: path.to_owned(),
            source,
        })
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LayoutError> {
        let path = path.as_ref();
        let mut file = BufWriter::new(fs::File::create(path)?);

        serde_json::to_writer_pretty(&mut file, self).map_err(|source| LayoutError::Json {
            path: path.to_owned(),
            source,
        })?;
        file.flush()?;

        log::trace!("Saved layout to {}", path.display());

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("{source} in {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
}
