use std::{
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use fs_err as fs;
use regex::Regex;
use spritebin::{Packable, Rect};
use thiserror::Error;

use crate::image::{Image, ImageError};

/// Name given to sprites that don't have one, followed by a number.
pub const DEFAULT_NAME: &str = "sprite";

const COPY_SUFFIX: &str = " copy";

lazy_static::lazy_static! {
    // Whitespace other than a plain space.
    static ref UNWANTED_WHITESPACE: Regex = Regex::new(r"[^\S ]").unwrap();

    static ref NUMBERED_NAME: Regex =
        Regex::new(&format!(r"^({} |.*{} )[0-9]+$", DEFAULT_NAME, COPY_SUFFIX)).unwrap();

    static ref TRAILING_NUMBER: Regex = Regex::new(r"[0-9]+$").unwrap();
}

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Couldn't decode {}: {source}", path.display())]
    Image { path: PathBuf, source: ImageError },
}

/// A single image placed somewhere on a sheet.
#[derive(Debug, Clone)]
pub struct Sprite {
    name: String,
    source: PathBuf,
    image: Image,
    position: (u32, u32),
}

impl Sprite {
    pub fn new<S: Into<PathBuf>>(name: &str, source: S, image: Image) -> Self {
        Self {
            name: clean_name(name),
            source: source.into(),
            image,
            position: (0, 0),
        }
    }

    /// Loads a PNG from disk, naming the sprite after the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SpriteError> {
        let path = path.as_ref();
        let file = BufReader::new(fs::File::open(path)?);

        let image = Image::decode_png(file).map_err(|source| SpriteError::Image {
            path: path.to_owned(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();

        log::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            image.size().0,
            image.size().1
        );

        Ok(Self::new(&name, path, image))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = clean_name(name);
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn position(&self) -> (u32, u32) {
        self.position
    }

    pub fn boundary(&self) -> Rect {
        Rect::new(self.position, self.image.size())
    }

    /// Changes the name so that it's distinguishable from another sprite with
    /// the same name: `"sprite"` and `"foo copy"` gain a number, numbered
    /// names count up, and everything else becomes `"... copy"`.
    pub fn adjust_name(&mut self) {
        if self.name == DEFAULT_NAME || self.name.ends_with(COPY_SUFFIX) {
            self.name.push_str(" 2");
            return;
        }

        if NUMBERED_NAME.is_match(&self.name) {
            let number_start = TRAILING_NUMBER
                .find(&self.name)
                .map_or(self.name.len(), |found| found.start());

            if let Ok(number) = self.name[number_start..].parse::<u64>() {
                self.name = format!("{}{}", &self.name[..number_start], number + 1);
                return;
            }
        }

        self.name.push_str(COPY_SUFFIX);
    }
}

impl Packable for Sprite {
    fn size(&self) -> (u32, u32) {
        self.image.size()
    }

    fn set_position(&mut self, position: (u32, u32)) {
        self.position = position;
    }
}

fn clean_name(name: &str) -> String {
    UNWANTED_WHITESPACE.replace_all(name, "").trim().to_owned()
}
