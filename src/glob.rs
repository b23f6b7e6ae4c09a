//! Serializable glob pattern used to select input images from a config file.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use globset::{Glob as InnerGlob, GlobMatcher};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

pub use globset::Error;

/// A compiled glob that remembers the pattern it was built from, so it can be
/// written back out to config files.
#[derive(Debug, Clone)]
pub struct Glob {
    inner: InnerGlob,
    matcher: GlobMatcher,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let inner = InnerGlob::new(pattern)?;
        let matcher = inner.compile_matcher();

        Ok(Glob { inner, matcher })
    }

    pub fn is_match<P: AsRef<Path>>(&self, path: P) -> bool {
        self.matcher.is_match(path)
    }

    /// The leading directories of the pattern that contain no wildcards.
    /// Only this folder needs to be walked to find every match.
    pub fn search_root(&self) -> PathBuf {
        literal_prefix(Path::new(self.inner.glob()))
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Glob {}

impl Serialize for Glob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.inner.glob())
    }
}

impl<'de> Deserialize<'de> for Glob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;

        Glob::new(&pattern).map_err(D::Error::custom)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.inner.glob())
    }
}

// Characters that may start a wildcard in globset's syntax. Escaped forms
// like `[*]` are treated as wildcards too, which only means a few more
// directories get walked.
const WILDCARD_CHARACTERS: &[char] = &['*', '?', '{', '}', '[', ']'];

fn literal_prefix(pattern: &Path) -> PathBuf {
    pattern
        .iter()
        .take_while(|component| {
            component
                .to_str()
                .map_or(false, |component| !component.contains(WILDCARD_CHARACTERS))
        })
        .collect()
}
