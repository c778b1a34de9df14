//! Directory listing entries.

use serde::{Deserialize, Serialize};

/// Coarse classification used by the front-end to pick an icon or preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCategory {
    /// A directory.
    Folder,
    /// A file whose MIME type is `image/*`.
    Image,
    /// A file whose MIME type is `video/*`.
    Video,
    /// Anything else.
    File,
}

impl EntryCategory {
    /// Classify an entry from its directory flag and guessed MIME type.
    pub fn classify(is_dir: bool, mime: Option<&str>) -> Self {
        if is_dir {
            return Self::Folder;
        }
        match mime {
            Some(m) if m.starts_with("image/") => Self::Image,
            Some(m) if m.starts_with("video/") => Self::Video,
            _ => Self::File,
        }
    }

    /// Whether a thumbnail can be rendered for this category.
    pub fn has_preview(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// One immediate child of a listed directory.
///
/// Produced fresh per listing request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// File name.
    pub name: String,
    /// Root-relative path, forward-slash separated.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Size in bytes.
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: f64,
    /// Guessed MIME type, if any.
    pub mime: Option<String>,
    /// Category tag.
    #[serde(rename = "type")]
    pub category: EntryCategory,
}
