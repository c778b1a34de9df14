//! MIME detection from file extensions.

use std::path::Path;

use rapyd_core::types::EntryCategory;

/// Guess a MIME type from the path's extension.
pub fn mime_from_path(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Category of a regular file, derived from its extension.
pub fn file_category(path: &Path) -> EntryCategory {
    EntryCategory::classify(false, mime_from_path(path).as_deref())
}
