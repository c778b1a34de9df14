//! Core type definitions used across the RapydShare workspace.

pub mod entry;

pub use entry::{DirectoryEntry, EntryCategory};
