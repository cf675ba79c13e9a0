//! Input hygiene for values that reach the filesystem.

pub mod filename;

pub use filename::{FilenameError, secure_filename};
