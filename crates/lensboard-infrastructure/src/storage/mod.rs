//! Storage layer for atomic file operations.

mod toml_file;

pub use toml_file::TomlFile;
