//! tidydir - sort a directory into per-category folders
//!
//! This library classifies the files of a single working directory by
//! extension, moves them into one folder per category, parks pre-existing
//! subfolders in `extra folders/`, and resolves name clashes by adding a
//! `_n` counter before the extension.

pub mod cli;
pub mod file_organizer;
pub mod output;
pub mod taxonomy;

pub use file_organizer::{MoveOutcome, OrganizeError, Organizer, RunReport};
pub use taxonomy::{Category, Taxonomy, TaxonomyError};

pub use cli::{Cli, run_cli};
