//! Extension taxonomy used to decide where each file goes.
//!
//! A [`Taxonomy`] is an ordered list of categories, each owning a list of
//! lower-case extensions with a leading dot. Lookups walk the categories in
//! order, so an extension listed under two categories always resolves to the
//! earlier one.
//!
//! The built-in table ships inside the binary as a TOML document:
//!
//! ```toml
//! [[category]]
//! name = "compressed"
//! extensions = [".zip", ".rar"]
//! ```
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//! use tidydir::taxonomy::Taxonomy;
//!
//! let taxonomy = Taxonomy::builtin().unwrap();
//! assert_eq!(taxonomy.folder_for(Path::new("report.pdf")), "documents");
//! assert_eq!(taxonomy.folder_for(Path::new("photo.JPG")), "images");
//! assert_eq!(taxonomy.folder_for(Path::new("notes")), "other");
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Folder that receives files whose extension matches no category.
pub const OTHER_FOLDER: &str = "other";

/// Folder that receives pre-existing subdirectories of the working directory.
pub const EXTRA_FOLDERS: &str = "extra folders";

const BUILTIN_TAXONOMY: &str = include_str!("taxonomy.toml");

/// Errors that can occur while building a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// The TOML document could not be parsed.
    Invalid(String),
    /// A category has an empty name.
    EmptyCategoryName,
    /// Two categories share a name.
    DuplicateCategory(String),
    /// A category uses one of the sentinel folder names.
    ReservedName(String),
    /// A category name cannot be used as a single folder name.
    InvalidCategoryName(String),
    /// An extension is empty or cannot match a file extension.
    InvalidExtension {
        /// The category the extension was listed under.
        category: String,
        /// The offending extension as written.
        extension: String,
    },
}

impl std::fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxonomyError::Invalid(msg) => write!(f, "Invalid taxonomy: {}", msg),
            TaxonomyError::EmptyCategoryName => write!(f, "Category name must not be empty"),
            TaxonomyError::DuplicateCategory(name) => {
                write!(f, "Category '{}' is defined more than once", name)
            }
            TaxonomyError::ReservedName(name) => {
                write!(f, "Category name '{}' is reserved", name)
            }
            TaxonomyError::InvalidCategoryName(name) => {
                write!(f, "Category name '{}' is not a valid folder name", name)
            }
            TaxonomyError::InvalidExtension {
                category,
                extension,
            } => write!(
                f,
                "Invalid extension '{}' in category '{}'",
                extension, category
            ),
        }
    }
}

impl std::error::Error for TaxonomyError {}

/// On-disk shape of a taxonomy document.
#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    #[serde(default)]
    category: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    name: String,
    #[serde(default)]
    extensions: Vec<String>,
}

/// A named category and the extensions routed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: Vec<String>,
}

impl Category {
    /// Creates a category. Extensions are normalized when the category is
    /// added to a [`Taxonomy`].
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// The folder name of this category.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The extensions of this category, lower-case with a leading dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if `extension` (lower-case, with leading dot) belongs here.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}

/// Ordered extension-to-category mapping.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<Category>,
    extension_map: HashMap<String, usize>,
}

impl Taxonomy {
    /// Builds a taxonomy from categories given in priority order.
    ///
    /// Extensions are lower-cased and given a leading dot when it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if a category name is empty, duplicated, reserved or
    /// not a plain folder name, or if an extension cannot match anything.
    pub fn new(categories: Vec<Category>) -> Result<Self, TaxonomyError> {
        let mut normalized: Vec<Category> = Vec::with_capacity(categories.len());
        let mut extension_map = HashMap::new();

        for category in categories {
            validate_name(&category.name)?;
            if normalized.iter().any(|c| c.name == category.name) {
                return Err(TaxonomyError::DuplicateCategory(category.name));
            }

            let mut extensions = Vec::with_capacity(category.extensions.len());
            for raw in &category.extensions {
                let extension = normalize_extension(raw).ok_or_else(|| {
                    TaxonomyError::InvalidExtension {
                        category: category.name.clone(),
                        extension: raw.clone(),
                    }
                })?;
                if !extensions.contains(&extension) {
                    extensions.push(extension);
                }
            }

            let index = normalized.len();
            for extension in &extensions {
                // First category listing an extension keeps it.
                extension_map.entry(extension.clone()).or_insert(index);
            }

            normalized.push(Category {
                name: category.name,
                extensions,
            });
        }

        Ok(Self {
            categories: normalized,
            extension_map,
        })
    }

    /// Parses a taxonomy from a TOML document made of `[[category]]` tables.
    ///
    /// # Errors
    ///
    /// Returns `TaxonomyError::Invalid` on malformed TOML, or any validation
    /// error from [`Taxonomy::new`].
    pub fn from_toml_str(content: &str) -> Result<Self, TaxonomyError> {
        let document: TaxonomyDocument =
            toml::from_str(content).map_err(|e| TaxonomyError::Invalid(e.to_string()))?;

        Self::new(
            document
                .category
                .into_iter()
                .map(|entry| Category::new(entry.name, entry.extensions))
                .collect(),
        )
    }

    /// The taxonomy compiled into the binary.
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_toml_str(BUILTIN_TAXONOMY)
    }

    /// Categories in priority order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Finds the first category listing `extension`.
    ///
    /// The lookup is case-insensitive; a missing leading dot is tolerated.
    ///
    /// ```
    /// use tidydir::taxonomy::Taxonomy;
    ///
    /// let taxonomy = Taxonomy::builtin().unwrap();
    /// assert_eq!(taxonomy.category_for_extension(".ZIP").unwrap().name(), "compressed");
    /// assert!(taxonomy.category_for_extension("").is_none());
    /// ```
    pub fn category_for_extension(&self, extension: &str) -> Option<&Category> {
        let key = normalize_extension(extension)?;
        self.extension_map
            .get(&key)
            .map(|&index| &self.categories[index])
    }

    /// Returns the folder a file belongs in, judged by its file name only.
    pub fn folder_for(&self, path: &Path) -> &str {
        extension_of(path)
            .and_then(|ext| self.category_for_extension(&ext))
            .map(Category::name)
            .unwrap_or(OTHER_FOLDER)
    }

    /// Every folder this taxonomy provisions: the categories in order, then
    /// [`OTHER_FOLDER`] and [`EXTRA_FOLDERS`].
    pub fn folder_names(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(Category::name)
            .chain([OTHER_FOLDER, EXTRA_FOLDERS])
            .collect()
    }

    /// Returns true if `name` is a folder this taxonomy owns.
    pub fn is_reserved(&self, name: &str) -> bool {
        name == OTHER_FOLDER || name == EXTRA_FOLDERS || self.categories.iter().any(|c| c.name == name)
    }
}

/// Lower-cased extension of `path` with a leading dot.
///
/// Follows [`Path::extension`]: `notes` and `.bashrc` have none, `a.tar.gz`
/// yields `.gz`.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() || bare.contains(['.', '/', '\\']) {
        return None;
    }
    Some(format!(".{}", bare.to_lowercase()))
}

fn validate_name(name: &str) -> Result<(), TaxonomyError> {
    if name.trim().is_empty() {
        return Err(TaxonomyError::EmptyCategoryName);
    }
    if name == OTHER_FOLDER || name == EXTRA_FOLDERS {
        return Err(TaxonomyError::ReservedName(name.to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(TaxonomyError::InvalidCategoryName(name.to_string()));
    }
    Ok(())
}
