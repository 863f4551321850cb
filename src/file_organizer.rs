/// Moves the entries of a working directory into taxonomy folders.
///
/// An organizing run has three phases, always executed in this order:
///
/// 1. provision one folder per category plus the two sentinel folders,
/// 2. move every foreign subdirectory into `extra folders/`,
/// 3. move every regular file into the folder of its category.
///
/// Every failure is attached to the entry it happened on and reported through
/// [`MoveOutcome`]; only an unreadable working directory stops a run.
use crate::taxonomy::{EXTRA_FOLDERS, Taxonomy};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Upper bound on `_n` suffixes tried for a single entry.
pub const DEFAULT_MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// The working directory does not exist or is not a directory.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to list the working directory.
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a taxonomy folder.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to check whether a destination is free.
    DestinationCheckFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move an entry to its destination.
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Every candidate name up to the attempt limit was already taken.
    TooManyCollisions { destination: PathBuf, attempts: u32 },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid working directory {}: {}", path.display(), source)
            }
            Self::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DestinationCheckFailed { path, source } => {
                write!(f, "Failed to inspect {}: {}", path.display(), source)
            }
            Self::MoveFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::TooManyCollisions {
                destination,
                attempts,
            } => {
                write!(
                    f,
                    "No free name for {} after {} attempts",
                    destination.display(),
                    attempts
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBasePath { source, .. }
            | Self::ReadDirFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::DestinationCheckFailed { source, .. } => Some(source),
            Self::MoveFailed { source_error, .. } => Some(source_error),
            Self::TooManyCollisions { .. } => None,
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// What kind of directory entry a move concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// A completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub kind: EntryKind,
    /// Name of the entry in the working directory.
    pub original_name: String,
    /// Folder (relative to the working directory) the entry was moved into.
    pub folder: String,
    /// Name of the entry inside `folder`.
    pub final_name: String,
}

impl MoveRecord {
    /// Returns true if the entry had to be renamed to avoid a collision.
    pub fn renamed(&self) -> bool {
        self.original_name != self.final_name
    }
}

/// Result of a single move attempt.
#[derive(Debug)]
pub enum MoveOutcome {
    Moved(MoveRecord),
    Skipped {
        kind: EntryKind,
        name: String,
        folder: String,
        error: OrganizeError,
    },
}

impl MoveOutcome {
    pub fn kind(&self) -> EntryKind {
        match self {
            MoveOutcome::Moved(record) => record.kind,
            MoveOutcome::Skipped { kind, .. } => *kind,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved(_))
    }
}

/// Result of provisioning the taxonomy folders.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    /// Folders that did not exist and were created.
    pub created: Vec<String>,
    /// Folders that were already present.
    pub existing: Vec<String>,
    /// Folders that could not be created.
    pub failures: Vec<OrganizeError>,
}

/// Everything that happened during one organizing run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub provision: ProvisionReport,
    pub folders: Vec<MoveOutcome>,
    pub files: Vec<MoveOutcome>,
}

impl RunReport {
    pub fn folders_moved(&self) -> usize {
        self.folders.iter().filter(|o| o.is_moved()).count()
    }

    pub fn folders_skipped(&self) -> usize {
        self.folders.len() - self.folders_moved()
    }

    pub fn files_moved(&self) -> usize {
        self.files.iter().filter(|o| o.is_moved()).count()
    }

    pub fn files_skipped(&self) -> usize {
        self.files.len() - self.files_moved()
    }
}

/// The phases of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Provision,
    RelocateFolders,
    OrganizeFiles,
}

/// Receives progress while [`Organizer::run_with_observer`] works.
///
/// Every method has an empty default, so implementors only pick the events
/// they care about.
pub trait RunObserver {
    /// Called before a phase begins.
    fn phase_started(&mut self, _phase: Phase) {}

    /// Called once provisioning is done.
    fn folders_provisioned(&mut self, _report: &ProvisionReport) {}

    /// Called right after each folder or file move attempt.
    fn entry_processed(&mut self, _outcome: &MoveOutcome) {}

    /// Called when a moving phase ends, with all of its outcomes.
    fn phase_finished(&mut self, _phase: Phase, _outcomes: &[MoveOutcome]) {}
}

/// Adapts a plain per-outcome closure to [`RunObserver`].
struct OutcomeCallback<F>(F);

impl<F: FnMut(&MoveOutcome)> RunObserver for OutcomeCallback<F> {
    fn entry_processed(&mut self, outcome: &MoveOutcome) {
        (self.0)(outcome)
    }
}

/// A child of the working directory.
#[derive(Debug)]
struct Entry {
    path: PathBuf,
    file_name: OsString,
    kind: EntryKind,
}

impl Entry {
    fn display_name(&self) -> String {
        self.file_name.to_string_lossy().into_owned()
    }
}

/// Organizes one working directory according to a [`Taxonomy`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use tidydir::file_organizer::Organizer;
/// use tidydir::taxonomy::Taxonomy;
///
/// let taxonomy = Taxonomy::builtin().unwrap();
/// let organizer = Organizer::new(Path::new("/home/user/Downloads"), &taxonomy);
/// let report = organizer.run(|_| {}).unwrap();
/// println!("moved {} files", report.files_moved());
/// ```
pub struct Organizer<'a> {
    base_path: PathBuf,
    taxonomy: &'a Taxonomy,
    excluded: Option<PathBuf>,
    max_rename_attempts: u32,
}

impl<'a> Organizer<'a> {
    pub fn new(base_path: &Path, taxonomy: &'a Taxonomy) -> Self {
        Self {
            base_path: base_path.to_path_buf(),
            taxonomy,
            excluded: None,
            max_rename_attempts: DEFAULT_MAX_RENAME_ATTEMPTS,
        }
    }

    /// Leaves the file at `path` in place, typically the running executable.
    pub fn with_excluded(mut self, path: &Path) -> Self {
        self.excluded = Some(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        self
    }

    /// Overrides how many `_n` suffixes are tried before an entry is skipped.
    pub fn with_max_rename_attempts(mut self, attempts: u32) -> Self {
        self.max_rename_attempts = attempts;
        self
    }

    /// Runs all three phases and collects their results.
    ///
    /// `on_outcome` is called after each folder or file move attempt, in the
    /// order the attempts happen.
    ///
    /// # Errors
    ///
    /// Fails only if the working directory is missing or cannot be listed.
    pub fn run<F>(&self, on_outcome: F) -> OrganizeResult<RunReport>
    where
        F: FnMut(&MoveOutcome),
    {
        self.run_with_observer(&mut OutcomeCallback(on_outcome))
    }

    /// Runs all three phases, reporting phase boundaries and every move
    /// attempt to `observer`.
    ///
    /// # Errors
    ///
    /// Fails only if the working directory is missing or cannot be listed.
    pub fn run_with_observer(&self, observer: &mut dyn RunObserver) -> OrganizeResult<RunReport> {
        self.validate_base_path()?;

        observer.phase_started(Phase::Provision);
        let provision = self.provision_folders();
        observer.folders_provisioned(&provision);

        observer.phase_started(Phase::RelocateFolders);
        let folders = self.relocate_foreign_folders(|outcome| observer.entry_processed(outcome))?;
        observer.phase_finished(Phase::RelocateFolders, &folders);

        observer.phase_started(Phase::OrganizeFiles);
        let files = self.organize_files(|outcome| observer.entry_processed(outcome))?;
        observer.phase_finished(Phase::OrganizeFiles, &files);

        Ok(RunReport {
            provision,
            folders,
            files,
        })
    }

    /// Creates every taxonomy folder that is missing.
    ///
    /// A folder that cannot be created is recorded and the remaining folders
    /// are still attempted.
    pub fn provision_folders(&self) -> ProvisionReport {
        let mut report = ProvisionReport::default();

        for name in self.taxonomy.folder_names() {
            let path = self.base_path.join(name);
            match fs::create_dir(&path) {
                Ok(()) => {
                    debug!(folder = name, "created folder");
                    report.created.push(name.to_string());
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {
                    trace!(folder = name, "folder already present");
                    report.existing.push(name.to_string());
                }
                Err(e) => {
                    debug!(folder = name, error = %e, "could not create folder");
                    report
                        .failures
                        .push(OrganizeError::DirectoryCreationFailed { path, source: e });
                }
            }
        }

        report
    }

    /// Moves every subdirectory that is not a taxonomy folder into
    /// `extra folders/`, renaming on collision like files do.
    pub fn relocate_foreign_folders<F>(&self, mut on_outcome: F) -> OrganizeResult<Vec<MoveOutcome>>
    where
        F: FnMut(&MoveOutcome),
    {
        let mut outcomes = Vec::new();

        for entry in self.list_entries()? {
            if entry.kind != EntryKind::Folder {
                continue;
            }
            if entry
                .file_name
                .to_str()
                .is_some_and(|name| self.taxonomy.is_reserved(name))
            {
                continue;
            }

            let outcome = self.move_entry(&entry, EXTRA_FOLDERS);
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Moves every regular file into the folder chosen by the taxonomy.
    pub fn organize_files<F>(&self, mut on_outcome: F) -> OrganizeResult<Vec<MoveOutcome>>
    where
        F: FnMut(&MoveOutcome),
    {
        let mut outcomes = Vec::new();

        for entry in self.list_entries()? {
            if entry.kind != EntryKind::File || self.is_excluded(&entry.path) {
                continue;
            }

            let folder = self.taxonomy.folder_for(Path::new(&entry.file_name));
            let outcome = self.move_entry(&entry, folder);
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Checks that the working directory exists and is a directory.
    pub fn validate_base_path(&self) -> OrganizeResult<()> {
        let metadata =
            fs::metadata(&self.base_path).map_err(|e| OrganizeError::InvalidBasePath {
                path: self.base_path.clone(),
                source: e,
            })?;

        if !metadata.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: self.base_path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        Ok(())
    }

    /// Lists files and folders of the working directory, sorted by name.
    ///
    /// Symlinks are classified by their target; dangling links and special
    /// files are left alone.
    fn list_entries(&self) -> OrganizeResult<Vec<Entry>> {
        let read_dir = fs::read_dir(&self.base_path).map_err(|e| OrganizeError::ReadDirFailed {
            path: self.base_path.clone(),
            source: e,
        })?;

        let mut entries = Vec::new();
        for dir_entry in read_dir.flatten() {
            let path = dir_entry.path();
            let kind = match fs::metadata(&path) {
                Ok(metadata) if metadata.is_dir() => EntryKind::Folder,
                Ok(metadata) if metadata.is_file() => EntryKind::File,
                Ok(_) => continue,
                Err(e) => {
                    debug!(src = %path.display(), error = %e, "ignoring unreadable entry");
                    continue;
                }
            };
            entries.push(Entry {
                path,
                file_name: dir_entry.file_name(),
                kind,
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(excluded) = &self.excluded else {
            return false;
        };
        fs::canonicalize(path)
            .map(|canonical| &canonical == excluded)
            .unwrap_or(false)
    }

    /// Moves one entry into `folder`, picking a free name first.
    fn move_entry(&self, entry: &Entry, folder: &str) -> MoveOutcome {
        let target_dir = self.base_path.join(folder);

        let result =
            unique_destination(&target_dir, &entry.file_name, self.max_rename_attempts).and_then(
                |destination| {
                    fs::rename(&entry.path, &destination).map_err(|e| {
                        OrganizeError::MoveFailed {
                            source: entry.path.clone(),
                            destination: destination.clone(),
                            source_error: e,
                        }
                    })?;
                    Ok(destination)
                },
            );

        match result {
            Ok(destination) => {
                debug!(
                    src = %entry.path.display(),
                    dest = %destination.display(),
                    folder,
                    "moved entry"
                );
                let final_name = destination
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| entry.display_name());
                MoveOutcome::Moved(MoveRecord {
                    kind: entry.kind,
                    original_name: entry.display_name(),
                    folder: folder.to_string(),
                    final_name,
                })
            }
            Err(error) => {
                debug!(src = %entry.path.display(), folder, error = %error, "skipped entry");
                MoveOutcome::Skipped {
                    kind: entry.kind,
                    name: entry.display_name(),
                    folder: folder.to_string(),
                    error,
                }
            }
        }
    }
}

/// Finds a path inside `dir` for an entry called `file_name` that nothing
/// occupies yet.
///
/// The original name is tried first, then `stem_1.ext`, `stem_2.ext`, and so
/// on up to `max_attempts` suffixes.
///
/// # Errors
///
/// Returns `TooManyCollisions` when every candidate is taken, and
/// `DestinationCheckFailed` when a candidate cannot be inspected.
pub fn unique_destination(
    dir: &Path,
    file_name: &OsStr,
    max_attempts: u32,
) -> OrganizeResult<PathBuf> {
    let candidate = dir.join(file_name);
    if is_free(&candidate)? {
        return Ok(candidate);
    }

    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name);
    let extension = name.extension();

    for counter in 1..=max_attempts {
        let mut renamed = stem.to_os_string();
        renamed.push(format!("_{}", counter));
        if let Some(ext) = extension {
            renamed.push(".");
            renamed.push(ext);
        }

        let candidate = dir.join(renamed);
        if is_free(&candidate)? {
            trace!(dest = %candidate.display(), counter, "resolved name collision");
            return Ok(candidate);
        }
    }

    Err(OrganizeError::TooManyCollisions {
        destination: dir.join(file_name),
        attempts: max_attempts,
    })
}

/// `fs::rename` silently replaces files on Unix, so every candidate is
/// checked without following symlinks before it is used.
fn is_free(path: &Path) -> OrganizeResult<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(OrganizeError::DestinationCheckFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
