//! Command-line interface module for tidydir.
//!
//! This module handles:
//! - Argument parsing (only `--help` and `--version`)
//! - The banner and the yes/no confirmation
//! - Running the three organizing phases with live console feedback

use crate::file_organizer::{
    EntryKind, MoveOutcome, Organizer, Phase, ProvisionReport, RunObserver, RunReport,
};
use crate::output::OutputFormatter;
use crate::taxonomy::{EXTRA_FOLDERS, Taxonomy};
use clap::Parser;
use indicatif::ProgressBar;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Sort the files of the current directory into category folders.
///
/// Run it from inside the directory to tidy. Files are moved by extension
/// into one folder per category, unknown files go to `other/`, and existing
/// subfolders are moved into `extra folders/`.
#[derive(Debug, Parser)]
#[command(name = "tidydir", version, about, long_about = None)]
pub struct Cli {}

/// Prints the title and a short description of what is about to happen.
pub fn print_banner() {
    OutputFormatter::header("Ultimate File Organizer");
    OutputFormatter::plain("=======================");
    OutputFormatter::plain("This tool will organize files and folders in the current directory.");
    OutputFormatter::plain("It will create subfolders and move items accordingly.");
}

/// Asks the operator whether to continue.
///
/// Only a single `y` (any case, surrounding whitespace ignored) counts as
/// yes. End of input counts as no.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<bool> {
    write!(output, "Do you want to continue? (y/n): ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Renders the feedback line for one move attempt.
///
/// ```
/// use tidydir::cli::describe_outcome;
/// use tidydir::file_organizer::{EntryKind, MoveOutcome, MoveRecord};
///
/// let outcome = MoveOutcome::Moved(MoveRecord {
///     kind: EntryKind::File,
///     original_name: "a.txt".to_string(),
///     folder: "documents".to_string(),
///     final_name: "a_1.txt".to_string(),
/// });
/// assert_eq!(describe_outcome(&outcome), "Moved a.txt to documents/ (renamed to a_1.txt)");
/// ```
pub fn describe_outcome(outcome: &MoveOutcome) -> String {
    match outcome {
        MoveOutcome::Moved(record) => {
            let base = match record.kind {
                EntryKind::File => format!("Moved {} to {}/", record.original_name, record.folder),
                EntryKind::Folder => format!(
                    "Moved folder '{}/' to '{}/'",
                    record.original_name, record.folder
                ),
            };
            if record.renamed() {
                let suffix = if record.kind == EntryKind::Folder { "/" } else { "" };
                format!("{} (renamed to {}{})", base, record.final_name, suffix)
            } else {
                base
            }
        }
        MoveOutcome::Skipped {
            kind, name, error, ..
        } => match kind {
            EntryKind::File => format!("Error moving {}: {}", name, error),
            EntryKind::Folder => format!("Error moving folder {}: {}", name, error),
        },
    }
}

fn print_outcome(outcome: &MoveOutcome) {
    let line = describe_outcome(outcome);
    if outcome.is_moved() {
        OutputFormatter::success(&line);
    } else {
        OutputFormatter::error(&line);
    }
}

/// Prints phase headers and one line per move attempt while a run is going.
///
/// During the file phase a spinner ticks on stderr. Lines are printed with
/// the spinner suspended so they reach stdout whether or not it is drawn.
#[derive(Default)]
struct ConsoleReporter {
    spinner: Option<ProgressBar>,
}

impl RunObserver for ConsoleReporter {
    fn phase_started(&mut self, phase: Phase) {
        match phase {
            Phase::Provision => OutputFormatter::info("Creating/verifying subfolders..."),
            Phase::RelocateFolders => OutputFormatter::header(&format!(
                "Moving existing subfolders to '{}'...",
                EXTRA_FOLDERS
            )),
            Phase::OrganizeFiles => {
                OutputFormatter::header("Organizing files...");
                self.spinner = Some(OutputFormatter::create_spinner());
            }
        }
    }

    fn folders_provisioned(&mut self, report: &ProvisionReport) {
        for failure in &report.failures {
            OutputFormatter::error(&failure.to_string());
        }
        if !report.created.is_empty() {
            OutputFormatter::plain(&format!(
                "Created {} new folder(s).",
                report.created.len()
            ));
        }
    }

    fn entry_processed(&mut self, outcome: &MoveOutcome) {
        match &self.spinner {
            Some(pb) => {
                pb.suspend(|| print_outcome(outcome));
                pb.inc(1);
            }
            None => print_outcome(outcome),
        }
    }

    fn phase_finished(&mut self, phase: Phase, outcomes: &[MoveOutcome]) {
        match phase {
            Phase::RelocateFolders if !outcomes.iter().any(MoveOutcome::is_moved) => {
                OutputFormatter::plain("No existing subfolders to move.");
            }
            Phase::OrganizeFiles => {
                if let Some(pb) = self.spinner.take() {
                    pb.finish_and_clear();
                }
                if outcomes.is_empty() {
                    OutputFormatter::plain("No files to organize.");
                }
            }
            _ => {}
        }
    }
}

/// Runs the three organizing phases on `base_path`, printing progress.
///
/// `excluded` names a file to leave alone, normally the running executable.
///
/// # Errors
///
/// Returns a message if the working directory cannot be used at all. Every
/// per-entry failure is printed and counted instead.
pub fn run_organize(
    base_path: &Path,
    taxonomy: &Taxonomy,
    excluded: Option<&Path>,
) -> Result<RunReport, String> {
    let mut organizer = Organizer::new(base_path, taxonomy);
    if let Some(path) = excluded {
        organizer = organizer.with_excluded(path);
    }

    let mut reporter = ConsoleReporter::default();
    let report = organizer
        .run_with_observer(&mut reporter)
        .map_err(|e| e.to_string())?;

    OutputFormatter::summary(
        report.folders_moved(),
        report.folders_skipped(),
        report.files_moved(),
        report.files_skipped(),
    );

    Ok(report)
}

/// Shows the banner, asks for confirmation and organizes `dir_path`.
///
/// A declined confirmation is not an error.
///
/// ```no_run
/// use std::path::Path;
/// use tidydir::cli::run_cli;
///
/// if let Err(e) = run_cli(Path::new("."), None) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(dir_path: &Path, excluded: Option<&Path>) -> Result<(), String> {
    print_banner();

    let confirmed = confirm(io::stdin().lock(), io::stdout())
        .map_err(|e| format!("Could not read confirmation: {}", e))?;
    if !confirmed {
        OutputFormatter::warning("Operation cancelled.");
        return Ok(());
    }

    let taxonomy = Taxonomy::builtin().map_err(|e| e.to_string())?;
    run_organize(dir_path, &taxonomy, excluded).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_organizer::{MoveRecord, OrganizeError};
    use std::io::Cursor;
    use std::path::PathBuf;

    fn answer(input: &str) -> bool {
        let mut prompt = Vec::new();
        let result = confirm(Cursor::new(input), &mut prompt).unwrap();
        assert_eq!(
            String::from_utf8(prompt).unwrap(),
            "Do you want to continue? (y/n): "
        );
        result
    }

    #[test]
    fn test_confirm_accepts_y_in_any_case() {
        assert!(answer("y\n"));
        assert!(answer("Y\n"));
        assert!(answer("  y  \r\n"));
    }

    #[test]
    fn test_confirm_rejects_everything_else() {
        assert!(!answer("n\n"));
        assert!(!answer("yes\n"));
        assert!(!answer("\n"));
        assert!(!answer(""));
    }

    #[test]
    fn test_describe_moved_file() {
        let outcome = MoveOutcome::Moved(MoveRecord {
            kind: EntryKind::File,
            original_name: "report.pdf".to_string(),
            folder: "documents".to_string(),
            final_name: "report.pdf".to_string(),
        });
        assert_eq!(describe_outcome(&outcome), "Moved report.pdf to documents/");
    }

    #[test]
    fn test_describe_moved_folder() {
        let outcome = MoveOutcome::Moved(MoveRecord {
            kind: EntryKind::Folder,
            original_name: "Projects".to_string(),
            folder: EXTRA_FOLDERS.to_string(),
            final_name: "Projects_1".to_string(),
        });
        assert_eq!(
            describe_outcome(&outcome),
            "Moved folder 'Projects/' to 'extra folders/' (renamed to Projects_1/)"
        );
    }

    #[test]
    fn test_describe_skipped_file() {
        let outcome = MoveOutcome::Skipped {
            kind: EntryKind::File,
            name: "locked.txt".to_string(),
            folder: "documents".to_string(),
            error: OrganizeError::MoveFailed {
                source: PathBuf::from("locked.txt"),
                destination: PathBuf::from("documents/locked.txt"),
                source_error: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            },
        };
        assert_eq!(
            describe_outcome(&outcome),
            "Error moving locked.txt: Failed to move locked.txt to documents/locked.txt: denied"
        );
    }
}
