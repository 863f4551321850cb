//! Output formatting and styling module.
//!
//! Every line the operator sees goes through [`OutputFormatter`], so colors
//! and symbols stay consistent across the three organizing phases.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - A spinner for the file phase
/// - The end-of-run summary
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// OutputFormatter::success("Moved report.pdf to documents/");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// OutputFormatter::error("Error moving locked.txt: permission denied");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// OutputFormatter::warning("Operation cancelled.");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// OutputFormatter::info("Creating/verifying subfolders...");
    /// ```
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header preceded by a blank line.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a spinner for the file phase.
    ///
    /// The spinner draws on stderr and stays hidden when stderr is not a
    /// terminal. Print through [`ProgressBar::suspend`] while it is active;
    /// `println` on a hidden bar prints nothing.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// let pb = OutputFormatter::create_spinner();
    /// pb.suspend(|| OutputFormatter::success("Moved a.txt to documents/"));
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {pos} processed {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb
    }

    /// Prints the end-of-run summary.
    ///
    /// The folder-skip line only appears when at least one folder was skipped.
    ///
    /// # Arguments
    ///
    /// * `folders_moved` - Folders moved into `extra folders/`
    /// * `folders_skipped` - Folders left in place because of an error
    /// * `files_moved` - Files moved into a category folder
    /// * `files_skipped` - Files left in place because of an error
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// OutputFormatter::summary(1, 0, 12, 2);
    /// ```
    pub fn summary(
        folders_moved: usize,
        folders_skipped: usize,
        files_moved: usize,
        files_skipped: usize,
    ) {
        println!("\n{}", "Organization complete!".green().bold());
        println!("  - Moved {} folders.", folders_moved.to_string().green());
        println!("  - Moved {} files.", files_moved.to_string().green());

        let skipped = if files_skipped == 0 {
            files_skipped.to_string().normal()
        } else {
            files_skipped.to_string().yellow()
        };
        println!("  - Skipped {} files due to errors.", skipped);

        if folders_skipped > 0 {
            println!(
                "  - Skipped {} folders due to errors.",
                folders_skipped.to_string().yellow()
            );
        }
    }
}
