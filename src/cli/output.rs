//! Output formatting and progress indicators
//!
//! Colored status lines for the user and a spinner for long-running
//! external steps. Diagnostic detail goes through `tracing` instead.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

static QUIET: AtomicBool = AtomicBool::new(false);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Output settings derived from global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything except warnings and errors
    pub quiet: bool,
    /// `-v` count
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self { quiet, verbose }
    }

    /// Make this configuration visible to the `print_*` helpers
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        VERBOSITY.store(self.verbose, Ordering::Relaxed);
    }

    /// Tracing filter directive for this verbosity
    pub fn log_directive(self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Whether `--quiet` is active
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Current `-v` count
pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Print an informational line
pub fn print_info(message: &str) {
    if !is_quiet() {
        println!("{} {message}", status::INFO.blue());
    }
}

/// Print a success line
pub fn print_success(message: &str) {
    if !is_quiet() {
        println!("{} {message}", status::SUCCESS.green());
    }
}

/// Print a warning line; shown even with `--quiet`
pub fn print_warning(message: &str) {
    eprintln!("{} {}", status::WARNING.yellow(), message.yellow());
}

/// Print an error line
pub fn print_error(message: &str) {
    eprintln!("{} {}", status::ERROR.red(), message.red());
}

/// Print an indented detail line under the previous status line
pub fn print_detail(message: &str) {
    if !is_quiet() {
        println!("  {message}");
    }
}

/// Print an error and everything that caused it
pub fn display_error(error: &anyhow::Error) {
    print_error(&error.to_string());
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Create a spinner for operations with unknown duration
///
/// Hidden under `--quiet` and when verbose logging would interleave with it.
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet() || verbosity() > 0 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
