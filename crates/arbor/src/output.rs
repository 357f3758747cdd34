//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Listings go to stdout, status messages to stderr.
pub(crate) struct Output {
    out: Term,
    err: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print a listing line to stdout.
    pub(crate) fn line(&self, msg: &str) {
        let _ = self.out.write_line(msg);
    }

    /// Print a dimmed listing line to stdout.
    pub(crate) fn dim_line(&self, msg: &str) {
        let _ = self.out.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.err.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.err.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted heading (cyan bold) to stdout.
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .out
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }
}
