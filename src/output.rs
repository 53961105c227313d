//! # Output Configuration
//!
//! Controls CLI output appearance. Color support respects the usual
//! environment matrix:
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Progress narration goes through [`Progress`], a sink the strategies
//! print through. It is fully silenced by the request's quiet flag, which
//! keeps the printing policy out of the protocol code.

use std::env;

/// Output configuration for controlling colored output.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // Check NO_COLOR first (https://no-color.org/)
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        // Use console crate's detection for TTY and color support
        console::Term::stderr().features().colors_supported()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: Self::detect_color_support(),
        }
    }
}

/// Progress sink for a single download.
#[derive(Debug, Clone)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn new(quiet: bool) -> Self {
        Self { enabled: !quiet }
    }

    /// Print one progress line, unless quiet.
    pub fn say(&self, line: impl AsRef<str>) {
        if self.enabled {
            println!("{}", line.as_ref());
        }
    }
}
