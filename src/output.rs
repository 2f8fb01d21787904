//! # Output Configuration
//!
//! Controls how command status lines look on the terminal. Colors are used
//! only when the user and terminal allow it:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colored markers should be used in output.
    pub use_color: bool,
}

/// Kind of status line being printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Info,
    Warn,
    Error,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` forces colors on (overriding `NO_COLOR`), `never` forces
    /// them off, and anything else detects support from the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
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

        console::Term::stdout().features().colors_supported()
    }

    /// Returns the marker printed in front of a status line, e.g. `[OK]`.
    pub fn marker(&self, status: Status) -> String {
        let text = match status {
            Status::Ok => "[OK]",
            Status::Info => "[INFO]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERR]",
        };
        if !self.use_color {
            return text.to_string();
        }
        let styled = match status {
            Status::Ok => style(text).green(),
            Status::Info => style(text).cyan(),
            Status::Warn => style(text).yellow(),
            Status::Error => style(text).red().bold(),
        };
        styled.force_styling(true).to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_always() {
        let config = OutputConfig::from_env_and_flag("always");
        assert!(config.use_color);
    }

    #[test]
    fn test_color_never() {
        let config = OutputConfig::from_env_and_flag("NEVER");
        assert!(!config.use_color);
    }

    #[test]
    fn test_plain_markers() {
        let config = OutputConfig { use_color: false };
        assert_eq!(config.marker(Status::Ok), "[OK]");
        assert_eq!(config.marker(Status::Error), "[ERR]");
    }

    #[test]
    fn test_colored_markers_wrap_text() {
        let config = OutputConfig { use_color: true };
        let marker = config.marker(Status::Warn);
        assert!(marker.contains("[WARN]"));
        assert!(marker.contains('\u{1b}'));
    }
}
