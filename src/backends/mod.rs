//! Display configuration backends.
//!
//! A backend is whatever answers `list` and applies configurations. The
//! real one shells out to displayplacer, the dummy one keeps its screens
//! in memory.

use std::fmt;

use crate::error::Result;
use crate::orientation::Rotation;

pub mod displayplacer;
pub mod dummy;

/// Name the tool prints in front of its own restore command.
pub const TOOL_NAME: &str = "displayplacer";

pub trait DisplayTool {
    /// Raw output of the tool's listing command.
    fn list(&mut self) -> Result<String>;

    /// Apply a single-screen configuration.
    fn apply(&mut self, config: &ScreenConfig) -> Result<ToolOutput>;

    /// Re-run a restore command captured from an earlier listing.
    fn replay(&mut self, command: &str) -> Result<ToolOutput>;
}

/// What a finished tool process left behind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn ok() -> Self {
        ToolOutput {
            success: true,
            ..Default::default()
        }
    }

    /// displayplacer does not always set its exit code, so an `Error`
    /// marker on stderr counts as a failure too.
    pub fn is_error(&self) -> bool {
        !self.success || self.stderr.contains("Error")
    }

    pub fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }
}

/// A minimal configuration for one screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenConfig {
    pub persistent_id: String,
    pub width: u32,
    pub height: u32,
    pub refresh_hz: u32,
    pub color_depth: u32,
    pub scaling: bool,
    pub rotation: Rotation,
}

impl ScreenConfig {
    /// The single argument displayplacer takes for one screen.
    pub fn to_arg(&self) -> String {
        format!(
            "id:{} res:{}x{} hz:{} color_depth:{} enabled:true scaling:{} degree:{}",
            self.persistent_id,
            self.width,
            self.height,
            self.refresh_hz,
            self.color_depth,
            if self.scaling { "on" } else { "off" },
            self.rotation.to_degrees(),
        )
    }
}

impl fmt::Display for ScreenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", TOOL_NAME, self.to_arg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_config_arg() {
        let config = ScreenConfig {
            persistent_id: "ABC-123".into(),
            width: 1080,
            height: 1920,
            refresh_hz: 60,
            color_depth: 8,
            scaling: false,
            rotation: Rotation::Clockwise90,
        };
        assert_eq!(
            config.to_arg(),
            "id:ABC-123 res:1080x1920 hz:60 color_depth:8 enabled:true scaling:off degree:90"
        );
        assert_eq!(
            config.to_string(),
            "displayplacer \"id:ABC-123 res:1080x1920 hz:60 color_depth:8 enabled:true scaling:off degree:90\""
        );
    }

    #[test]
    fn error_marker_or_exit_status() {
        assert!(!ToolOutput::ok().is_error());

        let marked = ToolOutput {
            success: true,
            stdout: String::new(),
            stderr: "Error: could not find res:1x1".into(),
        };
        assert!(marked.is_error());
        assert_eq!(marked.diagnostic(), "Error: could not find res:1x1");

        let failed = ToolOutput {
            success: false,
            stdout: "Unable to find screen\n".into(),
            stderr: String::new(),
        };
        assert!(failed.is_error());
        assert_eq!(failed.diagnostic(), "Unable to find screen");
    }
}
