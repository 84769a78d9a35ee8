//! Dummy driver.
//!
//! This is purely for testing or debugging.
//! It keeps its screens in memory, prints listings the way displayplacer
//! does and records every invocation.

use super::{DisplayTool, ScreenConfig, ToolOutput, TOOL_NAME};
use crate::error::{Error, Result};
use crate::orientation::Rotation;

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Clone, Debug, PartialEq)]
pub struct DummyScreen {
    pub persistent_id: String,
    pub kind: String,
    pub width: u32,
    pub height: u32,
    pub refresh_hz: u32,
    pub color_depth: u32,
    pub scaling: bool,
    pub rotation: Rotation,
    pub origin: (i32, i32),
}

impl DummyScreen {
    pub fn external(persistent_id: &str, width: u32, height: u32) -> Self {
        DummyScreen {
            persistent_id: persistent_id.to_owned(),
            kind: "27 inch external screen".to_owned(),
            width,
            height,
            refresh_hz: 60,
            color_depth: 8,
            scaling: false,
            rotation: Rotation::None,
            origin: (0, 0),
        }
    }

    pub fn built_in(persistent_id: &str, width: u32, height: u32) -> Self {
        DummyScreen {
            kind: "MacBook built in screen".to_owned(),
            scaling: true,
            ..DummyScreen::external(persistent_id, width, height)
        }
    }

    fn restore_arg(&self) -> String {
        format!(
            "id:{} res:{}x{} hz:{} color_depth:{} enabled:true scaling:{} origin:({},{}) degree:{}",
            self.persistent_id,
            self.width,
            self.height,
            self.refresh_hz,
            self.color_depth,
            on_off(self.scaling),
            self.origin.0,
            self.origin.1,
            self.rotation.to_degrees(),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Invocation {
    List,
    Apply(ScreenConfig),
    Replay(String),
}

#[derive(Default)]
pub struct DummyTool {
    pub screens: Vec<DummyScreen>,
    pub history: Vec<Invocation>,
    /// Make `list` fail as if the binary could not be spawned.
    pub fail_list: bool,
    pub reject_replay: bool,
    pub reject_apply: bool,
}

impl DummyTool {
    pub fn new(screens: Vec<DummyScreen>) -> Self {
        DummyTool {
            screens,
            ..Default::default()
        }
    }

    pub fn screen(&self, persistent_id: &str) -> Option<&DummyScreen> {
        self.screens
            .iter()
            .find(|screen| screen.persistent_id == persistent_id)
    }

    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (idx, screen) in self.screens.iter().enumerate() {
            out.push_str(&format!(
                "Persistent screen id: {}\n\
                 Contextual screen id: {}\n\
                 Type: {}\n\
                 Resolution: {}x{}\n\
                 Hertz: {}\n\
                 Color Depth: {}\n\
                 Scaling: {}\n\
                 Origin: ({},{})\n\
                 Rotation: {}\n\
                 Enabled: true\n\n",
                screen.persistent_id,
                idx + 1,
                screen.kind,
                screen.width,
                screen.height,
                screen.refresh_hz,
                screen.color_depth,
                on_off(screen.scaling),
                screen.origin.0,
                screen.origin.1,
                screen.rotation.to_degrees(),
            ));
        }
        if !self.screens.is_empty() {
            out.push_str(
                "Execute the command below to set your screens to the current arrangement.\n\n",
            );
            out.push_str(TOOL_NAME);
            for screen in &self.screens {
                out.push_str(&format!(" \"{}\"", screen.restore_arg()));
            }
            out.push('\n');
        }
        out
    }

    pub fn screen_mut(&mut self, persistent_id: &str) -> Option<&mut DummyScreen> {
        self.screens
            .iter_mut()
            .find(|screen| screen.persistent_id == persistent_id)
    }
}

impl DisplayTool for DummyTool {
    fn list(&mut self) -> Result<String> {
        self.history.push(Invocation::List);
        if self.fail_list {
            return Err(Error::ToolInvocationFailed {
                command: format!("{} list", TOOL_NAME),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "dummy list failure"),
            });
        }
        Ok(self.listing())
    }

    fn apply(&mut self, config: &ScreenConfig) -> Result<ToolOutput> {
        self.history.push(Invocation::Apply(config.clone()));
        if self.reject_apply {
            return Ok(rejected("could not apply configuration"));
        }
        match self.screen_mut(&config.persistent_id) {
            Some(screen) => {
                screen.width = config.width;
                screen.height = config.height;
                screen.refresh_hz = config.refresh_hz;
                screen.color_depth = config.color_depth;
                screen.scaling = config.scaling;
                screen.rotation = config.rotation;
                Ok(ToolOutput::ok())
            }
            None => Ok(rejected(&format!(
                "unable to find screen {}",
                config.persistent_id
            ))),
        }
    }

    fn replay(&mut self, command: &str) -> Result<ToolOutput> {
        lazy_static! {
            static ref QUOTED_ARG: Regex = Regex::new(r#""([^"]*)""#).unwrap();
        }

        self.history.push(Invocation::Replay(command.to_owned()));
        if self.reject_replay {
            return Ok(rejected("could not restore configuration"));
        }

        for cap in QUOTED_ARG.captures_iter(command) {
            let fields: Vec<(&str, &str)> = cap[1]
                .split_whitespace()
                .filter_map(|token| token.split_once(':'))
                .collect();
            let id = match fields.iter().find(|(key, _)| *key == "id") {
                Some((_, id)) => *id,
                None => continue,
            };
            let screen = match self.screen_mut(id) {
                Some(screen) => screen,
                None => return Ok(rejected(&format!("unable to find screen {}", id))),
            };
            for (key, value) in &fields {
                match *key {
                    "res" => {
                        if let Some((w, h)) = value.split_once('x') {
                            screen.width = w.parse().unwrap_or(screen.width);
                            screen.height = h.parse().unwrap_or(screen.height);
                        }
                    }
                    "hz" => screen.refresh_hz = value.parse().unwrap_or(screen.refresh_hz),
                    "color_depth" => {
                        screen.color_depth = value.parse().unwrap_or(screen.color_depth)
                    }
                    "scaling" => screen.scaling = *value == "on",
                    "origin" => {
                        if let Some(origin) = parse_origin(value) {
                            screen.origin = origin;
                        }
                    }
                    "degree" => {
                        if let Ok(rotation) = value
                            .parse::<isize>()
                            .map_err(|_| Error::InvalidDegrees(-1))
                            .and_then(Rotation::from_degrees)
                        {
                            screen.rotation = rotation;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(ToolOutput::ok())
    }
}

/// `(x,y)` as displayplacer writes it.
fn parse_origin(value: &str) -> Option<(i32, i32)> {
    let (x, y) = value
        .strip_prefix('(')?
        .strip_suffix(')')?
        .split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn rejected(reason: &str) -> ToolOutput {
    ToolOutput {
        success: true,
        stdout: String::new(),
        stderr: format!("Error: {}", reason),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_ends_with_restore_command() -> Result<()> {
        let mut tool = DummyTool::new(vec![
            DummyScreen::built_in("AAAA-1111", 1512, 982),
            DummyScreen::external("BBBB-2222", 1920, 1080),
        ]);
        let listing = tool.list()?;
        assert_eq!(listing.matches("Persistent screen id:").count(), 2);
        assert_eq!(
            listing.lines().last(),
            Some(
                "displayplacer \"id:AAAA-1111 res:1512x982 hz:60 color_depth:8 enabled:true scaling:on origin:(0,0) degree:0\" \
                 \"id:BBBB-2222 res:1920x1080 hz:60 color_depth:8 enabled:true scaling:off origin:(0,0) degree:0\""
            )
        );
        assert_eq!(tool.history, vec![Invocation::List]);
        Ok(())
    }

    #[test]
    fn replay_updates_named_screens() -> Result<()> {
        let mut tool = DummyTool::new(vec![DummyScreen::external("BBBB-2222", 1920, 1080)]);
        let output = tool.replay("displayplacer \"id:BBBB-2222 res:1080x1920 degree:90\"")?;
        assert!(!output.is_error());
        let screen = tool.screen("BBBB-2222").unwrap();
        assert_eq!((screen.width, screen.height), (1080, 1920));
        assert_eq!(screen.rotation, Rotation::Clockwise90);
        assert_eq!(screen.origin, (0, 0));

        tool.replay("displayplacer \"id:BBBB-2222 origin:(-1080,-420) degree:90\"")?;
        assert_eq!(tool.screen("BBBB-2222").unwrap().origin, (-1080, -420));

        let output = tool.replay("displayplacer \"id:CCCC-3333 degree:90\"")?;
        assert!(output.is_error());
        Ok(())
    }
}
