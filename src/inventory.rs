//! Display inventory.
//!
//! Turns displayplacer's `list` text into records. Every field is matched
//! on its own so one missing or reformatted line only costs that field.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::backends::{DisplayTool, TOOL_NAME};
use crate::orientation::Rotation;

/// Literal displayplacer prints in front of every screen.
pub const SCREEN_DELIMITER: &str = "Persistent screen id:";

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayRecord {
    pub persistent_id: String,
    pub name: String,
    pub is_external: bool,
    pub is_built_in: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub persistent_id: String,
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub refresh_hz: u32,
    pub color_depth: u32,
    pub scaling_enabled: bool,
    pub rotation: Rotation,
}

impl DisplayState {
    /// State for `persistent_id` before any field has been read.
    pub fn with_defaults(persistent_id: &str) -> Self {
        DisplayState {
            persistent_id: persistent_id.to_owned(),
            resolution_width: 1920,
            resolution_height: 1080,
            refresh_hz: 60,
            color_depth: 8,
            scaling_enabled: false,
            rotation: Rotation::None,
        }
    }
}

fn screen_id(chunk: &str) -> Option<&str> {
    lazy_static! {
        static ref PERSISTENT_ID: Regex = Regex::new(r"^\s*([A-Fa-f0-9][A-Fa-f0-9-]*)(?:\s|$)").unwrap();
    }
    PERSISTENT_ID
        .captures(chunk)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// Chunks that start with a persistent id, paired with that id.
fn screens(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split(SCREEN_DELIMITER)
        .filter(|chunk| !chunk.trim().is_empty())
        .filter_map(|chunk| screen_id(chunk).map(|id| (id, chunk)))
}

fn parse_record(id: &str, chunk: &str) -> DisplayRecord {
    lazy_static! {
        static ref TYPE: Regex = Regex::new(r"(?m)^\s*Type:\s*(.+?)\s*$").unwrap();
    }

    let lower = chunk.to_lowercase();
    let is_built_in = lower.contains("built in") || lower.contains("built-in");
    let has_type = lower.contains("type:");
    let is_external = lower.contains("external") || (!is_built_in && has_type);
    let name = TYPE
        .captures(chunk)
        .map(|cap| cap[1].to_owned())
        .unwrap_or_else(|| id.to_owned());

    DisplayRecord {
        persistent_id: id.to_owned(),
        name,
        is_external,
        is_built_in,
    }
}

/// Every screen in a listing, in listing order.
pub fn parse_records(raw: &str) -> Vec<DisplayRecord> {
    screens(raw)
        .map(|(id, chunk)| parse_record(id, chunk))
        .collect()
}

/// Current state of one screen, or `None` when the listing doesn't have it.
pub fn parse_state(raw: &str, persistent_id: &str) -> Option<DisplayState> {
    lazy_static! {
        static ref RESOLUTION: Regex = Regex::new(r"Resolution:\s*(\d+)x(\d+)").unwrap();
        static ref HERTZ: Regex = Regex::new(r"Hertz:\s*(\d+)").unwrap();
        static ref COLOR_DEPTH: Regex = Regex::new(r"Color Depth:\s*(\d+)").unwrap();
        static ref SCALING: Regex = Regex::new(r"Scaling:\s*(on|off)").unwrap();
        static ref ROTATION: Regex = Regex::new(r"Rotation:\s*(\d+)").unwrap();
    }

    let (_, chunk) = screens(raw).find(|(id, _)| *id == persistent_id)?;
    let mut state = DisplayState::with_defaults(persistent_id);

    if let Some(cap) = RESOLUTION.captures(chunk) {
        if let (Ok(w), Ok(h)) = (cap[1].parse(), cap[2].parse()) {
            state.resolution_width = w;
            state.resolution_height = h;
        }
    }
    if let Some(hz) = HERTZ.captures(chunk).and_then(|cap| cap[1].parse().ok()) {
        state.refresh_hz = hz;
    }
    if let Some(depth) = COLOR_DEPTH.captures(chunk).and_then(|cap| cap[1].parse().ok()) {
        state.color_depth = depth;
    }
    if let Some(cap) = SCALING.captures(chunk) {
        state.scaling_enabled = &cap[1] == "on";
    }
    if let Some(rotation) = ROTATION
        .captures(chunk)
        .and_then(|cap| cap[1].parse::<isize>().ok())
        .filter(|degrees| matches!(*degrees, 0 | 90 | 180 | 270))
        .and_then(|degrees| Rotation::from_degrees(degrees).ok())
    {
        state.rotation = rotation;
    }

    debug!("parsed state {:?}", state);
    Some(state)
}

/// The restore command displayplacer prints for the current arrangement.
pub fn restore_command(raw: &str) -> Option<String> {
    raw.lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with(TOOL_NAME))
        .map(str::to_owned)
}

/// Query the tool for attached screens. Tool failures read as no screens.
pub fn list_displays<T: DisplayTool + ?Sized>(tool: &mut T) -> Vec<DisplayRecord> {
    match tool.list() {
        Ok(raw) if !raw.trim().is_empty() => parse_records(&raw),
        Ok(_) => {
            warn!("{} list printed nothing", TOOL_NAME);
            Vec::new()
        }
        Err(e) => {
            warn!("{} list failed: {}", TOOL_NAME, e);
            Vec::new()
        }
    }
}
