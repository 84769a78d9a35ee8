//! Rotation engine.
//!
//! Each request reads the target's state fresh, files the arrangement being
//! left under its orientation mode, then either replays the arrangement
//! last seen in the requested mode or builds a one-screen command from the
//! current state.

use std::fmt;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::backends::{DisplayTool, ScreenConfig};
use crate::error::{Error, Result};
use crate::inventory::{self, DisplayRecord, DisplayState};
use crate::orientation::{OrientationMode, Rotation};
use crate::shortcuts::{KeyCombination, Request, ShortcutAction, ShortcutBindings};
use crate::store::LayoutStore;

#[derive(Debug)]
pub enum RotationOutcome {
    /// A cached restore command for this mode was replayed.
    Restored(OrientationMode),
    /// A one-screen command was built and applied.
    Synthesized(Rotation),
    Failed(Error),
    NoTarget,
}

impl RotationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RotationOutcome::Restored(_) | RotationOutcome::Synthesized(_)
        )
    }
}

impl fmt::Display for RotationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationOutcome::Restored(mode) => write!(f, "Restored {} layout", mode),
            RotationOutcome::Synthesized(rotation) => write!(f, "Rotated to {}°", rotation),
            RotationOutcome::Failed(e) => write!(f, "Failed: {}", e),
            RotationOutcome::NoTarget => f.write_str("No external display selected"),
        }
    }
}

pub struct Rotator<T> {
    tool: T,
    store: LayoutStore,
    config_path: Option<PathBuf>,
}

impl<T: DisplayTool> Rotator<T> {
    /// `config_path` of `None` keeps everything in memory.
    pub fn new(tool: T, store: LayoutStore, config_path: Option<PathBuf>) -> Self {
        Rotator {
            tool,
            store,
            config_path,
        }
    }

    /// Load the store and, when no target was ever chosen, pick one.
    pub fn open(tool: T, config_path: PathBuf) -> Self {
        let store = LayoutStore::load(&config_path);
        let mut rotator = Rotator::new(tool, store, Some(config_path));
        if rotator.store.target_display_id.is_none() {
            let displays = rotator.list_displays();
            rotator.auto_select_target(&displays);
        }
        rotator
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn list_displays(&mut self) -> Vec<DisplayRecord> {
        inventory::list_displays(&mut self.tool)
    }

    pub fn current_target(&self) -> Option<&str> {
        self.store.target_display_id.as_deref()
    }

    pub fn shortcut_bindings(&self) -> &ShortcutBindings {
        &self.store.shortcuts
    }

    /// Existence is checked when rotating, not here.
    pub fn select_target(&mut self, persistent_id: &str) {
        info!("target display set to {}", persistent_id);
        self.store.target_display_id = Some(persistent_id.to_owned());
        self.persist();
    }

    /// First external display, else the first one listed.
    pub fn auto_select_target(&mut self, displays: &[DisplayRecord]) -> Option<&str> {
        let choice = displays
            .iter()
            .find(|display| display.is_external)
            .or_else(|| displays.first());
        match choice {
            Some(display) => {
                let id = display.persistent_id.clone();
                self.select_target(&id);
            }
            None => warn!("no displays found, target left unset"),
        }
        self.current_target()
    }

    pub fn set_shortcut(&mut self, action: ShortcutAction, combo: Option<KeyCombination>) {
        self.store.shortcuts.set(action, combo);
        self.persist();
    }

    pub fn clear_shortcuts(&mut self) {
        self.store.shortcuts.clear();
        self.persist();
    }

    pub fn handle(&mut self, request: Request) -> RotationOutcome {
        match request {
            Request::Toggle => self.toggle(),
            Request::Rotate(rotation) => self.rotate(rotation),
        }
    }

    /// 0 goes to 90, everything else goes back to 0.
    pub fn toggle(&mut self) -> RotationOutcome {
        let target = match self.store.target_display_id.clone() {
            Some(target) => target,
            None => return RotationOutcome::NoTarget,
        };
        let current = match self.query(&target) {
            Ok((state, _)) => state,
            Err(e) => return RotationOutcome::Failed(e),
        };
        let requested = current.rotation.toggled();
        debug!("toggle: {} -> {}", current.rotation, requested);
        self.rotate(requested)
    }

    pub fn rotate(&mut self, requested: Rotation) -> RotationOutcome {
        let target = match self.store.target_display_id.clone() {
            Some(target) => target,
            None => return RotationOutcome::NoTarget,
        };
        let (current, raw) = match self.query(&target) {
            Ok(found) => found,
            Err(e) => return RotationOutcome::Failed(e),
        };

        let current_mode = current.rotation.mode();
        let target_mode = requested.mode();

        // File the arrangement being left before anything changes.
        match inventory::restore_command(&raw) {
            Some(command) => {
                debug!("captured {} layout: {}", current_mode, command);
                self.store.layouts.set(current_mode, command);
                self.persist();
            }
            None => warn!("listing has no restore command, {} layout not updated", current_mode),
        }

        // Within one mode the cache now holds the current arrangement, which
        // only helps when the degree isn't changing.
        let replayable = current_mode != target_mode || current.rotation == requested;
        let cached = self.store.layouts.get(target_mode).map(str::to_owned);
        if let (true, Some(command)) = (replayable, cached) {
            match self.tool.replay(&command) {
                Ok(output) if !output.is_error() => {
                    info!("restored {} layout on {}", target_mode, target);
                    return RotationOutcome::Restored(target_mode);
                }
                Ok(output) => warn!(
                    "cached {} layout rejected, rebuilding: {}",
                    target_mode,
                    output.diagnostic()
                ),
                Err(e) => warn!("cached {} layout failed, rebuilding: {}", target_mode, e),
            }
        }

        let config = synthesize(&current, requested);
        match self.tool.apply(&config) {
            Ok(output) if !output.is_error() => {
                info!("rotated {} to {}", target, requested);
                RotationOutcome::Synthesized(requested)
            }
            Ok(output) => RotationOutcome::Failed(Error::ToolReportedError(
                output.diagnostic().to_owned(),
            )),
            Err(e) => RotationOutcome::Failed(e),
        }
    }

    /// Fresh state of `target` plus the listing it came from.
    fn query(&mut self, target: &str) -> Result<(DisplayState, String)> {
        let raw = self.tool.list()?;
        let state = inventory::parse_state(&raw, target)
            .ok_or_else(|| Error::DisplayNotFound(target.to_owned()))?;
        Ok((state, raw))
    }

    fn persist(&self) {
        if let Some(path) = &self.config_path {
            self.store.save(path);
        }
    }
}

/// One-screen command reaching `requested` from `current`.
///
/// Width and height trade places when crossing between landscape and
/// portrait; everything else is carried over.
pub fn synthesize(current: &DisplayState, requested: Rotation) -> ScreenConfig {
    let (width, height) = if current.rotation.mode() == requested.mode() {
        (current.resolution_width, current.resolution_height)
    } else {
        (current.resolution_height, current.resolution_width)
    };
    ScreenConfig {
        persistent_id: current.persistent_id.clone(),
        width,
        height,
        refresh_hz: current.refresh_hz,
        color_depth: current.color_depth,
        scaling: current.scaling_enabled,
        rotation: requested,
    }
}
