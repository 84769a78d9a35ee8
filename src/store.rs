//! Persisted state: the target display, shortcut bindings and the last
//! restore command seen in each orientation mode.
//!
//! Reading never fails; a missing or corrupt file is an empty store.
//! Writing merges into whatever is on disk so keys this crate does not own
//! survive, then swaps the new file into place in one rename.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::orientation::OrientationMode;
use crate::shortcuts::ShortcutBindings;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Layouts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landscape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
}

impl Layouts {
    pub fn get(&self, mode: OrientationMode) -> Option<&str> {
        match mode {
            OrientationMode::Landscape => self.landscape.as_deref(),
            OrientationMode::Portrait => self.portrait.as_deref(),
        }
    }

    /// Replace whatever was cached for `mode`.
    pub fn set(&mut self, mode: OrientationMode, command: String) {
        match mode {
            OrientationMode::Landscape => self.landscape = Some(command),
            OrientationMode::Portrait => self.portrait = Some(command),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutStore {
    #[serde(default)]
    pub target_display_id: Option<String>,
    #[serde(default)]
    pub shortcuts: ShortcutBindings,
    #[serde(default)]
    pub layouts: Layouts,
}

impl LayoutStore {
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no config at {}, starting empty", path.display());
                return LayoutStore::default();
            }
            Err(e) => {
                warn!("could not read {}: {}", path.display(), e);
                return LayoutStore::default();
            }
        };
        let mut store: LayoutStore = match serde_json::from_str(&raw) {
            Ok(store) => store,
            Err(e) => {
                warn!("ignoring malformed config {}: {}", path.display(), e);
                return LayoutStore::default();
            }
        };
        store.adopt_top_level_layouts(&raw);
        store
    }

    /// Older files keep restore commands under top-level `landscape` and
    /// `portrait` keys. They fill any mode `layouts` has nothing for.
    fn adopt_top_level_layouts(&mut self, raw: &str) {
        let doc = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(doc)) => doc,
            _ => return,
        };
        for mode in [OrientationMode::Landscape, OrientationMode::Portrait] {
            if self.layouts.get(mode).is_some() {
                continue;
            }
            if let Some(command) = doc.get(&mode.to_string()).and_then(Value::as_str) {
                debug!("using top-level {} layout", mode);
                self.layouts.set(mode, command.to_owned());
            }
        }
    }

    /// Best-effort save; failures are logged and otherwise ignored.
    pub fn save(&self, path: &Path) {
        match self.try_save(path) {
            Ok(()) => info!("saved config to {}", path.display()),
            Err(e) => warn!("could not save config to {}: {}", path.display(), e),
        }
    }

    pub fn try_save(&self, path: &Path) -> Result<()> {
        let mut doc = read_document(path);
        if let Value::Object(owned) = serde_json::to_value(self)? {
            for (key, value) in owned {
                // Owned objects are merged field by field so unknown
                // entries nested in them survive too.
                let merged = match (doc.remove(&key), value) {
                    (Some(Value::Object(mut existing)), Value::Object(fields)) => {
                        existing.extend(fields);
                        Value::Object(existing)
                    }
                    (_, value) => value,
                };
                doc.insert(key, merged);
            }
        }

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &Value::Object(doc))?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Current file content as a JSON object, or an empty one.
fn read_document(path: &Path) -> Map<String, Value> {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}
