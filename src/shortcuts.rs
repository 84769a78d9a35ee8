//! Shortcut bindings.
//!
//! Capturing keys is the hotkey listener's job; this module only names the
//! bindable actions and keeps recorded combinations in a normalized form.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::orientation::Rotation;

/// Modifier order used in labels, with the symbol shown for each.
const MODIFIERS: [(&str, &str); 4] = [("ctrl", "⌃"), ("shift", "⇧"), ("cmd", "⌘"), ("alt", "⌥")];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShortcutAction {
    Toggle,
    Rotate90,
    Rotate0,
    Rotate270,
}

/// What a triggered shortcut asks the engine to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Toggle,
    Rotate(Rotation),
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 4] = [
        ShortcutAction::Toggle,
        ShortcutAction::Rotate90,
        ShortcutAction::Rotate0,
        ShortcutAction::Rotate270,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShortcutAction::Toggle => "toggle",
            ShortcutAction::Rotate90 => "rotate_90",
            ShortcutAction::Rotate0 => "rotate_0",
            ShortcutAction::Rotate270 => "rotate_270",
        }
    }

    pub fn request(&self) -> Request {
        match self {
            ShortcutAction::Toggle => Request::Toggle,
            ShortcutAction::Rotate90 => Request::Rotate(Rotation::Clockwise90),
            ShortcutAction::Rotate0 => Request::Rotate(Rotation::None),
            ShortcutAction::Rotate270 => Request::Rotate(Rotation::Clockwise270),
        }
    }
}

impl FromStr for ShortcutAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ShortcutAction::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| Error::InvalidShortcut(format!("unknown action {:?}", s)))
    }
}

impl fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A recorded key combination. Two combinations are equal when they hold
/// the same normalized keys, whatever their labels say.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyCombination {
    #[serde(deserialize_with = "normalized_keys")]
    pub keys: BTreeSet<String>,
    #[serde(default)]
    pub display: String,
}

impl KeyCombination {
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: BTreeSet<String> = keys
            .into_iter()
            .map(|key| normalize_key(key.as_ref()))
            .filter(|key| !key.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(Error::InvalidShortcut("no keys given".to_owned()));
        }
        let display = label(&keys);
        Ok(KeyCombination { keys, display })
    }
}

impl PartialEq for KeyCombination {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl Eq for KeyCombination {}

/// `"ctrl+shift+r"` style input.
impl FromStr for KeyCombination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KeyCombination::new(s.split('+'))
    }
}

/// Collapse left/right modifier variants and case.
pub fn normalize_key(key: &str) -> String {
    let key = key.trim().to_lowercase();
    let key = key.strip_prefix("key.").unwrap_or(&key);
    match key {
        "ctrl" | "ctrl_l" | "ctrl_r" | "control" => "ctrl".to_owned(),
        "shift" | "shift_l" | "shift_r" => "shift".to_owned(),
        "cmd" | "cmd_l" | "cmd_r" | "command" => "cmd".to_owned(),
        "alt" | "alt_l" | "alt_r" | "option" => "alt".to_owned(),
        other => other.to_owned(),
    }
}

fn label(keys: &BTreeSet<String>) -> String {
    let mut out = String::new();
    for (name, symbol) in MODIFIERS.iter() {
        if keys.contains(*name) {
            out.push_str(symbol);
        }
    }
    for key in keys {
        if !MODIFIERS.iter().any(|(name, _)| *name == key.as_str()) {
            out.push_str(&key.to_uppercase());
        }
    }
    out
}

fn normalized_keys<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw.iter().map(|key| normalize_key(key)).collect())
}

/// One optional binding per action. All four are always written, unset
/// ones as `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortcutBindings {
    #[serde(default)]
    pub toggle: Option<KeyCombination>,
    #[serde(default)]
    pub rotate_90: Option<KeyCombination>,
    #[serde(default)]
    pub rotate_0: Option<KeyCombination>,
    #[serde(default)]
    pub rotate_270: Option<KeyCombination>,
}

impl ShortcutBindings {
    pub fn get(&self, action: ShortcutAction) -> Option<&KeyCombination> {
        match action {
            ShortcutAction::Toggle => self.toggle.as_ref(),
            ShortcutAction::Rotate90 => self.rotate_90.as_ref(),
            ShortcutAction::Rotate0 => self.rotate_0.as_ref(),
            ShortcutAction::Rotate270 => self.rotate_270.as_ref(),
        }
    }

    pub fn set(&mut self, action: ShortcutAction, combo: Option<KeyCombination>) {
        let slot = match action {
            ShortcutAction::Toggle => &mut self.toggle,
            ShortcutAction::Rotate90 => &mut self.rotate_90,
            ShortcutAction::Rotate0 => &mut self.rotate_0,
            ShortcutAction::Rotate270 => &mut self.rotate_270,
        };
        *slot = combo;
    }

    pub fn clear(&mut self) {
        *self = ShortcutBindings::default();
    }

    /// The action bound to exactly these keys, if any.
    pub fn action_for(&self, combo: &KeyCombination) -> Option<ShortcutAction> {
        ShortcutAction::ALL
            .iter()
            .copied()
            .find(|action| self.get(*action) == Some(combo))
    }

    /// Label shown next to an action, `"Not set"` when unbound.
    pub fn display(&self, action: ShortcutAction) -> &str {
        self.get(action)
            .map(|combo| combo.display.as_str())
            .filter(|label| !label.is_empty())
            .unwrap_or("Not set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_and_right_modifiers_collapse() -> Result<()> {
        let left = KeyCombination::new(vec!["Key.ctrl_l", "shift_r", "R"])?;
        let right: KeyCombination = "ctrl_r+shift+r".parse()?;
        assert_eq!(left, right);
        assert_eq!(left.display, "⌃⇧R");
        Ok(())
    }

    #[test]
    fn label_lists_modifiers_first() -> Result<()> {
        let combo: KeyCombination = "9+alt+cmd".parse()?;
        assert_eq!(combo.display, "⌘⌥9");
        Ok(())
    }

    #[test]
    fn empty_combination_is_rejected() {
        assert!(KeyCombination::new(Vec::<&str>::new()).is_err());
        assert!("+".parse::<KeyCombination>().is_err());
    }

    #[test]
    fn equality_ignores_labels_and_order() {
        let stored: KeyCombination =
            serde_json::from_str(r#"{"keys": ["r", "shift", "ctrl_l"], "display": "custom"}"#)
                .unwrap();
        let recorded: KeyCombination = "ctrl+shift+r".parse().unwrap();
        assert_eq!(stored, recorded);
        assert_eq!(stored.display, "custom");
    }

    #[test]
    fn bindings_round_trip_by_action() -> Result<()> {
        let mut bindings = ShortcutBindings::default();
        assert_eq!(bindings.display(ShortcutAction::Toggle), "Not set");

        let combo: KeyCombination = "ctrl+alt+t".parse()?;
        bindings.set(ShortcutAction::Toggle, Some(combo.clone()));
        assert_eq!(bindings.get(ShortcutAction::Toggle), Some(&combo));
        assert_eq!(bindings.display(ShortcutAction::Toggle), "⌃⌥T");
        assert_eq!(bindings.action_for(&combo), Some(ShortcutAction::Toggle));

        bindings.clear();
        assert_eq!(bindings, ShortcutBindings::default());
        Ok(())
    }

    #[test]
    fn unset_actions_serialize_as_null() {
        let json = serde_json::to_value(ShortcutBindings::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "toggle": null,
                "rotate_90": null,
                "rotate_0": null,
                "rotate_270": null,
            })
        );
    }

    #[test]
    fn actions_parse_and_dispatch() -> Result<()> {
        assert_eq!("rotate_270".parse::<ShortcutAction>()?, ShortcutAction::Rotate270);
        assert!("rotate_45".parse::<ShortcutAction>().is_err());
        assert_eq!(ShortcutAction::Toggle.request(), Request::Toggle);
        assert_eq!(
            ShortcutAction::Rotate0.request(),
            Request::Rotate(Rotation::None)
        );
        Ok(())
    }
}
