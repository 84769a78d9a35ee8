//! Serialized access to the engine.
//!
//! Menu actions and the hotkey listener call in from their own threads.
//! One lock covers every request, tool invocations included, so two
//! requests never interleave their reads and writes of the store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::backends::DisplayTool;
use crate::engine::{RotationOutcome, Rotator};
use crate::inventory::DisplayRecord;
use crate::orientation::Rotation;
use crate::shortcuts::{KeyCombination, ShortcutAction, ShortcutBindings};

pub struct RotationService<T> {
    rotator: Mutex<Rotator<T>>,
}

impl<T: DisplayTool> RotationService<T> {
    pub fn new(rotator: Rotator<T>) -> Self {
        RotationService {
            rotator: Mutex::new(rotator),
        }
    }

    // Poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Rotator<T>> {
        self.rotator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn rotate(&self, rotation: Rotation) -> RotationOutcome {
        self.lock().rotate(rotation)
    }

    pub fn toggle(&self) -> RotationOutcome {
        self.lock().toggle()
    }

    /// Entry point for the hotkey listener.
    pub fn trigger(&self, action: ShortcutAction) -> RotationOutcome {
        debug!("shortcut {} triggered", action);
        self.lock().handle(action.request())
    }

    pub fn list_displays(&self) -> Vec<DisplayRecord> {
        self.lock().list_displays()
    }

    pub fn select_target(&self, persistent_id: &str) {
        self.lock().select_target(persistent_id)
    }

    pub fn current_target(&self) -> Option<String> {
        self.lock().current_target().map(str::to_owned)
    }

    pub fn shortcut_bindings(&self) -> ShortcutBindings {
        self.lock().shortcut_bindings().clone()
    }

    pub fn set_shortcut(&self, action: ShortcutAction, combo: Option<KeyCombination>) {
        self.lock().set_shortcut(action, combo)
    }

    pub fn clear_shortcuts(&self) {
        self.lock().clear_shortcuts()
    }

    /// Run `f` against the engine while holding the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&Rotator<T>) -> R) -> R {
        f(&self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::dummy::{DummyScreen, DummyTool, Invocation};
    use crate::store::LayoutStore;

    use std::sync::Arc;
    use std::thread;

    const EXTERNAL: &str = "ABCD-0001";

    fn service() -> RotationService<DummyTool> {
        let tool = DummyTool::new(vec![DummyScreen::external(EXTERNAL, 1920, 1080)]);
        let store = LayoutStore {
            target_display_id: Some(EXTERNAL.to_owned()),
            ..Default::default()
        };
        RotationService::new(Rotator::new(tool, store, None))
    }

    #[test]
    fn concurrent_toggles_do_not_interleave() {
        let service = Arc::new(service());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || service.toggle().is_success())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        service.inspect(|rotator| {
            // Each toggle lists twice, then replays and/or applies.
            let history = &rotator.tool().history;
            let mut i = 0;
            let mut toggles = 0;
            while i < history.len() {
                assert_eq!(history[i], Invocation::List);
                assert_eq!(history[i + 1], Invocation::List);
                i += 2;
                while i < history.len() && history[i] != Invocation::List {
                    i += 1;
                }
                toggles += 1;
            }
            assert_eq!(toggles, 8);

            let screen = rotator.tool().screen(EXTERNAL).unwrap();
            assert_eq!(screen.rotation, Rotation::None);
            assert_eq!((screen.width, screen.height), (1920, 1080));
        });
    }

    #[test]
    fn shortcuts_dispatch_to_requests() {
        let service = service();
        assert!(service.trigger(ShortcutAction::Rotate270).is_success());
        service.inspect(|rotator| {
            assert_eq!(
                rotator.tool().screen(EXTERNAL).unwrap().rotation,
                Rotation::Clockwise270
            )
        });

        assert!(service.trigger(ShortcutAction::Toggle).is_success());
        service.inspect(|rotator| {
            assert_eq!(
                rotator.tool().screen(EXTERNAL).unwrap().rotation,
                Rotation::None
            )
        });
    }

    #[test]
    fn target_and_bindings_are_readable() {
        let service = service();
        assert_eq!(service.current_target().as_deref(), Some(EXTERNAL));

        service.select_target("ABCD-0002");
        assert_eq!(service.current_target().as_deref(), Some("ABCD-0002"));

        let combo: KeyCombination = "ctrl+shift+r".parse().unwrap();
        service.set_shortcut(ShortcutAction::Toggle, Some(combo.clone()));
        assert_eq!(
            service.shortcut_bindings().get(ShortcutAction::Toggle),
            Some(&combo)
        );
        service.clear_shortcuts();
        assert_eq!(service.shortcut_bindings(), ShortcutBindings::default());

        assert_eq!(service.list_displays().len(), 1);
    }
}
