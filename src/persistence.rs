//! Snapshot persistence.
//!
//! The object list is written to a string-keyed store on a fixed timer and
//! read back once at startup. Writes happen regardless of whether anything
//! changed; up to one interval of edits can be lost on reload.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;
use std::time::Duration;

use gloo::timers::callback::Interval;
use thiserror::Error;

use crate::editor::Editor;
use crate::render::Renderer;
use crate::scene::{ObjectStore, SnapshotError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String key/value backend for snapshots.
pub trait SnapshotStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Keeps snapshots in memory. Used by tests and when the browser refuses
/// access to `localStorage`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The window's `localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> StorageResult<web_sys::Storage> {
        gloo_utils::window()
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
    }
}

impl SnapshotStorage for BrowserStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}

/// Rebuild the object store from `key`. A missing, unreadable or corrupt
/// snapshot yields an empty store.
pub fn restore<S: SnapshotStorage + ?Sized>(storage: &S, key: &str) -> ObjectStore {
    let raw = match storage.read(key) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Could not read snapshot {}: {}", key, e);
            None
        }
    };
    let store = ObjectStore::deserialize_or_default(raw.as_deref());
    log::info!("Restored {} canvas object(s) from {}", store.len(), key);
    store
}

/// Write the current object list under `key`.
pub fn flush<S: SnapshotStorage + ?Sized>(
    store: &ObjectStore,
    storage: &S,
    key: &str,
) -> StorageResult<()> {
    let snapshot = store.serialize()?;
    storage.write(key, &snapshot)
}

/// Periodically flushes an editor's store. Stops when dropped or when the
/// editor goes away.
pub struct Autosave {
    _interval: Interval,
}

impl Autosave {
    pub fn start<R, S>(
        editor: Weak<RefCell<Editor<R>>>,
        storage: S,
        key: String,
        interval: Duration,
    ) -> Self
    where
        R: Renderer + 'static,
        S: SnapshotStorage + 'static,
    {
        let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
        let interval = Interval::new(millis, move || {
            Self::tick(&editor, &storage, &key);
        });
        Self {
            _interval: interval,
        }
    }

    /// One timer tick. Returns whether a snapshot was written.
    fn tick<R, S>(editor: &Weak<RefCell<Editor<R>>>, storage: &S, key: &str) -> bool
    where
        R: Renderer,
        S: SnapshotStorage + ?Sized,
    {
        let Some(editor) = editor.upgrade() else {
            return false;
        };
        let Ok(editor) = editor.try_borrow() else {
            log::debug!("Editor busy, skipping autosave tick");
            return false;
        };
        match flush(editor.store(), storage, key) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Autosave failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{EditorEvent, Target};
    use crate::render::HeadlessSurface;
    use crate::scene::ObjectKind;
    use crate::types::{Dimensions, Position};
    use std::rc::Rc;

    fn shared_editor() -> Rc<RefCell<Editor<HeadlessSurface>>> {
        let surface = HeadlessSurface::new(Dimensions::new(800.0, 600.0))
            .with_default_size(Dimensions::new(100.0, 20.0));
        Rc::new(RefCell::new(Editor::new(surface)))
    }

    struct BrokenStorage;

    impl SnapshotStorage for BrokenStorage {
        fn read(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Backend("quota".to_string()))
        }

        fn write(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Backend("quota".to_string()))
        }
    }

    #[test]
    fn test_restore_without_snapshot() {
        let storage = MemoryStorage::new();
        assert!(restore(&storage, "canvasObjects").is_empty());
    }

    #[test]
    fn test_restore_corrupt_snapshot() {
        let storage = MemoryStorage::new();
        storage.write("canvasObjects", "[{\"uid\":").unwrap();
        assert!(restore(&storage, "canvasObjects").is_empty());
    }

    #[test]
    fn test_restore_read_failure() {
        assert!(restore(&BrokenStorage, "canvasObjects").is_empty());
    }

    #[test]
    fn test_flush_then_reload() {
        let storage = MemoryStorage::new();
        let mut store = ObjectStore::new();
        let a = store.create(ObjectKind::Picture, "a.png").id.clone();
        let b = store.create(ObjectKind::Text, "hello").id.clone();
        store.update_position(&a, 300.0, 225.0);
        store.update_position(&b, 10.0, 20.0);
        store.select(&a);

        flush(&store, &storage, "canvasObjects").unwrap();
        let reloaded = restore(&storage, "canvasObjects");

        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.objects(), store.objects());
        assert_eq!(reloaded.get(&a).unwrap().position, Position::new(300.0, 225.0));
        assert_eq!(reloaded.get(&b).unwrap().content, "hello");
        assert!(reloaded.selected().is_none());
    }

    #[test]
    fn test_flush_overwrites() {
        let storage = MemoryStorage::new();
        let mut store = ObjectStore::new();
        let a = store.create(ObjectKind::Text, "a").id.clone();
        flush(&store, &storage, "k").unwrap();

        store.remove(&a);
        flush(&store, &storage, "k").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_flush_reports_backend_failure() {
        let store = ObjectStore::new();
        assert!(matches!(
            flush(&store, &BrokenStorage, "k"),
            Err(StorageError::Backend(_))
        ));
    }

    #[test]
    fn test_keys_are_independent() {
        let storage = MemoryStorage::new();
        storage.write("a", "[]").unwrap();
        assert!(storage.read("b").unwrap().is_none());
    }

    #[test]
    fn test_autosave_tick_writes_current_store() {
        let storage = MemoryStorage::new();
        let editor = shared_editor();
        let weak = Rc::downgrade(&editor);

        assert!(Autosave::tick(&weak, &storage, "canvasObjects"));
        assert_eq!(storage.read("canvasObjects").unwrap().as_deref(), Some("[]"));

        let id = editor.borrow_mut().add_text("hello").unwrap();
        assert!(Autosave::tick(&weak, &storage, "canvasObjects"));
        let reloaded = restore(&storage, "canvasObjects");
        assert_eq!(reloaded.objects(), editor.borrow().store().objects());

        editor.borrow_mut().handle(EditorEvent::Click {
            target: Target::Object(id),
        });
        editor.borrow_mut().handle(EditorEvent::DeleteKey);
        assert!(Autosave::tick(&weak, &storage, "canvasObjects"));
        assert!(restore(&storage, "canvasObjects").is_empty());
    }

    #[test]
    fn test_autosave_tick_skips_busy_editor() {
        let storage = MemoryStorage::new();
        let editor = shared_editor();
        let weak = Rc::downgrade(&editor);

        let _guard = editor.borrow_mut();
        assert!(!Autosave::tick(&weak, &storage, "canvasObjects"));
        assert!(storage.read("canvasObjects").unwrap().is_none());
    }

    #[test]
    fn test_autosave_tick_after_editor_dropped() {
        let storage = MemoryStorage::new();
        let editor = shared_editor();
        let weak = Rc::downgrade(&editor);
        drop(editor);

        assert!(!Autosave::tick(&weak, &storage, "canvasObjects"));
        assert!(storage.read("canvasObjects").unwrap().is_none());
    }

    #[test]
    fn test_autosave_tick_reports_backend_failure() {
        let editor = shared_editor();
        assert!(!Autosave::tick(&Rc::downgrade(&editor), &BrokenStorage, "k"));
    }
}
