use super::object::{CanvasObject, ObjectId, ObjectKind};
use crate::types::Position;
use std::collections::HashSet;
use thiserror::Error;

/// Snapshot encoding errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Snapshot is not a valid object list: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Ordered collection of canvas objects plus the current selection.
/// Insertion order doubles as paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectStore {
    objects: Vec<CanvasObject>,
    selected: Option<ObjectId>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object with a fresh id at `(0, 0)` and append it.
    pub fn create(&mut self, kind: ObjectKind, content: impl Into<String>) -> &CanvasObject {
        let mut object = CanvasObject::new(kind, content);
        while self.contains(&object.id) {
            object.id = ObjectId::generate();
        }
        self.objects.push(object);
        &self.objects[self.objects.len() - 1]
    }

    /// Remove an object by id, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: &ObjectId) -> Option<CanvasObject> {
        let pos = self.objects.iter().position(|o| &o.id == id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.objects.remove(pos))
    }

    pub fn get(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn update_position(&mut self, id: &ObjectId, left: f64, top: f64) {
        if let Some(object) = self.objects.iter_mut().find(|o| &o.id == id) {
            object.position = Position::new(left, top);
        }
    }

    // === Selection ===

    /// Make `id` the single selected object. Unknown ids leave the
    /// selection untouched.
    pub fn select(&mut self, id: &ObjectId) {
        if !self.contains(id) {
            return;
        }
        self.selected = Some(id.clone());
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&ObjectId> {
        self.selected.as_ref()
    }

    pub fn selected_object(&self) -> Option<&CanvasObject> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: &ObjectId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    // === Snapshots ===

    /// Encode the object list. The selection is session state and is not
    /// part of the snapshot.
    pub fn serialize(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(&self.objects).map_err(SnapshotError::Encode)
    }

    /// Decode a snapshot produced by [`ObjectStore::serialize`]. Repeated
    /// ids keep their first occurrence.
    pub fn deserialize(snapshot: &str) -> Result<Self, SnapshotError> {
        let decoded: Vec<CanvasObject> =
            serde_json::from_str(snapshot).map_err(SnapshotError::Decode)?;

        let mut seen = HashSet::new();
        let mut objects = Vec::with_capacity(decoded.len());
        for object in decoded {
            if seen.insert(object.id.clone()) {
                objects.push(object);
            } else {
                log::warn!("Dropping duplicate canvas object {} from snapshot", object.id);
            }
        }

        Ok(Self {
            objects,
            selected: None,
        })
    }

    /// Decode an optional snapshot, falling back to an empty store when it
    /// is absent or unreadable.
    pub fn deserialize_or_default(snapshot: Option<&str>) -> Self {
        let Some(raw) = snapshot else {
            return Self::new();
        };
        match Self::deserialize(raw) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Ignoring unreadable canvas snapshot: {}", e);
                Self::new()
            }
        }
    }
}
