//! Interaction controller: turns pointer and keyboard events into object
//! store mutations and keeps the visual layer in step with the store.
//!
//! State machine (`S(o)` = selected, `D(o)` = dragging):
//!
//! ```text
//! Idle  --click object o-->        S(o)
//! S(o)  --click canvas-->          Idle
//! S(o)  --click object p-->        S(p)
//! S(o)  --pointer down on o-->     D(o)
//! D(o)  --pointer move-->          D(o)   position = origin + pointer delta
//! D(o)  --pointer up-->            S(o)
//! S(o)  --delete key-->            Idle   object removed
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::render::Renderer;
use crate::scene::{CanvasObject, ObjectId, ObjectKind, ObjectStore};
use crate::types::{Point, Position};
use crate::utils::center_within;

/// Where an event was delivered.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// The empty canvas area itself.
    Canvas,
    /// The wrapper of a canvas object.
    Object(ObjectId),
    /// The image or text element nested inside an object's wrapper. Presses
    /// on it are reported against the wrapper; only echoes of moves and
    /// releases already seen by the window arrive with this target.
    Content(ObjectId),
    /// Window-level tracking used while a drag is in progress.
    Window,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    Click { target: Target },
    PointerDown { target: Target, pointer: Point },
    PointerMove { target: Target, pointer: Point },
    PointerUp { target: Target },
    DeleteKey,
}

impl EditorEvent {
    pub fn target(&self) -> Option<&Target> {
        match self {
            EditorEvent::Click { target }
            | EditorEvent::PointerDown { target, .. }
            | EditorEvent::PointerMove { target, .. }
            | EditorEvent::PointerUp { target } => Some(target),
            EditorEvent::DeleteKey => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Selected(ObjectId),
    Dragging(ObjectId),
}

/// Outcome of [`Editor::handle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handled {
    /// State or visuals changed.
    Applied,
    /// The event means nothing in the current state.
    Ignored,
    /// The event hit nested object content and was swallowed.
    Suppressed,
}

/// Pointer and object position recorded when a drag starts.
#[derive(Clone, Debug, PartialEq)]
struct DragOrigin {
    id: ObjectId,
    position: Position,
    pointer: Point,
}

pub struct Editor<R: Renderer> {
    store: ObjectStore,
    renderer: R,
    drag: Option<DragOrigin>,
}

/// Editor shared between event listeners, UI callbacks and timers.
pub type SharedEditor<R> = Rc<RefCell<Editor<R>>>;

/// Receiver for events produced by a visual layer.
pub type EventSink = Rc<dyn Fn(EditorEvent)>;

impl<R: Renderer> Editor<R> {
    pub fn new(renderer: R) -> Self {
        Self::restore(ObjectStore::new(), renderer)
    }

    /// Build an editor around a previously saved store, rendering every
    /// object where it was stored.
    pub fn restore(store: ObjectStore, mut renderer: R) -> Self {
        for object in store.objects() {
            renderer.render_object(object);
        }
        if let Some(id) = store.selected() {
            renderer.mark_selected(id, true);
        }
        Self {
            store,
            renderer,
            drag: None,
        }
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn state(&self) -> InteractionState {
        match (&self.drag, self.store.selected()) {
            (Some(drag), _) => InteractionState::Dragging(drag.id.clone()),
            (None, Some(id)) => InteractionState::Selected(id.clone()),
            (None, None) => InteractionState::Idle,
        }
    }

    /// Id of the object being dragged, if any.
    pub fn moving(&self) -> Option<&ObjectId> {
        self.drag.as_ref().map(|d| &d.id)
    }

    // === Creation ===

    pub fn add_picture(&mut self, url: &str) -> ObjectId {
        self.add_object(ObjectKind::Picture, url)
    }

    /// Add a text label. Empty text (a cancelled prompt) adds nothing.
    pub fn add_text(&mut self, text: &str) -> Option<ObjectId> {
        if text.is_empty() {
            return None;
        }
        Some(self.add_object(ObjectKind::Text, text))
    }

    /// Create, render and center a new object. Selection and drag state
    /// are left as they were.
    pub fn add_object(&mut self, kind: ObjectKind, content: &str) -> ObjectId {
        let object: CanvasObject = self.store.create(kind, content).clone();
        self.renderer.render_object(&object);

        let centered = center_within(
            self.renderer.canvas_size(),
            self.renderer.object_size(&object.id),
        );
        self.renderer.set_position(&object.id, centered);
        self.store.update_position(&object.id, centered.left, centered.top);

        log::debug!("Added {:?} object {} at {:?}", kind, object.id, centered);
        object.id
    }

    // === Events ===

    pub fn handle(&mut self, event: EditorEvent) -> Handled {
        if let Some(Target::Content(_)) = event.target() {
            return Handled::Suppressed;
        }

        match event {
            EditorEvent::Click { target: Target::Canvas } => self.clear_selection(),
            EditorEvent::Click { target: Target::Object(id) } => self.click_object(&id),
            EditorEvent::Click { .. } => Handled::Ignored,
            EditorEvent::PointerDown {
                target: Target::Object(id),
                pointer,
            } => self.begin_drag(&id, pointer),
            EditorEvent::PointerDown { .. } => Handled::Ignored,
            EditorEvent::PointerMove { pointer, .. } => self.drag_to(pointer),
            EditorEvent::PointerUp { .. } => self.end_drag(),
            EditorEvent::DeleteKey => self.delete_selected(),
        }
    }

    fn click_object(&mut self, id: &ObjectId) -> Handled {
        if !self.store.contains(id) {
            return Handled::Ignored;
        }
        if self.drag.as_ref().is_some_and(|d| &d.id != id) {
            self.end_drag();
        }
        self.select(id);
        Handled::Applied
    }

    fn clear_selection(&mut self) -> Handled {
        let Some(id) = self.store.selected().cloned() else {
            return Handled::Ignored;
        };
        self.end_drag();
        self.renderer.mark_selected(&id, false);
        self.store.deselect();
        Handled::Applied
    }

    fn select(&mut self, id: &ObjectId) {
        if let Some(previous) = self.store.selected().cloned() {
            if &previous != id {
                self.renderer.mark_selected(&previous, false);
            }
        }
        self.store.select(id);
        self.renderer.mark_selected(id, true);
    }

    fn begin_drag(&mut self, id: &ObjectId, pointer: Point) -> Handled {
        if self.click_object(id) == Handled::Ignored {
            return Handled::Ignored;
        }
        // click_object leaves any drag of `id` in place; restart it from here
        self.end_drag();

        let Some(position) = self.store.get(id).map(|o| o.position) else {
            return Handled::Ignored;
        };
        self.drag = Some(DragOrigin {
            id: id.clone(),
            position,
            pointer,
        });
        self.renderer.mark_moving(id, true);
        Handled::Applied
    }

    fn drag_to(&mut self, pointer: Point) -> Handled {
        let Some(origin) = &self.drag else {
            return Handled::Ignored;
        };
        let (dx, dy) = pointer.delta_from(&origin.pointer);
        let next = origin.position.offset(dx, dy);
        let id = origin.id.clone();

        self.renderer.set_position(&id, next);
        self.store.update_position(&id, next.left, next.top);
        Handled::Applied
    }

    fn end_drag(&mut self) -> Handled {
        match self.drag.take() {
            Some(origin) => {
                self.renderer.mark_moving(&origin.id, false);
                Handled::Applied
            }
            None => Handled::Ignored,
        }
    }

    fn delete_selected(&mut self) -> Handled {
        let Some(id) = self.store.selected().cloned() else {
            return Handled::Ignored;
        };
        self.end_drag();
        self.store.remove(&id);
        self.renderer.remove_visual(&id);
        log::debug!("Deleted canvas object {}", id);
        Handled::Applied
    }
}

/// Event sink that forwards into a shared editor. Events arriving while the
/// editor is already handling one are dropped.
pub fn dispatcher<R: Renderer + 'static>(editor: Weak<RefCell<Editor<R>>>) -> EventSink {
    Rc::new(move |event: EditorEvent| {
        let Some(editor) = editor.upgrade() else {
            return;
        };
        let Ok(mut editor) = editor.try_borrow_mut() else {
            log::warn!("Dropping re-entrant editor event {:?}", event);
            return;
        };
        editor.handle(event);
    })
}
