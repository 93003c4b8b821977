use std::collections::HashMap;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, EventTarget, HtmlElement, HtmlImageElement, MouseEvent};

use super::Renderer;
use crate::editor::{EditorEvent, EventSink, Target};
use crate::scene::{CanvasObject, ObjectId, ObjectKind};
use crate::types::{Dimensions, Point, Position};
use crate::utils::{client_point, px};

const ITEM_CLASS: &str = "item";
const SELECTED_CLASS: &str = "selected";
const MOVING_CLASS: &str = "moving";

/// Window listeners that follow the pointer while a drag is active.
/// They run in the capture phase so nested content cannot hide moves.
struct DragTracker {
    _on_move: EventListener,
    _on_up: EventListener,
}

/// Renders canvas objects as absolutely positioned `div.item` wrappers
/// inside the canvas element and reports DOM events to an [`EventSink`].
pub struct DomRenderer {
    document: Document,
    canvas: HtmlElement,
    sink: EventSink,
    text_font_size: f64,
    elements: HashMap<ObjectId, HtmlElement>,
    /// Per-object listeners; dropping an entry unbinds them.
    listeners: HashMap<ObjectId, Vec<EventListener>>,
    _canvas_listener: EventListener,
    drag_tracker: Option<DragTracker>,
    /// A tracker that ended from inside its own mouseup callback. Kept alive
    /// until the next drag starts so the running closure is not freed.
    retired_tracker: Option<DragTracker>,
}

impl DomRenderer {
    pub fn new(canvas: HtmlElement, sink: EventSink, text_font_size: f64) -> Self {
        let canvas_listener = {
            let sink = sink.clone();
            let canvas_target: EventTarget = canvas.clone().into();
            EventListener::new(&canvas, "click", move |event| {
                // Clicks bubbling up from objects are handled by the objects
                if event.target().as_ref() == Some(&canvas_target) {
                    sink(EditorEvent::Click {
                        target: Target::Canvas,
                    });
                }
            })
        };

        Self {
            document: gloo_utils::document(),
            canvas,
            sink,
            text_font_size,
            elements: HashMap::new(),
            listeners: HashMap::new(),
            _canvas_listener: canvas_listener,
            drag_tracker: None,
            retired_tracker: None,
        }
    }

    pub fn element(&self, id: &ObjectId) -> Option<&HtmlElement> {
        self.elements.get(id)
    }

    fn build_visual(
        &self,
        object: &CanvasObject,
    ) -> Result<(HtmlElement, HtmlElement), JsValue> {
        let wrapper: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        wrapper.set_id(object.id.as_str());
        wrapper.set_class_name(ITEM_CLASS);
        apply_position(&wrapper, object.position)?;

        let content: HtmlElement = match object.kind {
            ObjectKind::Picture => {
                let img: HtmlImageElement = self.document.create_element("img")?.dyn_into()?;
                img.set_src(&object.content);
                img.into()
            }
            ObjectKind::Text => {
                let span: HtmlElement = self.document.create_element("span")?.dyn_into()?;
                span.set_inner_text(&object.content);
                span.style().set_property("font-size", &px(self.text_font_size))?;
                span
            }
        };

        wrapper.append_child(&content)?;
        self.canvas.append_child(&wrapper)?;
        Ok((wrapper, content))
    }

    fn bind_object(
        &self,
        id: &ObjectId,
        wrapper: &HtmlElement,
        content: &HtmlElement,
    ) -> Vec<EventListener> {
        let mut bound = Vec::with_capacity(6);

        bound.push({
            let sink = self.sink.clone();
            let id = id.clone();
            EventListener::new(wrapper, "click", move |_| {
                sink(EditorEvent::Click {
                    target: Target::Object(id.clone()),
                })
            })
        });

        bound.push({
            let sink = self.sink.clone();
            let id = id.clone();
            EventListener::new_with_options(
                wrapper,
                "mousedown",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                        mouse.prevent_default();
                        sink(EditorEvent::PointerDown {
                            target: Target::Object(id.clone()),
                            pointer: client_point(mouse),
                        });
                    }
                },
            )
        });

        // Presses on nested content act on the wrapper. Propagation stops here
        // so the wrapper listeners do not see the same press twice.
        for kind in ["click", "mousedown"] {
            let sink = self.sink.clone();
            let id = id.clone();
            bound.push(EventListener::new_with_options(
                content,
                kind,
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    event.stop_propagation();
                    event.prevent_default();
                    sink(content_event(event, Target::Object(id.clone())));
                },
            ));
        }

        // Moves and releases reach the drag tracker on the window first;
        // the copies delivered to content are reported and swallowed.
        for kind in ["mousemove", "mouseup"] {
            let sink = self.sink.clone();
            let id = id.clone();
            bound.push(EventListener::new(content, kind, move |event| {
                sink(content_event(event, Target::Content(id.clone())));
            }));
        }

        bound
    }

    fn start_tracking(&mut self) {
        let window = gloo_utils::window();

        let on_move = {
            let sink = self.sink.clone();
            EventListener::new_with_options(
                &window,
                "mousemove",
                EventListenerOptions::run_in_capture_phase(),
                move |event| {
                    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                        sink(EditorEvent::PointerMove {
                            target: Target::Window,
                            pointer: client_point(mouse),
                        });
                    }
                },
            )
        };

        let on_up = {
            let sink = self.sink.clone();
            EventListener::new_with_options(
                &window,
                "mouseup",
                EventListenerOptions::run_in_capture_phase(),
                move |_| {
                    sink(EditorEvent::PointerUp {
                        target: Target::Window,
                    })
                },
            )
        };

        self.retired_tracker = self.drag_tracker.take();
        self.drag_tracker = Some(DragTracker {
            _on_move: on_move,
            _on_up: on_up,
        });
    }

    fn stop_tracking(&mut self) {
        if let Some(tracker) = self.drag_tracker.take() {
            self.retired_tracker = Some(tracker);
        }
    }
}

fn apply_position(element: &HtmlElement, position: Position) -> Result<(), JsValue> {
    let style = element.style();
    style.set_property("position", "absolute")?;
    style.set_property("left", &px(position.left))?;
    style.set_property("top", &px(position.top))
}

fn content_event(event: &Event, target: Target) -> EditorEvent {
    let pointer = event
        .dyn_ref::<MouseEvent>()
        .map(client_point)
        .unwrap_or(Point::new(0.0, 0.0));
    match event.type_().as_str() {
        "mousedown" => EditorEvent::PointerDown { target, pointer },
        "mousemove" => EditorEvent::PointerMove { target, pointer },
        "mouseup" => EditorEvent::PointerUp { target },
        _ => EditorEvent::Click { target },
    }
}

impl Renderer for DomRenderer {
    fn render_object(&mut self, object: &CanvasObject) {
        match self.build_visual(object) {
            Ok((wrapper, content)) => {
                let bound = self.bind_object(&object.id, &wrapper, &content);
                self.listeners.insert(object.id.clone(), bound);
                self.elements.insert(object.id.clone(), wrapper);
            }
            Err(e) => log::error!("Failed to render canvas object {}: {:?}", object.id, e),
        }
    }

    fn remove_visual(&mut self, id: &ObjectId) {
        self.listeners.remove(id);
        if let Some(element) = self.elements.remove(id) {
            element.remove();
        }
    }

    fn mark_selected(&mut self, id: &ObjectId, selected: bool) {
        if let Some(element) = self.elements.get(id) {
            let class_list = element.class_list();
            if let Err(e) = class_list.toggle_with_force(SELECTED_CLASS, selected) {
                log::error!("Failed to mark {} selected: {:?}", id, e);
            }
        }
    }

    fn mark_moving(&mut self, id: &ObjectId, moving: bool) {
        if let Some(element) = self.elements.get(id) {
            let class_list = element.class_list();
            if let Err(e) = class_list.toggle_with_force(MOVING_CLASS, moving) {
                log::error!("Failed to mark {} moving: {:?}", id, e);
            }
        }
        if moving {
            self.start_tracking();
        } else {
            self.stop_tracking();
        }
    }

    fn set_position(&mut self, id: &ObjectId, position: Position) {
        if let Some(element) = self.elements.get(id) {
            if let Err(e) = apply_position(element, position) {
                log::error!("Failed to move {}: {:?}", id, e);
            }
        }
    }

    fn canvas_size(&self) -> Dimensions {
        Dimensions::new(
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
        )
    }

    fn object_size(&self, id: &ObjectId) -> Dimensions {
        self.elements
            .get(id)
            .map(|e| Dimensions::new(e.client_width() as f64, e.client_height() as f64))
            .unwrap_or_default()
    }
}
