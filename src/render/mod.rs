//! Visual layer behind the editor.
//!
//! The editor never touches a display surface directly: every visual change
//! goes through [`Renderer`], so the interaction state machine can run
//! against [`HeadlessSurface`] in tests and against [`DomRenderer`] in the
//! browser.

mod dom;
mod headless;

pub use dom::DomRenderer;
pub use headless::{HeadlessSurface, VisualNode};

use crate::scene::{CanvasObject, ObjectId};
use crate::types::{Dimensions, Position};

pub trait Renderer {
    /// Create the visual for `object` at its stored position.
    fn render_object(&mut self, object: &CanvasObject);

    /// Drop the visual for `id`. Unknown ids are ignored.
    fn remove_visual(&mut self, id: &ObjectId);

    /// Toggle the "selected" mark.
    fn mark_selected(&mut self, id: &ObjectId, selected: bool);

    /// Toggle the "moving" mark shown while an object is dragged.
    fn mark_moving(&mut self, id: &ObjectId, moving: bool);

    fn set_position(&mut self, id: &ObjectId, position: Position);

    /// Current size of the drawing surface.
    fn canvas_size(&self) -> Dimensions;

    /// Current rendered size of an object's visual.
    fn object_size(&self, id: &ObjectId) -> Dimensions;
}
