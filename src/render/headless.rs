use std::collections::HashMap;

use super::Renderer;
use crate::scene::{CanvasObject, ObjectId, ObjectKind, ObjectStore};
use crate::types::{Dimensions, Position};

/// In-memory mirror of what a display surface would show.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualNode {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub content: String,
    pub position: Position,
    pub selected: bool,
    pub moving: bool,
}

/// Renderer without a display, with fixed canvas and element sizes.
#[derive(Clone, Debug)]
pub struct HeadlessSurface {
    canvas: Dimensions,
    default_size: Dimensions,
    content_sizes: HashMap<String, Dimensions>,
    nodes: Vec<VisualNode>,
}

impl HeadlessSurface {
    pub fn new(canvas: Dimensions) -> Self {
        Self {
            canvas,
            default_size: Dimensions::default(),
            content_sizes: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Size reported for every object without a content-specific size.
    pub fn with_default_size(mut self, size: Dimensions) -> Self {
        self.default_size = size;
        self
    }

    /// Size reported for objects whose content equals `content`.
    pub fn with_content_size(mut self, content: impl Into<String>, size: Dimensions) -> Self {
        self.content_sizes.insert(content.into(), size);
        self
    }

    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn node(&self, id: &ObjectId) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn selected_ids(&self) -> Vec<&ObjectId> {
        self.nodes.iter().filter(|n| n.selected).map(|n| &n.id).collect()
    }

    pub fn moving_ids(&self) -> Vec<&ObjectId> {
        self.nodes.iter().filter(|n| n.moving).map(|n| &n.id).collect()
    }

    /// Whether the visuals show exactly what `store` holds: same objects in
    /// the same order at the same positions, with the selection mark on the
    /// selected object only and the moving mark on `moving` only.
    pub fn mirrors(&self, store: &ObjectStore, moving: Option<&ObjectId>) -> bool {
        if self.nodes.len() != store.len() {
            return false;
        }
        self.nodes.iter().zip(store.objects()).all(|(node, object)| {
            node.id == object.id
                && node.kind == object.kind
                && node.content == object.content
                && node.position == object.position
                && node.selected == store.is_selected(&object.id)
                && node.moving == (moving == Some(&object.id))
        })
    }

    fn node_mut(&mut self, id: &ObjectId) -> Option<&mut VisualNode> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }
}

impl Renderer for HeadlessSurface {
    fn render_object(&mut self, object: &CanvasObject) {
        self.nodes.push(VisualNode {
            id: object.id.clone(),
            kind: object.kind,
            content: object.content.clone(),
            position: object.position,
            selected: false,
            moving: false,
        });
    }

    fn remove_visual(&mut self, id: &ObjectId) {
        self.nodes.retain(|n| &n.id != id);
    }

    fn mark_selected(&mut self, id: &ObjectId, selected: bool) {
        if let Some(node) = self.node_mut(id) {
            node.selected = selected;
        }
    }

    fn mark_moving(&mut self, id: &ObjectId, moving: bool) {
        if let Some(node) = self.node_mut(id) {
            node.moving = moving;
        }
    }

    fn set_position(&mut self, id: &ObjectId, position: Position) {
        if let Some(node) = self.node_mut(id) {
            node.position = position;
        }
    }

    fn canvas_size(&self) -> Dimensions {
        self.canvas
    }

    fn object_size(&self, id: &ObjectId) -> Dimensions {
        self.node(id)
            .and_then(|n| self.content_sizes.get(&n.content))
            .copied()
            .unwrap_or(self.default_size)
    }
}
