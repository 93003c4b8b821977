use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::Position;

/// Identifier of a canvas object. Random v4 UUIDs, unique for all practical
/// purposes within a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectKind {
    /// `content` is an image URL
    Picture,
    /// `content` is the text body
    Text,
}

/// A picture or text label placed on the canvas.
///
/// Serialized with the `uid`/`type` field names used by existing
/// `canvasObjects` snapshots; `id`/`kind` are accepted when reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    #[serde(rename = "uid", alias = "id")]
    pub id: ObjectId,
    #[serde(rename = "type", alias = "kind")]
    pub kind: ObjectKind,
    pub content: String,
    #[serde(default)]
    pub position: Position,
}

impl CanvasObject {
    /// Create an object with a fresh id at the canvas origin.
    pub fn new(kind: ObjectKind, content: impl Into<String>) -> Self {
        Self {
            id: ObjectId::generate(),
            kind,
            content: content.into(),
            position: Position::zero(),
        }
    }

    pub fn picture(url: impl Into<String>) -> Self {
        Self::new(ObjectKind::Picture, url)
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(ObjectKind::Text, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_starts_at_origin() {
        let obj = CanvasObject::picture("a.png");
        assert_eq!(obj.kind, ObjectKind::Picture);
        assert_eq!(obj.content, "a.png");
        assert_eq!(obj.position, Position::zero());
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = CanvasObject::text("a");
        let b = CanvasObject::text("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_wire_field_names() {
        let obj = CanvasObject {
            id: ObjectId::from("abc"),
            kind: ObjectKind::Text,
            content: "hello".to_string(),
            position: Position::new(10.0, 20.5),
        };
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["uid"], "abc");
        assert_eq!(json["type"], "TEXT");
        assert_eq!(json["position"]["left"], 10.0);
        assert_eq!(json["position"]["top"], 20.5);
    }

    #[test]
    fn test_reads_alias_field_names() {
        let raw = r#"{"id":"x1","kind":"PICTURE","content":"a.png","position":{"left":1,"top":2}}"#;
        let obj: CanvasObject = serde_json::from_str(raw).unwrap();
        assert_eq!(obj.id.as_str(), "x1");
        assert_eq!(obj.kind, ObjectKind::Picture);
        assert_eq!(obj.position, Position::new(1.0, 2.0));
    }
}
