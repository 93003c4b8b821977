use crate::types::{Dimensions, Point, Position};
use web_sys::MouseEvent;

/// Screen coordinates of a mouse event.
pub fn client_point(event: &MouseEvent) -> Point {
    Point::new(event.client_x() as f64, event.client_y() as f64)
}

/// Offset that centers an element of size `element` inside `container`.
/// Elements larger than the container get a negative offset.
pub fn center_within(container: Dimensions, element: Dimensions) -> Position {
    Position::new(
        (container.width - element.width) / 2.0,
        (container.height - element.height) / 2.0,
    )
}

/// CSS pixel length for inline styles.
pub fn px(value: f64) -> String {
    format!("{}px", value)
}
