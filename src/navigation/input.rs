use crate::core::Direction;

/// Raw navigation input as the navigator sees it.
///
/// Deltas follow the feed direction: positive moves forward (`Next`), negative
/// moves back (`Prev`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Wheel(f64),
    /// Completed swipe distance in pixels.
    Touch(f64),
    Button(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Wheel,
    Touch,
    Button,
}

/// A committed request to move through the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    pub direction: Direction,
    pub source: InputSource,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle used to scope input to a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// An input event together with where the pointer was when it happened.
///
/// `pointer` is `None` for keyboard input, which is already focus-scoped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopedInput {
    pub event: InputEvent,
    pub pointer: Option<Point>,
}

impl ScopedInput {
    pub fn at(event: InputEvent, pointer: Point) -> Self {
        Self { event, pointer: Some(pointer) }
    }

    pub fn unscoped(event: InputEvent) -> Self {
        Self { event, pointer: None }
    }
}
