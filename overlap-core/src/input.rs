use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive on every edge.
    pub fn contains(&self, (px, py): (f64, f64)) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Pointer activity in canvas coordinates. Every variant carries the pointer
/// position at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved { x: f64, y: f64 },
    Pressed { x: f64, y: f64 },
    Released { x: f64, y: f64 },
}

impl PointerEvent {
    pub fn position(&self) -> (f64, f64) {
        match *self {
            PointerEvent::Moved { x, y }
            | PointerEvent::Pressed { x, y }
            | PointerEvent::Released { x, y } => (x, y),
        }
    }
}

/// Toolkit-independent input, queued by the window layer and drained once
/// per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Text(String),
    Backspace,
    Confirm,
    Cancel,
    Quit,
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let r = Rect::new(10.0, 20.0, 100.0, 30.0);
        assert!(r.contains((10.0, 20.0)));
        assert!(r.contains((110.0, 50.0)));
        assert!(!r.contains((110.1, 50.0)));
        assert!(!r.contains((50.0, 19.9)));
        assert_eq!(r.center(), (60.0, 35.0));
    }
}
