use crate::input::{PointerEvent, Rect};

/// Push button. Hover follows the pointer; a press while hovered activates.
#[derive(Debug, Clone)]
pub struct Button {
    pub rect: Rect,
    pub label: String,
    hovered: bool,
}

impl Button {
    pub fn new(rect: Rect, label: impl Into<String>) -> Self {
        Self {
            rect,
            label: label.into(),
            hovered: false,
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Returns true once per qualifying press. Repeated presses each count.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        self.hovered = self.rect.contains(event.position());
        matches!(event, PointerEvent::Pressed { .. }) && self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next() -> Button {
        Button::new(Rect::new(1050.0, 720.0, 120.0, 50.0), "Next")
    }

    #[test]
    fn hover_tracks_pointer() {
        let mut b = next();
        assert!(!b.handle_pointer(PointerEvent::Moved { x: 1100.0, y: 740.0 }));
        assert!(b.is_hovered());
        b.handle_pointer(PointerEvent::Moved { x: 10.0, y: 10.0 });
        assert!(!b.is_hovered());
    }

    #[test]
    fn every_press_inside_activates() {
        let mut b = next();
        let press = PointerEvent::Pressed { x: 1100.0, y: 740.0 };
        assert!(b.handle_pointer(press));
        assert!(!b.handle_pointer(PointerEvent::Released { x: 1100.0, y: 740.0 }));
        assert!(b.handle_pointer(press));
    }

    #[test]
    fn press_outside_does_nothing() {
        let mut b = next();
        assert!(!b.handle_pointer(PointerEvent::Pressed { x: 1000.0, y: 740.0 }));
    }
}
