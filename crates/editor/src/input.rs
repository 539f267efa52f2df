//! Pointer and viewport events queued by the host window.

use std::collections::VecDeque;

/// One input event in viewport-local pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerDrag { dx: f32, dy: f32 },
    PointerUp,
    /// Scroll amount; positive zooms in
    Zoom(f32),
    Pan { dx: f32, dy: f32 },
    Resize { width: f32, height: f32 },
}

/// FIFO of events waiting for the next frame
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take all queued events in arrival order
    pub fn drain(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }
}
