/// Key code the browser reports for Escape.
pub const KEY_ESCAPE: u32 = 27;

/// Raw host input, in canvas pixels where a position is involved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Button pressed at (x, y), origin top-left.
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    /// Positive delta scrolls away from the user.
    Wheel { delta: f32 },
    /// New canvas size.
    Resize { width: f32, height: f32 },
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
    /// Game-defined message from the page UI; `kind` selects the meaning.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

impl InputEvent {
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerDown { .. }
                | InputEvent::PointerUp { .. }
                | InputEvent::PointerMove { .. }
        )
    }
}

/// Events collected between two fixed steps, in arrival order.
///
/// Back-to-back pointer moves collapse into the latest one: only where the
/// pointer ended up matters, and every move costs the game a ray cast.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        if let (InputEvent::PointerMove { .. }, Some(last @ InputEvent::PointerMove { .. })) =
            (event, self.events.last_mut())
        {
            *last = event;
            return;
        }
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
