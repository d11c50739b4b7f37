//! Event codes shared with the host page.

/// Custom event kinds sent by the UI.
pub mod custom {
    /// Restart button.
    pub const RESTART: u32 = 1;
    /// The wood texture failed to load; switch blocks to the flat fallback.
    pub const TEXTURE_UNAVAILABLE: u32 = 2;
}

/// Game event kinds sent to the UI.
pub mod game_events {
    /// `a` = successful placements so far.
    pub const MOVES: f32 = 1.0;
    /// The tower fell; the game is over.
    pub const COLLAPSED: f32 = 2.0;
    /// `a` = one of the `CURSOR_*` values below.
    pub const CURSOR: f32 = 3.0;
    /// A fresh tower was built.
    pub const RESTARTED: f32 = 4.0;
    /// `a`, `b`, `c` = RGB of the hover outline. Sent whenever the scene is
    /// set up.
    pub const OUTLINE_COLOR: f32 = 5.0;

    pub const CURSOR_DEFAULT: f32 = 0.0;
    pub const CURSOR_POINTER: f32 = 1.0;
}
