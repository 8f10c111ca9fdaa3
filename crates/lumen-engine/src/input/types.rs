/// Keyboard key identifier.
///
/// Covers what a 2D host usually binds. Everything else arrives as
/// `Key::Unknown` carrying the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown(u32),
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Press/release state shared by keys and buttons.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Platform-agnostic event delivered to [`Engine::on_event`](crate::core::Engine::on_event).
///
/// Pointer positions are in physical pixels, exactly as the platform reports
/// them; the engine maps them into logical space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    /// The user (or platform) asked the application to close.
    QuitRequested,

    /// Output surface changed size (physical pixels).
    Resized { width: u32, height: u32 },

    /// DPI change; carries the new physical surface size.
    ScaleFactorChanged { scale: f64, width: u32, height: u32 },

    Focused(bool),

    PointerMoved { x: f32, y: f32 },

    PointerLeft,

    PointerButton { button: MouseButton, state: ButtonState },

    Key { key: Key, state: ButtonState, repeat: bool },
}
