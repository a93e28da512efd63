//! Event types consumed by the application loop.
//!
//! The platform input adapter (raw terminal parsing) lives outside the
//! engine; these are the shapes it must produce. A crossterm conversion
//! is provided because the default input thread reads crossterm events.

/// A terminal event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// A key was pressed or released.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// The terminal was resized to (width, height).
    Resize(u16, u16),
    /// Shut the application down.
    Quit,
}

/// Whether a key event is a press or a release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    /// Key went down (or repeated).
    #[default]
    Press,
    /// Key came up.
    Release,
}

/// A keyboard event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,
    /// Active modifiers.
    pub modifiers: Modifiers,
    /// Press or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key press event.
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a plain key press with no modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// Check if Ctrl is held.
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt is held.
    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift is held.
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// A key code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyCode {
    /// A character key.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Escape.
    Escape,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Function key (F1-F12).
    F(u8),
}

/// Keyboard modifier flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// Shift modifier.
    pub const SHIFT: Self = Self(1);
    /// Ctrl modifier.
    pub const CTRL: Self = Self(2);
    /// Alt/Option modifier.
    pub const ALT: Self = Self(4);
    /// Meta/Command modifier.
    pub const META: Self = Self(8);

    /// Check if this modifier set contains the given modifier.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0 && other.0 != 0
    }

    /// Combine two modifier sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The kind of mouse event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum MouseEventKind {
    /// A button was pressed.
    Press,
    /// A button was released.
    Release,
    /// The mouse moved.
    Move,
    /// The wheel scrolled.
    Scroll,
}

/// A mouse button (wheel directions are buttons on the wire).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Right button.
    Right,
    /// Middle button.
    Middle,
    /// Wheel up.
    WheelUp,
    /// Wheel down.
    WheelDown,
}

/// A mouse event in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// What happened.
    pub kind: MouseEventKind,
    /// Which button (meaningful for press/release/scroll).
    pub button: MouseButton,
}

/// Convert a crossterm event into an engine event. Events the engine
/// does not consume (focus changes, paste) map to `None`.
pub fn from_crossterm(event: crossterm::event::Event) -> Option<Event> {
    use crossterm::event as ct;
    match event {
        ct::Event::Key(key) => {
            let kind = match key.kind {
                ct::KeyEventKind::Release => KeyEventKind::Release,
                _ => KeyEventKind::Press,
            };
            let code = match key.code {
                ct::KeyCode::Char(c) => KeyCode::Char(c),
                ct::KeyCode::Enter => KeyCode::Enter,
                ct::KeyCode::Tab | ct::KeyCode::BackTab => KeyCode::Tab,
                ct::KeyCode::Backspace => KeyCode::Backspace,
                ct::KeyCode::Delete => KeyCode::Delete,
                ct::KeyCode::Esc => KeyCode::Escape,
                ct::KeyCode::Up => KeyCode::Up,
                ct::KeyCode::Down => KeyCode::Down,
                ct::KeyCode::Left => KeyCode::Left,
                ct::KeyCode::Right => KeyCode::Right,
                ct::KeyCode::Home => KeyCode::Home,
                ct::KeyCode::End => KeyCode::End,
                ct::KeyCode::PageUp => KeyCode::PageUp,
                ct::KeyCode::PageDown => KeyCode::PageDown,
                ct::KeyCode::F(n) => KeyCode::F(n),
                _ => return None,
            };
            let mut modifiers = Modifiers::NONE;
            if key.modifiers.contains(ct::KeyModifiers::SHIFT) {
                modifiers = modifiers | Modifiers::SHIFT;
            }
            // BackTab arrives without an explicit shift flag.
            if key.code == ct::KeyCode::BackTab {
                modifiers = modifiers | Modifiers::SHIFT;
            }
            if key.modifiers.contains(ct::KeyModifiers::CONTROL) {
                modifiers = modifiers | Modifiers::CTRL;
            }
            if key.modifiers.contains(ct::KeyModifiers::ALT) {
                modifiers = modifiers | Modifiers::ALT;
            }
            if key.modifiers.contains(ct::KeyModifiers::SUPER) {
                modifiers = modifiers | Modifiers::META;
            }
            Some(Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
            }))
        }
        ct::Event::Mouse(mouse) => {
            let (kind, button) = match mouse.kind {
                ct::MouseEventKind::Down(b) => (MouseEventKind::Press, convert_button(b)),
                ct::MouseEventKind::Up(b) => (MouseEventKind::Release, convert_button(b)),
                ct::MouseEventKind::Drag(b) => (MouseEventKind::Move, convert_button(b)),
                ct::MouseEventKind::Moved => (MouseEventKind::Move, MouseButton::Left),
                ct::MouseEventKind::ScrollUp => (MouseEventKind::Scroll, MouseButton::WheelUp),
                ct::MouseEventKind::ScrollDown => (MouseEventKind::Scroll, MouseButton::WheelDown),
                _ => return None,
            };
            Some(Event::Mouse(MouseEvent {
                x: mouse.column,
                y: mouse.row,
                kind,
                button,
            }))
        }
        ct::Event::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

fn convert_button(button: crossterm::event::MouseButton) -> MouseButton {
    match button {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}
