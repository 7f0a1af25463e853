use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::geometry::Point;
use crate::surface::Viewport;

const HOLD_WINDOW: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    /// Always lowercase.
    Char(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    MouseDown { button: MouseButton, pos: Point },
    MouseUp { button: MouseButton, pos: Point },
    MouseMove { pos: Point },
}

/// Everything the loop knows about input for one frame.
#[derive(Clone, Debug, Default)]
pub struct InputSnapshot {
    events: Vec<InputEvent>,
    /// Oldest press first.
    held: Vec<Key>,
}

impl InputSnapshot {
    pub fn new(events: Vec<InputEvent>, held: Vec<Key>) -> Self {
        Self { events, held }
    }

    pub fn from_events(events: Vec<InputEvent>) -> Self {
        Self::new(events, Vec::new())
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// The held key among `keys` that was pressed most recently.
    pub fn latest_held(&self, keys: &[Key]) -> Option<Key> {
        self.held.iter().rev().copied().find(|k| keys.contains(k))
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.events.iter().any(|e| *e == InputEvent::KeyDown(key))
    }

    /// Same held keys, different event queue.
    pub fn with_events(&self, events: Vec<InputEvent>) -> Self {
        Self {
            events,
            held: self.held.clone(),
        }
    }

    pub fn hold(mut self, key: Key) -> Self {
        self.held.retain(|k| *k != key);
        self.held.push(key);
        self
    }
}

pub trait InputSource {
    /// Drain everything that arrived since the previous call.
    fn poll(&mut self, viewport: &Viewport) -> io::Result<InputSnapshot>;
}

/// Polls crossterm without blocking.
pub struct TerminalInput {
    held: HashMap<Key, Instant>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            held: HashMap::new(),
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant, events: &mut Vec<InputEvent>) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.kind == KeyEventKind::Press {
                events.push(InputEvent::Quit);
            }
            return;
        }
        let Some(k) = translate_key(key.code) else { return };
        match key.kind {
            KeyEventKind::Press => {
                self.held.insert(k, now);
                events.push(InputEvent::KeyDown(k));
            }
            KeyEventKind::Repeat => {
                self.held.insert(k, now);
            }
            KeyEventKind::Release => {
                self.held.remove(&k);
            }
        }
    }

    fn held_keys(&mut self, now: Instant) -> Vec<Key> {
        self.held
            .retain(|_, pressed| now.saturating_duration_since(*pressed) < HOLD_WINDOW);
        let mut held: Vec<(Key, Instant)> = self.held.iter().map(|(k, t)| (*k, *t)).collect();
        held.sort_by_key(|(_, t)| *t);
        held.into_iter().map(|(k, _)| k).collect()
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self, viewport: &Viewport) -> io::Result<InputSnapshot> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            let now = Instant::now();
            match event::read()? {
                event::Event::Key(key) => self.on_key(key, now, &mut events),
                event::Event::Mouse(mouse) => {
                    if let Some(e) = translate_mouse(mouse, viewport) {
                        events.push(e);
                    }
                }
                _ => {}
            }
        }
        let held = self.held_keys(Instant::now());
        Ok(InputSnapshot::new(events, held))
    }
}

fn translate_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c.to_ascii_lowercase())),
        _ => None,
    }
}

fn translate_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

fn translate_mouse(mouse: MouseEvent, viewport: &Viewport) -> Option<InputEvent> {
    // Releases outside the canvas still end drags, pinned to its edge.
    if let MouseEventKind::Up(b) = mouse.kind {
        return Some(InputEvent::MouseUp {
            button: translate_button(b),
            pos: viewport.to_logical_clamped(mouse.column, mouse.row)?,
        });
    }
    let pos = viewport.to_logical(mouse.column, mouse.row)?;
    match mouse.kind {
        MouseEventKind::Down(b) => Some(InputEvent::MouseDown {
            button: translate_button(b),
            pos,
        }),
        MouseEventKind::Up(b) => Some(InputEvent::MouseUp {
            button: translate_button(b),
            pos,
        }),
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(InputEvent::MouseMove { pos }),
        _ => None,
    }
}
